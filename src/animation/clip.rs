//! Keyframed skeletal animation.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StrataError};
use crate::scene::Transform;

/// One sample of a bone track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub transform: Transform,
    /// Seconds from the start of the animation.
    pub time: f32,
}

impl Keyframe {
    #[must_use]
    pub fn new(time: f32, transform: Transform) -> Self {
        Self { transform, time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackType {
    /// Wraps back to the start after the last keyframe.
    #[default]
    Looping,
    /// Stops on the last keyframe and reports [`Animation::running`] `false`.
    Single,
}

/// A named set of per-bone keyframe tracks with its own playback clock.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    tracks: FxHashMap<String, Vec<Keyframe>>,
    duration: f32,
    time: f32,
    playback: PlaybackType,
    running: bool,
}

impl Animation {
    /// Builds an animation from bone tracks.
    ///
    /// Each track must be sorted by time. The duration is the time of the
    /// latest keyframe across all tracks.
    pub fn new(
        name: impl Into<String>,
        tracks: impl IntoIterator<Item = (String, Vec<Keyframe>)>,
        playback: PlaybackType,
    ) -> Result<Self> {
        let tracks: FxHashMap<String, Vec<Keyframe>> = tracks.into_iter().collect();
        let mut duration = 0.0_f32;
        for (bone, keyframes) in &tracks {
            if keyframes.windows(2).any(|pair| pair[1].time < pair[0].time) {
                return Err(StrataError::UnorderedKeyframes { bone: bone.clone() });
            }
            if let Some(last) = keyframes.last() {
                duration = duration.max(last.time);
            }
        }

        Ok(Self {
            name: name.into(),
            tracks,
            duration,
            time: 0.0,
            playback,
            running: true,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Current playback position in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn playback(&self) -> PlaybackType {
        self.playback
    }

    /// `false` once a [`PlaybackType::Single`] animation reached its end.
    #[inline]
    #[must_use]
    pub fn running(&self) -> bool {
        self.running
    }

    /// Rewinds to the first frame and resumes playback.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.running = true;
    }

    /// Moves the playback clock forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        self.time += dt;
        match self.playback {
            PlaybackType::Looping => {
                if self.duration > 0.0 {
                    self.time %= self.duration;
                } else {
                    self.time = 0.0;
                }
            }
            PlaybackType::Single => {
                if self.time >= self.duration {
                    self.time = self.duration;
                    self.running = false;
                }
            }
        }
    }

    /// Whether the animation has keyframes for `bone`.
    #[must_use]
    pub fn has_track(&self, bone: &str) -> bool {
        self.tracks.get(bone).is_some_and(|track| !track.is_empty())
    }

    pub fn bones(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    /// Pose of `bone` at the current time.
    ///
    /// Translation and scale are interpolated linearly, rotation spherically.
    /// Times outside the track clamp to the first or last keyframe.
    pub fn transform(&self, bone: &str) -> Result<Transform> {
        let track = self
            .tracks
            .get(bone)
            .filter(|track| !track.is_empty())
            .ok_or_else(|| StrataError::MissingKeyframes {
                animation: self.name.clone(),
                bone: bone.to_string(),
            })?;
        Ok(sample(track, self.time))
    }
}

fn sample(track: &[Keyframe], time: f32) -> Transform {
    // First keyframe strictly after `time`
    let next = track.partition_point(|k| k.time <= time);
    if next == 0 {
        return track[0].transform;
    }
    if next == track.len() {
        return track[next - 1].transform;
    }
    let (a, b) = (&track[next - 1], &track[next]);
    let span = b.time - a.time;
    let t = if span > 1e-6 {
        ((time - a.time) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    a.transform.lerp(&b.transform, t)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn track(points: &[(f32, f32)]) -> Vec<Keyframe> {
        points
            .iter()
            .map(|&(t, x)| Keyframe::new(t, Transform::from_translation(Vec3::new(x, 0.0, 0.0))))
            .collect()
    }

    #[test]
    fn sample_interpolates_between_keyframes() {
        let keys = track(&[(0.0, 0.0), (1.0, 10.0)]);
        assert!((sample(&keys, 0.25).translation.x - 2.5).abs() < 1e-5);
        assert_eq!(sample(&keys, -1.0).translation.x, 0.0);
        assert_eq!(sample(&keys, 3.0).translation.x, 10.0);
    }

    #[test]
    fn single_playback_clamps_and_stops() {
        let mut animation = Animation::new(
            "wave",
            [("arm".to_string(), track(&[(0.0, 0.0), (0.5, 1.0)]))],
            PlaybackType::Single,
        )
        .unwrap();
        animation.advance(0.3);
        assert!(animation.running());
        animation.advance(0.3);
        assert!(!animation.running());
        assert_eq!(animation.time(), 0.5);
    }
}
