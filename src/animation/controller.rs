//! Layered animation state machine.
//!
//! Each layer runs one [`AnimationState`] at a time. Layer 0 drives every
//! bone; higher layers override only the bones in their mask. All layers
//! write into one [`CachedBoneQuery`] which then drives the skeleton.

use rustc_hash::FxHashSet;

use super::bone_query::CachedBoneQuery;
use super::clip::PlaybackType;
use super::state::{AnimationState, StateId, Transition};
use crate::errors::{Result, StrataError};
use crate::scene::Skeleton;
use crate::settings::{DEFAULT_EASE_OUT_SECONDS, PipelineSettings};

#[derive(Debug, Clone, Default)]
struct Layer {
    current: Option<StateId>,
    /// Bones driven by this layer; `None` drives all of them.
    mask: Option<FxHashSet<String>>,
    /// Time spent in the current transition.
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct AnimationController {
    states: Vec<AnimationState>,
    layers: Vec<Layer>,
    cache: CachedBoneQuery,
    clock: f32,
    ease_out: f32,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            layers: Vec::new(),
            cache: CachedBoneQuery::new(),
            clock: 0.0,
            ease_out: DEFAULT_EASE_OUT_SECONDS,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            ease_out: settings.ease_out_seconds,
            ..Self::new()
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Registers a state. The first state added to a layer becomes current.
    pub fn add_state(&mut self, state: AnimationState) -> StateId {
        let id = StateId(self.states.len());
        let layer = state.layer();
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, Layer::default);
        }
        self.states.push(state);
        if self.layers[layer].current.is_none() {
            self.layers[layer].current = Some(id);
            self.states[id.0].enter();
        }
        id
    }

    /// Declares an edge `from -> to` blended over `duration` seconds.
    pub fn add_transition(&mut self, from: StateId, to: StateId, duration: f32) -> Result<()> {
        let name = self.state(to)?.name().to_string();
        self.state_mut(from)?.add_transition(name, to, duration);
        Ok(())
    }

    /// Restricts `layer` to the named bones. Ignored for layer 0.
    pub fn set_layer_mask<S: Into<String>>(&mut self, layer: usize, bones: impl IntoIterator<Item = S>) {
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, Layer::default);
        }
        self.layers[layer].mask = Some(bones.into_iter().map(Into::into).collect());
    }

    /// Makes `id` the current state of its layer without blending.
    pub fn set_state(&mut self, id: StateId) -> Result<()> {
        let layer = self.state(id)?.layer();
        if let Some(previous) = self.layers[layer].current {
            self.states[previous.0].exit();
        }
        self.layers[layer].current = Some(id);
        self.layers[layer].elapsed = 0.0;
        self.states[id.0].enter();
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self, id: StateId) -> Result<&AnimationState> {
        self.states.get(id.0).ok_or(StrataError::UnknownState(id.0))
    }

    pub fn state_mut(&mut self, id: StateId) -> Result<&mut AnimationState> {
        self.states.get_mut(id.0).ok_or(StrataError::UnknownState(id.0))
    }

    #[must_use]
    pub fn current_state(&self, layer: usize) -> Option<StateId> {
        self.layers.get(layer).and_then(|l| l.current)
    }

    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Composed bone poses as of the last update.
    #[inline]
    #[must_use]
    pub fn query(&self) -> &CachedBoneQuery {
        &self.cache
    }

    /// Seconds accumulated by [`update`](Self::update).
    #[inline]
    #[must_use]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Starts blending `layer` towards the state playing `name`.
    ///
    /// Returns `false` when the current state has no such edge; the layer
    /// keeps playing unchanged.
    pub fn transition(&mut self, layer: usize, name: &str) -> bool {
        let Some(current) = self.current_state(layer) else {
            return false;
        };
        if !self.states[current.0].transition(name) {
            log::debug!(
                "No transition from '{}' to '{name}' on layer {layer}",
                self.states[current.0].name()
            );
            return false;
        }
        if let Some(edge) = self.states[current.0].pending() {
            self.states[edge.target.0].enter();
        }
        self.layers[layer].elapsed = 0.0;
        true
    }

    /// Advances every layer by `dt` seconds and poses `skeleton`.
    pub fn update(&mut self, dt: f32, skeleton: &mut Skeleton) -> Result<()> {
        self.clock += dt;
        for layer in 0..self.layers.len() {
            let Some(current) = self.layers[layer].current else {
                continue;
            };
            let bones: Vec<String> = skeleton
                .bone_names()
                .filter(|bone| {
                    layer == 0
                        || self.layers[layer]
                            .mask
                            .as_ref()
                            .is_none_or(|mask| mask.contains(*bone))
                })
                .map(str::to_string)
                .collect();

            match self.states[current.0].pending() {
                Some(edge) => self.update_transition(layer, current, edge, dt, &bones)?,
                None => self.update_playback(layer, current, dt, &bones)?,
            }
        }
        skeleton.update(Some(&self.cache));
        Ok(())
    }

    fn update_playback(
        &mut self,
        layer: usize,
        current: StateId,
        dt: f32,
        bones: &[String],
    ) -> Result<()> {
        let now = self.clock;
        let animation = self.states[current.0].animation_mut();
        let was_running = animation.running();
        animation.advance(dt);
        let finished =
            was_running && !animation.running() && animation.playback() == PlaybackType::Single;
        let animation = self.states[current.0].animation();

        if layer == 0 {
            for bone in bones.iter().filter(|b| animation.has_track(b)) {
                self.cache.store_base(bone, animation.transform(bone)?, now);
            }
            return Ok(());
        }

        // A stopped overlay leaves its bones to the layers below
        if !was_running {
            return Ok(());
        }
        for bone in bones.iter().filter(|b| animation.has_track(b)) {
            self.cache.store_overlay(bone, animation.transform(bone)?);
            if finished {
                self.cache.begin_ease(bone, now, now + self.ease_out);
            }
        }
        if finished {
            log::debug!(
                "'{}' finished on layer {layer}, easing out over {}s",
                animation.name(),
                self.ease_out
            );
        }
        Ok(())
    }

    fn update_transition(
        &mut self,
        layer: usize,
        current: StateId,
        edge: Transition,
        dt: f32,
        bones: &[String],
    ) -> Result<()> {
        let now = self.clock;
        self.layers[layer].elapsed += dt;
        let elapsed = self.layers[layer].elapsed;
        let blend = if edge.duration > 0.0 {
            (elapsed / edge.duration).min(1.0)
        } else {
            1.0
        };

        self.states[edge.target.0].animation_mut().advance(dt);
        let target = self.states[edge.target.0].animation();
        for bone in bones.iter().filter(|b| target.has_track(b)) {
            let pose = target.transform(bone)?;
            let blended = self.cache.get(bone).map_or(pose, |cached| cached.lerp(&pose, blend));
            if layer == 0 {
                self.cache.store_base(bone, blended, now);
            } else {
                self.cache.store_overlay(bone, blended);
            }
        }

        if elapsed >= edge.duration {
            log::debug!(
                "Layer {layer}: '{}' -> '{}'",
                self.states[current.0].name(),
                self.states[edge.target.0].name()
            );
            self.states[current.0].exit();
            self.layers[layer].current = Some(edge.target);
            self.layers[layer].elapsed = 0.0;
        }
        Ok(())
    }
}
