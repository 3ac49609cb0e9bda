use rustc_hash::FxHashMap;

use crate::scene::{BoneQuery, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ease {
    from: Transform,
    start: f32,
    end: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedBone {
    transform: Transform,
    ease: Option<Ease>,
}

/// Per-bone poses composed from every animation layer.
///
/// Layer 0 writes through [`store_base`](Self::store_base); higher layers
/// overwrite their masked bones with [`store_overlay`](Self::store_overlay).
/// A bone handed back by a finished overlay keeps an ease window during
/// which base writes are blended in from the overlay's last pose.
#[derive(Debug, Clone, Default)]
pub struct CachedBoneQuery {
    bones: FxHashMap<String, CachedBone>,
}

impl CachedBoneQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, bone: &str) -> Option<Transform> {
        self.bones.get(bone).map(|cached| cached.transform)
    }

    /// Whether `bone` is inside an ease window at time `now`.
    #[must_use]
    pub fn is_easing(&self, bone: &str, now: f32) -> bool {
        self.bones
            .get(bone)
            .and_then(|cached| cached.ease)
            .is_some_and(|ease| now < ease.end)
    }

    /// Writes a base-layer pose taken at clock time `now`.
    pub fn store_base(&mut self, bone: &str, pose: Transform, now: f32) {
        let Some(cached) = self.bones.get_mut(bone) else {
            self.bones.insert(
                bone.to_string(),
                CachedBone {
                    transform: pose,
                    ease: None,
                },
            );
            return;
        };
        cached.transform = match cached.ease {
            Some(ease) if now < ease.end => {
                let blend = ((now - ease.start) / (ease.end - ease.start)).clamp(0.0, 1.0);
                ease.from.lerp(&pose, blend)
            }
            _ => {
                cached.ease = None;
                pose
            }
        };
    }

    /// Writes an overlay-layer pose, cancelling any ease on the bone.
    pub fn store_overlay(&mut self, bone: &str, pose: Transform) {
        self.bones.insert(
            bone.to_string(),
            CachedBone {
                transform: pose,
                ease: None,
            },
        );
    }

    /// Opens an ease window on `bone` from its current pose, covering
    /// `start..end` on the controller clock.
    pub fn begin_ease(&mut self, bone: &str, start: f32, end: f32) {
        if let Some(cached) = self.bones.get_mut(bone) {
            cached.ease = Some(Ease {
                from: cached.transform,
                start,
                end,
            });
        }
    }

    pub fn clear(&mut self) {
        self.bones.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

impl BoneQuery for CachedBoneQuery {
    fn transform(&self, bone: &str) -> Option<Transform> {
        self.get(bone)
    }
}
