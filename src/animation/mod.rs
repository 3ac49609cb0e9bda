//! Skeletal animation: keyframed clips, per-layer state machines and the
//! blended bone cache that drives a [`Skeleton`](crate::scene::Skeleton).

mod bone_query;
mod clip;
mod controller;
mod state;

pub use bone_query::CachedBoneQuery;
pub use clip::{Animation, Keyframe, PlaybackType};
pub use controller::AnimationController;
pub use state::{AnimationState, StateId};
