#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod settings;
pub mod resources;
pub mod graph;
pub mod material;
pub mod scene;
pub mod animation;
pub mod pipeline;
pub mod renderer;
pub mod backend;

pub use animation::{Animation, AnimationController, AnimationState, CachedBoneQuery, Keyframe, PlaybackType};
pub use errors::{Result, StrataError};
pub use graph::{Node, NodeId, RenderGraph};
pub use material::{MaterialCache, MaterialFlags, MaterialKey};
pub use pipeline::{CommandKind, Managers, PassId, RenderCommand, RenderPass, RenderPipeline};
pub use renderer::{RenderFrame, Renderer};
pub use resources::PostProcessingDescription;
pub use scene::{Camera, RenderEntity, Scene, SceneId, Skeleton, Transform};
pub use settings::PipelineSettings;
