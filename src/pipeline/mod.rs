//! Render pipeline: pass declaration, pass expansion and the command queue.

pub mod command;
pub mod pass;
pub mod passes;
pub mod queue;
pub mod render_pipeline;
pub mod target_pool;

pub use command::{CommandKind, RenderCommand};
pub use pass::{PassId, PassKind, RenderPass};
pub use queue::{RenderQueueBuilder, ShadowMapTable};
pub use render_pipeline::{Managers, RenderPipeline};
pub use target_pool::{TargetKey, TargetPool};
