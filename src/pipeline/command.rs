use crate::resources::{MaterialId, RenderTargetId};
use crate::scene::{EntityId, LightRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandKind {
    #[default]
    PassStart,
    Draw,
    PassEnd,
    Present,
}

/// One step of the linearised frame.
///
/// `pass` indexes the expanded pass list of the frame the command belongs
/// to. The default value is a `PassStart` of pass 0 with everything else
/// unset; the queue builder fills commands in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderCommand {
    pub kind: CommandKind,
    pub pass: usize,
    pub material: Option<MaterialId>,
    pub entity: Option<EntityId>,
    pub shadow_map: Option<RenderTargetId>,
    pub light: Option<LightRef>,
}

impl RenderCommand {
    #[must_use]
    pub fn pass_start(pass: usize) -> Self {
        Self {
            pass,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn pass_end(pass: usize) -> Self {
        Self {
            kind: CommandKind::PassEnd,
            pass,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn present() -> Self {
        Self {
            kind: CommandKind::Present,
            ..Self::default()
        }
    }
}
