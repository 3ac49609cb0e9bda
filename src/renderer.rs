//! Backend entry point.
//!
//! A [`Renderer`] consumes the command queue produced by
//! [`RenderPipeline`](crate::pipeline::RenderPipeline). Every `execute_*`
//! hook defaults to a no-op so a backend only implements what it supports.

use slotmap::SlotMap;

use crate::graph::{GraphId, RenderGraph};
use crate::pipeline::{CommandKind, RenderCommand, RenderPass};
use crate::resources::RenderTargetManager;
use crate::scene::{Scene, SceneEntity, SceneId};

/// Read-only view of one built frame.
#[derive(Clone, Copy)]
pub struct RenderFrame<'a> {
    pub passes: &'a [RenderPass],
    pub scenes: &'a SlotMap<SceneId, Scene>,
    pub graphs: &'a SlotMap<GraphId, RenderGraph>,
    pub commands: &'a [RenderCommand],
    pub render_targets: &'a dyn RenderTargetManager,
}

impl<'a> RenderFrame<'a> {
    /// Pass a command belongs to.
    #[must_use]
    pub fn pass(&self, command: &RenderCommand) -> Option<&'a RenderPass> {
        self.passes.get(command.pass)
    }

    #[must_use]
    pub fn scene(&self, command: &RenderCommand) -> Option<&'a Scene> {
        self.pass(command).and_then(|pass| self.scenes.get(pass.scene))
    }

    /// Entity and graph drawn by a `Draw` command.
    #[must_use]
    pub fn draw_target(&self, command: &RenderCommand) -> Option<(&'a SceneEntity, &'a RenderGraph)> {
        let scene = self.scene(command)?;
        let item = scene.scene_entity(command.entity?)?;
        let graph = self.graphs.get(item.graph)?;
        Some((item, graph))
    }
}

pub trait Renderer {
    fn execute_pass_start(&mut self, _frame: &RenderFrame<'_>, _command: &RenderCommand) {}

    fn execute_draw(&mut self, _frame: &RenderFrame<'_>, _command: &RenderCommand) {}

    fn execute_pass_end(&mut self, _frame: &RenderFrame<'_>, _command: &RenderCommand) {}

    fn execute_present(&mut self, _frame: &RenderFrame<'_>, _command: &RenderCommand) {}

    /// Dispatches every command of `frame` in order.
    fn render(&mut self, frame: &RenderFrame<'_>) {
        for command in frame.commands {
            match command.kind {
                CommandKind::PassStart => self.execute_pass_start(frame, command),
                CommandKind::Draw => self.execute_draw(frame, command),
                CommandKind::PassEnd => self.execute_pass_end(frame, command),
                CommandKind::Present => self.execute_present(frame, command),
            }
        }
    }
}
