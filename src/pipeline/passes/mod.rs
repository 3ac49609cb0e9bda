//! Pass expansion.
//!
//! Each module here turns one feature of a user pass (shadows, ambient
//! occlusion, sky box, a post-processing stage) into synthesized passes.
//! Full-screen stages draw a single quad shaded by a
//! [`PostProcessing`](crate::graph::Node::PostProcessing) graph into a
//! target acquired from the pipeline's [`TargetPool`]; [`PostChain`] threads
//! those targets so each stage reads the previous one's output.

pub mod bloom;
pub mod colour_adjust;
pub mod fxaa;
pub mod shadow;
pub mod skybox;
pub mod ssao;
pub mod tone_mapping;

use glam::Vec4;
use slotmap::SlotMap;

use super::pass::{PassKind, RenderPass};
use super::target_pool::{TargetKey, TargetPool};
use crate::errors::Result;
use crate::graph::{GraphId, RenderGraph};
use crate::resources::{MeshManager, RenderTargetId, RenderTargetManager, TextureId};
use crate::scene::{Camera, DirtyFlag, RenderEntity, Scene, SceneId};
use crate::settings::PipelineSettings;

/// Everything pass expansion may allocate into.
///
/// Scenes and graphs created here are recorded so the next expansion can
/// discard them.
pub(crate) struct ExpansionContext<'a> {
    pub scenes: &'a mut SlotMap<SceneId, Scene>,
    pub graphs: &'a mut SlotMap<GraphId, RenderGraph>,
    pub meshes: &'a mut dyn MeshManager,
    pub render_targets: &'a mut dyn RenderTargetManager,
    pub targets: &'a mut TargetPool,
    pub settings: &'a PipelineSettings,
    pub dirty: &'a DirtyFlag,
    pub synthesized_scenes: &'a mut Vec<SceneId>,
    pub synthesized_graphs: &'a mut Vec<GraphId>,
}

impl ExpansionContext<'_> {
    /// A window-sized colour + depth target.
    pub fn window_target(&mut self) -> Result<RenderTargetId> {
        self.targets.acquire(&mut *self.render_targets, TargetKey::Window)
    }

    pub fn sized_target(&mut self, width: u32, height: u32) -> Result<RenderTargetId> {
        self.targets
            .acquire(&mut *self.render_targets, TargetKey::Sized { width, height })
    }

    /// A target writing `colour`'s colour attachment, depth-tested against
    /// `depth`'s depth attachment.
    pub fn hybrid_target(&mut self, colour: RenderTargetId, depth: RenderTargetId) -> Result<RenderTargetId> {
        self.targets
            .acquire(&mut *self.render_targets, TargetKey::Hybrid { colour, depth })
    }

    pub fn add_graph(&mut self, graph: RenderGraph) -> GraphId {
        let id = self.graphs.insert(graph);
        self.synthesized_graphs.push(id);
        id
    }

    /// A scene holding one full-screen quad shaded by `graph`.
    pub fn full_screen_scene(&mut self, graph: RenderGraph) -> Result<SceneId> {
        let quad = self.meshes.quad(Vec4::ONE)?;
        let graph = self.add_graph(graph);
        let mut scene = Scene::new(self.dirty.clone());
        let entity = RenderEntity::new(quad)
            .named("full_screen_quad")
            .with_receive_shadow(false);
        scene.add_entity(graph, entity);
        let id = self.scenes.insert(scene);
        self.synthesized_scenes.push(id);
        Ok(id)
    }

    /// A full-screen pass drawing `graph` into `target`.
    pub fn full_screen_pass(
        &mut self,
        kind: PassKind,
        label: &str,
        graph: RenderGraph,
        target: Option<RenderTargetId>,
    ) -> Result<RenderPass> {
        let scene = self.full_screen_scene(graph)?;
        let mut pass = RenderPass::synthesized(kind, scene, Camera::full_screen(), label);
        pass.colour_target = target;
        Ok(pass)
    }
}

/// A sequence of full-screen stages, each reading the previous stage's
/// colour output.
pub(crate) struct PostChain {
    source: RenderTargetId,
    passes: Vec<RenderPass>,
}

impl PostChain {
    pub fn new(source: RenderTargetId) -> Self {
        Self {
            source,
            passes: Vec::new(),
        }
    }

    /// Target the next stage reads from.
    pub fn source(&self) -> RenderTargetId {
        self.source
    }

    pub fn source_texture(&self, ctx: &ExpansionContext<'_>) -> Result<TextureId> {
        ctx.render_targets.colour_texture(self.source)
    }

    /// Appends a stage writing into a new target, which becomes the source
    /// of the next stage.
    pub fn push(&mut self, ctx: &mut ExpansionContext<'_>, label: &str, graph: RenderGraph) -> Result<RenderTargetId> {
        let target = ctx.window_target()?;
        let pass = ctx.full_screen_pass(PassKind::PostProcessing, label, graph, Some(target))?;
        self.passes.push(pass);
        self.source = target;
        Ok(target)
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Rewires the last stage to write into `output` and returns the passes.
    pub fn finish(mut self, output: Option<RenderTargetId>) -> Vec<RenderPass> {
        if let Some(last) = self.passes.last_mut() {
            last.colour_target = output;
        }
        self.passes
    }
}

/// `post_processing(texture(source))`: an unchanged copy.
pub(crate) fn copy_graph(source: TextureId) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.texture(source);
    graph.post_processing(colour);
    graph
}
