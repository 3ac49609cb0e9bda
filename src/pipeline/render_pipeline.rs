//! Render Pipeline
//!
//! Owns scenes, render graphs and user passes, expands the passes into the
//! full frame and linearises it into a command queue.
//!
//! # Frame Structure
//!
//! ```text
//! shadow passes ─► ssao inputs / combines ─► user passes ─► post chains ─► PRESENT
//! ```
//!
//! - [`build`](RenderPipeline::build) re-expands passes (shadow maps, ambient
//!   occlusion, sky boxes, post-processing chains) and then rebuilds.
//! - [`rebuild`](RenderPipeline::rebuild) only relinearises the current pass
//!   list, for changes to entities or lights that leave pass topology alone.
//! - [`render`](RenderPipeline::render) picks whichever of the two the shared
//!   [`DirtyFlag`] asks for, then hands the frame to a [`Renderer`].

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use super::command::RenderCommand;
use super::pass::{PassId, RenderPass};
use super::passes::{self, ExpansionContext, PostChain};
use super::queue::{RenderQueueBuilder, ShadowMapTable};
use super::target_pool::TargetPool;
use crate::errors::Result;
use crate::graph::{GraphId, RenderGraph};
use crate::invariant;
use crate::renderer::{RenderFrame, Renderer};
use crate::resources::{MaterialManager, MeshManager, RenderTargetId, RenderTargetManager, TextureManager};
use crate::scene::{DirectionalLightId, DirtyFlag, DirtyLevel, Scene, SceneId};
use crate::settings::PipelineSettings;

/// Backend factories injected into a pipeline.
pub struct Managers {
    pub meshes: Box<dyn MeshManager>,
    pub textures: Box<dyn TextureManager>,
    pub render_targets: Box<dyn RenderTargetManager>,
    pub materials: Box<dyn MaterialManager>,
}

pub struct RenderPipeline {
    settings: PipelineSettings,
    managers: Managers,

    scenes: SlotMap<SceneId, Scene>,
    graphs: SlotMap<GraphId, RenderGraph>,
    user_passes: SlotMap<PassId, RenderPass>,
    pass_order: Vec<PassId>,

    // === Expansion output ===
    passes: Vec<RenderPass>,
    shadow_maps: ShadowMapTable,
    synthesized_scenes: Vec<SceneId>,
    synthesized_graphs: Vec<GraphId>,
    targets: TargetPool,
    commands: Vec<RenderCommand>,

    dirty: DirtyFlag,
}

impl RenderPipeline {
    #[must_use]
    pub fn new(settings: PipelineSettings, managers: Managers) -> Self {
        let dirty = DirtyFlag::new();
        dirty.mark(DirtyLevel::Build);
        Self {
            settings,
            managers,
            scenes: SlotMap::with_key(),
            graphs: SlotMap::with_key(),
            user_passes: SlotMap::with_key(),
            pass_order: Vec::new(),
            passes: Vec::new(),
            shadow_maps: FxHashMap::default(),
            synthesized_scenes: Vec::new(),
            synthesized_graphs: Vec::new(),
            targets: TargetPool::new(),
            commands: Vec::new(),
            dirty,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Replaces the settings. Pass topology is rebuilt on the next render.
    pub fn set_settings(&mut self, settings: PipelineSettings) {
        self.settings = settings;
        self.dirty.mark(DirtyLevel::Build);
    }

    // ========================================================================
    // Scenes & Graphs
    // ========================================================================

    pub fn create_scene(&mut self) -> SceneId {
        self.dirty.mark(DirtyLevel::Rebuild);
        self.scenes.insert(Scene::new(self.dirty.clone()))
    }

    #[must_use]
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Scene mutations report to the pipeline's dirty flag themselves.
    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn create_render_graph(&mut self, graph: RenderGraph) -> GraphId {
        self.graphs.insert(graph)
    }

    #[must_use]
    pub fn graph(&self, id: GraphId) -> Option<&RenderGraph> {
        self.graphs.get(id)
    }

    /// Mutable graph access. Materials are recompiled on the next render.
    pub fn graph_mut(&mut self, id: GraphId) -> Option<&mut RenderGraph> {
        self.dirty.mark(DirtyLevel::Rebuild);
        self.graphs.get_mut(id)
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Appends a user pass. Passes are drawn in declaration order.
    pub fn create_pass(&mut self, pass: RenderPass) -> PassId {
        invariant!(
            self.scenes.contains_key(pass.scene),
            "pass '{}' refers to a scene this pipeline does not own",
            pass.label
        );
        let id = self.user_passes.insert(pass);
        self.pass_order.push(id);
        self.dirty.mark(DirtyLevel::Build);
        id
    }

    pub fn remove_pass(&mut self, id: PassId) -> Option<RenderPass> {
        let pass = self.user_passes.remove(id)?;
        self.pass_order.retain(|&p| p != id);
        self.dirty.mark(DirtyLevel::Build);
        Some(pass)
    }

    #[must_use]
    pub fn pass(&self, id: PassId) -> Option<&RenderPass> {
        self.user_passes.get(id)
    }

    pub fn pass_mut(&mut self, id: PassId) -> Option<&mut RenderPass> {
        self.dirty.mark(DirtyLevel::Build);
        self.user_passes.get_mut(id)
    }

    /// Expanded pass list of the last build.
    #[inline]
    #[must_use]
    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Shadow map rendered for `light` of `scene` in the last build.
    #[must_use]
    pub fn shadow_map(&self, scene: SceneId, light: DirectionalLightId) -> Option<RenderTargetId> {
        self.shadow_maps.get(&(scene, light)).copied()
    }

    // ========================================================================
    // Managers
    // ========================================================================

    pub fn meshes(&mut self) -> &mut dyn MeshManager {
        self.managers.meshes.as_mut()
    }

    pub fn textures(&mut self) -> &mut dyn TextureManager {
        self.managers.textures.as_mut()
    }

    #[must_use]
    pub fn render_targets(&self) -> &dyn RenderTargetManager {
        self.managers.render_targets.as_ref()
    }

    pub fn render_targets_mut(&mut self) -> &mut dyn RenderTargetManager {
        self.managers.render_targets.as_mut()
    }

    /// Targets created for synthesized passes; reused across builds.
    #[inline]
    #[must_use]
    pub fn target_pool(&self) -> &TargetPool {
        &self.targets
    }

    // ========================================================================
    // Build
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn dirty_level(&self) -> DirtyLevel {
        self.dirty.level()
    }

    /// Re-expands every user pass and rebuilds the command queue.
    pub fn build(&mut self) -> Result<()> {
        let result = self.expand().and_then(|()| self.rebuild());
        if result.is_err() {
            self.dirty.mark(DirtyLevel::Build);
        }
        result
    }

    /// Relinearises the current pass list into commands.
    pub fn rebuild(&mut self) -> Result<()> {
        let builder = RenderQueueBuilder {
            passes: &self.passes,
            scenes: &self.scenes,
            graphs: &self.graphs,
            shadow_maps: &self.shadow_maps,
        };
        self.commands = builder.build(self.managers.materials.as_mut())?;
        self.dirty.clear();
        log::debug!(
            "Render queue: {} commands over {} passes",
            self.commands.len(),
            self.passes.len()
        );
        Ok(())
    }

    /// Builds or rebuilds as needed, then dispatches the frame.
    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        match self.dirty.level() {
            DirtyLevel::Build => self.build()?,
            DirtyLevel::Rebuild => self.rebuild()?,
            DirtyLevel::Clean => {}
        }
        renderer.render(&self.frame());
        Ok(())
    }

    #[must_use]
    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            passes: &self.passes,
            scenes: &self.scenes,
            graphs: &self.graphs,
            commands: &self.commands,
            render_targets: self.managers.render_targets.as_ref(),
        }
    }

    fn discard_expansion(&mut self) {
        for scene in self.scenes.values_mut() {
            scene.remove_sky_boxes();
        }
        for id in self.synthesized_scenes.drain(..) {
            self.scenes.remove(id);
        }
        for id in self.synthesized_graphs.drain(..) {
            self.graphs.remove(id);
        }
        self.shadow_maps.clear();
        self.targets.reset();
        self.passes.clear();
        self.commands.clear();
        self.managers.materials.clear();
    }

    fn expand(&mut self) -> Result<()> {
        self.discard_expansion();

        let user: Vec<(PassId, RenderPass)> = self
            .pass_order
            .iter()
            .filter_map(|&id| self.user_passes.get(id).map(|pass| (id, pass.clone())))
            .collect();
        for (_, pass) in &user {
            invariant!(
                self.scenes.contains_key(pass.scene),
                "pass '{}' refers to a scene this pipeline does not own",
                pass.label
            );
        }

        let mut ctx = ExpansionContext {
            scenes: &mut self.scenes,
            graphs: &mut self.graphs,
            meshes: self.managers.meshes.as_mut(),
            render_targets: self.managers.render_targets.as_mut(),
            targets: &mut self.targets,
            settings: &self.settings,
            dirty: &self.dirty,
            synthesized_scenes: &mut self.synthesized_scenes,
            synthesized_graphs: &mut self.synthesized_graphs,
        };

        let mut pre_passes = Vec::new();
        let mut scene_passes = Vec::with_capacity(user.len());
        let mut post_passes = Vec::new();

        let declared: Vec<RenderPass> = user.iter().map(|(_, pass)| pass.clone()).collect();
        passes::shadow::expand(&mut ctx, &declared, &mut self.shadow_maps, &mut pre_passes)?;

        for (id, mut pass) in user {
            pass.source = Some(id);
            passes::skybox::inject(&mut ctx, id, &pass)?;

            let description = pass.post_processing;
            let output = pass.colour_target;
            let off_screen = description.has_post_stages()
                || (description.ambient_occlusion.is_some() && output.is_none());
            let chain_source = if off_screen {
                let target = ctx.window_target()?;
                pass.colour_target = Some(target);
                Some(target)
            } else {
                None
            };

            if let Some(settings) = &description.ambient_occlusion {
                passes::ssao::expand(&mut ctx, &mut pass, settings, &mut pre_passes)?;
            }

            if let Some(source) = chain_source {
                let mut chain = PostChain::new(source);
                if let Some(settings) = &description.bloom {
                    passes::bloom::expand(&mut ctx, &mut chain, settings)?;
                }
                if let Some(settings) = &description.colour_adjust {
                    passes::colour_adjust::expand(&mut ctx, &mut chain, settings)?;
                }
                if let Some(settings) = &description.tone_map {
                    passes::tone_mapping::expand_tone_map(&mut ctx, &mut chain, settings)?;
                }
                if let Some(settings) = &description.gamma {
                    passes::tone_mapping::expand_gamma(&mut ctx, &mut chain, settings)?;
                }
                if let Some(settings) = &description.anti_alias {
                    passes::fxaa::expand(&mut ctx, &mut chain, settings)?;
                }
                if chain.is_empty() {
                    // Occlusion alone still needs the off-screen image copied out
                    let texture = chain.source_texture(&ctx)?;
                    chain.push(&mut ctx, "copy", passes::copy_graph(texture))?;
                }
                post_passes.extend(chain.finish(output).into_iter().map(|mut stage| {
                    stage.source = Some(id);
                    stage
                }));
            }

            scene_passes.push(pass);
        }

        log::debug!(
            "Expanded {} user passes: {} pre-passes, {} post-processing passes",
            scene_passes.len(),
            pre_passes.len(),
            post_passes.len()
        );

        self.passes = pre_passes;
        self.passes.extend(scene_passes);
        self.passes.extend(post_passes);
        Ok(())
    }
}
