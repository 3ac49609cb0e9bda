//! Linearises an expanded pass list into render commands.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use super::command::{CommandKind, RenderCommand};
use super::pass::{PassKind, RenderPass};
use crate::errors::{Result, invariant_violated};
use crate::graph::{GraphId, RenderGraph};
use crate::material::MaterialFlags;
use crate::resources::{MaterialManager, RenderTargetId};
use crate::scene::{DirectionalLightId, LightRef, LightType, RenderEntity, Scene, SceneId};

/// Shadow map rendered for each shadow-casting light of each scene.
pub type ShadowMapTable = FxHashMap<(SceneId, DirectionalLightId), RenderTargetId>;

/// Builds the command queue from an already expanded pass list.
///
/// Output is a pure function of the passes, the scene contents and the
/// shadow-map table, so it can be rerun whenever entities or lights change
/// without re-expanding passes.
pub struct RenderQueueBuilder<'a> {
    pub passes: &'a [RenderPass],
    pub scenes: &'a SlotMap<SceneId, Scene>,
    pub graphs: &'a SlotMap<GraphId, RenderGraph>,
    pub shadow_maps: &'a ShadowMapTable,
}

impl RenderQueueBuilder<'_> {
    pub fn build(&self, materials: &mut dyn MaterialManager) -> Result<Vec<RenderCommand>> {
        let mut commands = Vec::new();
        for (index, pass) in self.passes.iter().enumerate() {
            let Some(scene) = self.scenes.get(pass.scene) else {
                invariant_violated(&format!("pass '{}' refers to an unknown scene", pass.label));
            };

            commands.push(RenderCommand::pass_start(index));
            if pass.depth_only || pass.kind == PassKind::AmbientOcclusionInput {
                self.single_light_draws(index, pass, scene, materials, &mut commands)?;
            } else {
                self.lit_draws(index, pass, scene, materials, &mut commands)?;
            }
            commands.push(RenderCommand::pass_end(index));
        }
        commands.push(RenderCommand::present());
        Ok(commands)
    }

    /// One draw per non-sky entity under the pass's shadow light, or the
    /// ambient light when it has none.
    fn single_light_draws(
        &self,
        index: usize,
        pass: &RenderPass,
        scene: &Scene,
        materials: &mut dyn MaterialManager,
        commands: &mut Vec<RenderCommand>,
    ) -> Result<()> {
        let (light_type, light) = match pass.shadow_light {
            Some(id) => (LightType::Directional, LightRef::Directional(id)),
            None => (LightType::Ambient, LightRef::Ambient),
        };
        for (id, item) in scene.entities() {
            if item.entity.sky_box_of().is_some() {
                continue;
            }
            let graph = self.graph(item.graph);
            commands.push(RenderCommand {
                kind: CommandKind::Draw,
                pass: index,
                material: Some(materials.create(graph, &item.entity, light_type, flags(pass, graph))?),
                entity: Some(id),
                shadow_map: None,
                light: Some(light),
            });
        }
        Ok(())
    }

    fn lit_draws(
        &self,
        index: usize,
        pass: &RenderPass,
        scene: &Scene,
        materials: &mut dyn MaterialManager,
        commands: &mut Vec<RenderCommand>,
    ) -> Result<()> {
        for light_type in LightType::ORDER {
            let sky_only = light_type == LightType::Ambient && pass.fold_ambient;
            for light in scene.lighting().instances(light_type) {
                for (id, item) in scene.entities() {
                    if !self.draws_entity(pass, &item.entity, light_type, sky_only) {
                        continue;
                    }
                    let graph = self.graph(item.graph);
                    commands.push(RenderCommand {
                        kind: CommandKind::Draw,
                        pass: index,
                        material: Some(materials.create(
                            graph,
                            &item.entity,
                            light_type,
                            flags(pass, graph),
                        )?),
                        entity: Some(id),
                        shadow_map: self.shadow_map(pass.scene, light, &item.entity, scene),
                        light: Some(light),
                    });
                }
            }
        }
        Ok(())
    }

    fn draws_entity(&self, pass: &RenderPass, entity: &RenderEntity, light: LightType, sky_only: bool) -> bool {
        match entity.sky_box_of() {
            Some(owner) => light == LightType::Ambient && pass.source == Some(owner) && pass.kind == PassKind::Scene,
            None => !sky_only,
        }
    }

    fn shadow_map(
        &self,
        scene_id: SceneId,
        light: LightRef,
        entity: &RenderEntity,
        scene: &Scene,
    ) -> Option<RenderTargetId> {
        let LightRef::Directional(light) = light else {
            return None;
        };
        let casts = scene
            .lighting()
            .directional_light(light)
            .is_some_and(|l| l.casts_shadows());
        if !casts || !entity.receive_shadow() {
            return None;
        }
        let target = self.shadow_maps.get(&(scene_id, light)).copied();
        if target.is_none() {
            log::warn!("No shadow map for directional light {light:?}; drawing unshadowed");
        }
        target
    }

    fn graph(&self, id: GraphId) -> &RenderGraph {
        match self.graphs.get(id) {
            Some(graph) => graph,
            None => invariant_violated("entity refers to an unknown render graph"),
        }
    }
}

fn flags(pass: &RenderPass, graph: &RenderGraph) -> MaterialFlags {
    let mut flags = MaterialFlags::for_outputs(
        !pass.depth_only,
        pass.normal_target.is_some(),
        pass.position_target.is_some(),
    );
    flags.set(MaterialFlags::HAS_TRANSPARENCY, graph.has_transparency());
    flags
}
