//! Directional shadow maps.
//!
//! Every shadow-casting directional light of every scene drawn by a user
//! pass gets one depth-only pass rendered from the light's orthographic
//! shadow camera into a dedicated square target.

use rustc_hash::FxHashSet;

use super::ExpansionContext;
use crate::errors::Result;
use crate::pipeline::pass::{PassKind, RenderPass};
use crate::pipeline::queue::ShadowMapTable;
use crate::scene::SceneId;

/// Appends one shadow pass per shadow-casting light and records its target.
pub(crate) fn expand(
    ctx: &mut ExpansionContext<'_>,
    user_passes: &[RenderPass],
    shadow_maps: &mut ShadowMapTable,
    out: &mut Vec<RenderPass>,
) -> Result<()> {
    let mut seen = FxHashSet::default();
    let scenes: Vec<SceneId> = user_passes
        .iter()
        .map(|pass| pass.scene)
        .filter(|scene| seen.insert(*scene))
        .collect();

    let size = ctx.settings.shadow_map_size;
    let distance = ctx.settings.shadow_distance;
    for scene_id in scenes {
        let Some(scene) = ctx.scenes.get(scene_id) else {
            continue;
        };
        let lights: Vec<_> = scene
            .lighting()
            .directional_lights()
            .filter(|(_, light)| light.casts_shadows())
            .map(|(id, light)| (id, light.shadow_camera(distance)))
            .collect();

        for (light, camera) in lights {
            let target = ctx.sized_target(size, size)?;
            let mut pass = RenderPass::synthesized(PassKind::Shadow, scene_id, camera, "shadow");
            pass.colour_target = Some(target);
            pass.depth_only = true;
            pass.shadow_light = Some(light);
            shadow_maps.insert((scene_id, light), target);
            out.push(pass);
        }
    }
    Ok(())
}
