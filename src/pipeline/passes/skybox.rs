//! Sky box injection.

use glam::Vec4;

use super::ExpansionContext;
use crate::errors::Result;
use crate::graph::RenderGraph;
use crate::pipeline::pass::{PassId, RenderPass};
use crate::resources::TextureId;
use crate::scene::RenderEntity;

/// `render(sky_box(texture))`
pub(crate) fn sky_box_graph(texture: TextureId) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let sky = graph.sky_box(texture);
    graph.render(sky);
    graph
}

/// Inserts a cube shaded by the sky box at the front of the pass's scene.
///
/// The entity is tagged with the pass, so only that pass draws it and only
/// in its ambient sub-pass.
pub(crate) fn inject(ctx: &mut ExpansionContext<'_>, id: PassId, pass: &RenderPass) -> Result<()> {
    let Some(texture) = pass.sky_box else {
        return Ok(());
    };
    let cube = ctx.meshes.cube(Vec4::ONE)?;
    let graph = ctx.add_graph(sky_box_graph(texture));

    let mut entity = RenderEntity::new(cube)
        .named("sky_box")
        .with_receive_shadow(false);
    entity.mark_sky_box(id);
    if let Some(scene) = ctx.scenes.get_mut(pass.scene) {
        scene.insert_entity_front(graph, entity);
    }
    Ok(())
}
