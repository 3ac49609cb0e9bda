//! Edge-aware anti-aliasing.
//!
//! Pixels whose neighbourhood luminance contrast exceeds the edge threshold
//! are replaced by the average of a horizontal and a vertical box blur;
//! everything else is copied unchanged.

use glam::{Vec2, Vec3};

use super::{ExpansionContext, PostChain};
use crate::errors::Result;
use crate::graph::{ArithmeticOp, Attribute, CompareOp, NodeId, RenderGraph, UnaryOp};
use crate::resources::bloom::LUMINANCE_WEIGHTS;
use crate::resources::{FxaaSettings, TextureId};

pub(crate) fn fxaa_graph(source: TextureId, settings: &FxaaSettings, texel: Vec2) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let uv = graph.attribute(Attribute::ScreenUv);
    let weights = graph.value(Vec3::from(LUMINANCE_WEIGHTS));

    let luma_at = |graph: &mut RenderGraph, offset: Vec2| -> NodeId {
        let offset = graph.value(offset);
        let at = graph.add(uv, offset);
        let colour = graph.texture_at(source, at);
        let rgb = graph.select(colour, &[0, 1, 2]);
        graph.arithmetic(ArithmeticOp::Dot, rgb, weights)
    };
    let north = luma_at(&mut graph, Vec2::new(0.0, -texel.y));
    let south = luma_at(&mut graph, Vec2::new(0.0, texel.y));
    let east = luma_at(&mut graph, Vec2::new(texel.x, 0.0));
    let west = luma_at(&mut graph, Vec2::new(-texel.x, 0.0));

    let vertical = graph.subtract(north, south);
    let vertical = graph.unary(UnaryOp::Abs, vertical);
    let horizontal = graph.subtract(east, west);
    let horizontal = graph.unary(UnaryOp::Abs, horizontal);
    let contrast = graph.arithmetic(ArithmeticOp::Max, vertical, horizontal);
    let contrast = graph.create_variable("edge_contrast", contrast);

    let taps = settings.quality.weights();
    let blur_x = graph.blur(source, Vec2::X, taps);
    let blur_y = graph.blur(source, Vec2::Y, taps);
    let blurred = graph.add(blur_x, blur_y);
    let half = graph.value(0.5);
    let blurred = graph.multiply(blurred, half);

    let centre = graph.texture(source);
    let threshold = graph.value(settings.edge_threshold);
    let out = graph.conditional(CompareOp::Greater, contrast, threshold, blurred, centre);
    graph.post_processing(out);
    graph
}

pub(crate) fn expand(ctx: &mut ExpansionContext<'_>, chain: &mut PostChain, settings: &FxaaSettings) -> Result<()> {
    let texel = Vec2::new(
        1.0 / ctx.settings.width as f32,
        1.0 / ctx.settings.height as f32,
    );
    let source = chain.source_texture(ctx)?;
    chain.push(ctx, "fxaa", fxaa_graph(source, settings, texel))?;
    Ok(())
}
