//! Bloom expansion.
//!
//! reference copy → bright pass → `iterations` × (horizontal + vertical
//! blur) → additive composite onto the reference.

use glam::{Vec2, Vec3, Vec4};

use super::{ExpansionContext, PostChain, copy_graph};
use crate::errors::Result;
use crate::graph::{ArithmeticOp, CompareOp, CompositeOp, RenderGraph};
use crate::resources::TextureId;
use crate::resources::bloom::{BloomSettings, GAUSSIAN_WEIGHTS, LUMINANCE_WEIGHTS};

/// Keeps pixels whose luminance exceeds `threshold`, blacks out the rest.
pub(crate) fn threshold_graph(source: TextureId, threshold: f32) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.texture(source);
    let rgb = graph.select(colour, &[0, 1, 2]);
    let weights = graph.value(Vec3::from(LUMINANCE_WEIGHTS));
    let luminance = graph.arithmetic(ArithmeticOp::Dot, rgb, weights);
    let threshold = graph.value(threshold);
    let black = graph.value(Vec4::ZERO);
    let bright = graph.conditional(CompareOp::Greater, luminance, threshold, colour, black);
    graph.post_processing(bright);
    graph
}

pub(crate) fn blur_graph(source: TextureId, direction: Vec2) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let blur = graph.blur(source, direction, &GAUSSIAN_WEIGHTS);
    graph.post_processing(blur);
    graph
}

/// `reference + strength × blurred`
pub(crate) fn composite_graph(reference: TextureId, blurred: TextureId, strength: f32) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let base = graph.texture(reference);
    let glow = graph.texture(blurred);
    let strength = graph.value(strength);
    let glow = graph.multiply(glow, strength);
    let out = graph.composite(CompositeOp::Add, base, glow);
    graph.post_processing(out);
    graph
}

pub(crate) fn expand(ctx: &mut ExpansionContext<'_>, chain: &mut PostChain, settings: &BloomSettings) -> Result<()> {
    if !settings.is_enabled() {
        return Ok(());
    }

    let source = chain.source_texture(ctx)?;
    let reference = chain.push(ctx, "bloom_reference", copy_graph(source))?;
    let reference = ctx.render_targets.colour_texture(reference)?;

    chain.push(ctx, "bloom_threshold", threshold_graph(reference, settings.threshold))?;
    for _ in 0..settings.iterations {
        for direction in [Vec2::X, Vec2::Y] {
            let source = chain.source_texture(ctx)?;
            chain.push(ctx, "bloom_blur", blur_graph(source, direction * settings.radius))?;
        }
    }

    let blurred = chain.source_texture(ctx)?;
    chain.push(ctx, "bloom_composite", composite_graph(reference, blurred, settings.strength))?;
    Ok(())
}
