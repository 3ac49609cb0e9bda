//! Tone mapping and gamma correction.

use glam::Vec3;

use super::{ExpansionContext, PostChain};
use crate::errors::Result;
use crate::graph::{ArithmeticOp, RenderGraph, UnaryOp};
use crate::resources::{GammaSettings, TextureId, ToneMappingMode, ToneMappingSettings};

/// Maps HDR colour into `0..1`. Alpha passes through.
///
/// - Linear: `rgb × exposure`
/// - Reinhard: `c / (1 + c)` with `c = rgb × exposure`
/// - Exposure: `1 − e^(−rgb × exposure)`
pub(crate) fn tone_map_graph(source: TextureId, settings: &ToneMappingSettings) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.texture(source);
    let rgb = graph.select(colour, &[0, 1, 2]);
    let alpha = graph.select(colour, &[3]);
    let exposure = graph.value(settings.exposure);
    let exposed = graph.multiply(rgb, exposure);
    let one = graph.value(1.0);

    let mapped = match settings.mode {
        ToneMappingMode::Linear => exposed,
        ToneMappingMode::Reinhard => {
            let denominator = graph.add(one, exposed);
            graph.divide(exposed, denominator)
        }
        ToneMappingMode::Exposure => {
            let negated = graph.unary(UnaryOp::Negate, exposed);
            let falloff = graph.unary(UnaryOp::Exp, negated);
            graph.subtract(one, falloff)
        }
    };

    let out = graph.combine(&[mapped, alpha]);
    graph.post_processing(out);
    graph
}

/// `rgb^(1 / gamma)`. Alpha passes through.
pub(crate) fn gamma_graph(source: TextureId, settings: &GammaSettings) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.texture(source);
    let rgb = graph.select(colour, &[0, 1, 2]);
    let alpha = graph.select(colour, &[3]);
    let inverse = graph.value(Vec3::splat(1.0 / settings.gamma));
    let corrected = graph.arithmetic(ArithmeticOp::Pow, rgb, inverse);
    let out = graph.combine(&[corrected, alpha]);
    graph.post_processing(out);
    graph
}

pub(crate) fn expand_tone_map(ctx: &mut ExpansionContext<'_>, chain: &mut PostChain, settings: &ToneMappingSettings) -> Result<()> {
    let source = chain.source_texture(ctx)?;
    chain.push(ctx, "tone_map", tone_map_graph(source, settings))?;
    Ok(())
}

pub(crate) fn expand_gamma(ctx: &mut ExpansionContext<'_>, chain: &mut PostChain, settings: &GammaSettings) -> Result<()> {
    let source = chain.source_texture(ctx)?;
    chain.push(ctx, "gamma", gamma_graph(source, settings))?;
    Ok(())
}
