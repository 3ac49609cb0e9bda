//! Brightness, contrast and saturation.

use glam::Vec3;

use super::{ExpansionContext, PostChain};
use crate::errors::Result;
use crate::graph::{ArithmeticOp, RenderGraph};
use crate::resources::bloom::LUMINANCE_WEIGHTS;
use crate::resources::{ColourAdjustSettings, TextureId};

/// `rgb' = mix(luma, ((rgb − ½) × contrast + ½) × brightness, saturation)`
pub(crate) fn colour_adjust_graph(source: TextureId, settings: &ColourAdjustSettings) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.texture(source);
    let rgb = graph.select(colour, &[0, 1, 2]);
    let alpha = graph.select(colour, &[3]);

    let half = graph.value(0.5);
    let contrast = graph.value(settings.contrast);
    let centred = graph.subtract(rgb, half);
    let scaled = graph.multiply(centred, contrast);
    let rgb = graph.add(scaled, half);

    let brightness = graph.value(settings.brightness);
    let rgb = graph.multiply(rgb, brightness);

    let weights = graph.value(Vec3::from(LUMINANCE_WEIGHTS));
    let luma = graph.arithmetic(ArithmeticOp::Dot, rgb, weights);
    let chroma = graph.subtract(rgb, luma);
    let saturation = graph.value(settings.saturation);
    let chroma = graph.multiply(chroma, saturation);
    let rgb = graph.add(luma, chroma);

    let out = graph.combine(&[rgb, alpha]);
    graph.post_processing(out);
    graph
}

pub(crate) fn expand(ctx: &mut ExpansionContext<'_>, chain: &mut PostChain, settings: &ColourAdjustSettings) -> Result<()> {
    let source = chain.source_texture(ctx)?;
    chain.push(ctx, "colour_adjust", colour_adjust_graph(source, settings))?;
    Ok(())
}
