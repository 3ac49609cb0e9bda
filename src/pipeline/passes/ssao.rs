//! Screen-space ambient occlusion.
//!
//! ```text
//! ssao_input (ambient only) ─► normal, position, ambient-lit colour + depth R
//!                                  │
//! ssao (full screen) ◄─────────────┘  writes R colour × visibility into C
//!                                  │
//! user pass ─► hybrid(C colour, R depth), no clears, ambient folded
//! ```
//!
//! The input pass draws every entity under the ambient light alone, so the
//! occlusion pass darkens the surface colour rather than a flat ambient term.
//! The user pass then skips its own ambient sub-pass and adds the remaining
//! lights on top.

use std::f32::consts::TAU;

use glam::Vec2;

use super::ExpansionContext;
use crate::errors::{Result, StrataError};
use crate::graph::{ArithmeticOp, Attribute, CompareOp, RenderGraph, UnaryOp};
use crate::pipeline::pass::{PassKind, RenderPass};
use crate::resources::{SsaoSettings, TextureId};
use crate::scene::Camera;

/// Screen-space distance of the outermost sample ring, in texels.
const SAMPLE_SPREAD_TEXELS: f32 = 8.0;

/// Full-screen graph computing `ambient_lit × (1 − occlusion)`, keeping the
/// input alpha.
pub(crate) fn occlusion_graph(
    ambient_lit: TextureId,
    normals: TextureId,
    positions: TextureId,
    settings: &SsaoSettings,
    texel: Vec2,
) -> RenderGraph {
    let mut graph = RenderGraph::new();

    let normal = graph.texture(normals);
    let normal = graph.select(normal, &[0, 1, 2]);
    let normal = graph.create_variable("normal", normal);
    let centre = graph.texture(positions);
    let centre = graph.select(centre, &[0, 1, 2]);
    let centre = graph.create_variable("centre", centre);

    let uv = graph.attribute(Attribute::ScreenUv);
    let bias = graph.value(settings.bias);
    let radius = graph.value(settings.radius);
    let zero = graph.value(0.0);

    let count = settings.clamped_sample_count();
    let mut sum = zero;
    for k in 0..count {
        let t = k as f32 / count as f32;
        let (sin, cos) = (TAU * t).sin_cos();
        let offset = Vec2::new(cos, sin) * texel * SAMPLE_SPREAD_TEXELS * (0.25 + 0.75 * t);

        let offset = graph.value(offset);
        let sample_uv = graph.add(uv, offset);
        let sample = graph.texture_at(positions, sample_uv);
        let sample = graph.select(sample, &[0, 1, 2]);
        let delta = graph.subtract(sample, centre);

        let facing = graph.arithmetic(ArithmeticOp::Dot, normal, delta);
        let facing = graph.subtract(facing, bias);
        let contribution = graph.unary(UnaryOp::Saturate, facing);

        // Samples farther than the radius do not occlude
        let distance = graph.arithmetic(ArithmeticOp::Dot, delta, delta);
        let distance = graph.unary(UnaryOp::Sqrt, distance);
        let contribution = graph.conditional(CompareOp::Less, distance, radius, contribution, zero);
        sum = graph.add(sum, contribution);
    }

    let scale = graph.value(settings.intensity / count as f32);
    let occlusion = graph.multiply(sum, scale);
    let occlusion = graph.unary(UnaryOp::Saturate, occlusion);
    let one = graph.value(1.0);
    let visibility = graph.subtract(one, occlusion);
    let surface = graph.texture(ambient_lit);
    let rgb = graph.select(surface, &[0, 1, 2]);
    let alpha = graph.select(surface, &[3]);
    let lit = graph.multiply(rgb, visibility);
    let colour = graph.combine(&[lit, alpha]);
    graph.post_processing(colour);
    graph
}

/// Adds the occlusion input and combine passes for `pass` to `pre_passes`
/// and redirects `pass` onto the combined target.
///
/// `pass` must already render into an off-screen colour target.
pub(crate) fn expand(
    ctx: &mut ExpansionContext<'_>,
    pass: &mut RenderPass,
    settings: &SsaoSettings,
    pre_passes: &mut Vec<RenderPass>,
) -> Result<()> {
    let Some(colour) = pass.colour_target else {
        return Err(StrataError::precondition(
            "ambient occlusion requires an off-screen colour target",
        ));
    };

    let normals = ctx.window_target()?;
    let positions = ctx.window_target()?;
    let ambient_lit = ctx.window_target()?;

    let mut input = RenderPass::synthesized(
        PassKind::AmbientOcclusionInput,
        pass.scene,
        pass.camera,
        "ssao_input",
    );
    input.source = pass.source;
    input.colour_target = Some(ambient_lit);
    input.normal_target = Some(normals);
    input.position_target = Some(positions);

    let texel = Vec2::new(
        1.0 / ctx.settings.width as f32,
        1.0 / ctx.settings.height as f32,
    );
    let graph = occlusion_graph(
        ctx.render_targets.colour_texture(ambient_lit)?,
        ctx.render_targets.colour_texture(normals)?,
        ctx.render_targets.colour_texture(positions)?,
        settings,
        texel,
    );
    let scene = ctx.full_screen_scene(graph)?;
    let mut combine = RenderPass::synthesized(PassKind::AmbientOcclusion, scene, Camera::full_screen(), "ssao");
    // The combine pass reuses the user pass's camera, not the full-screen one
    combine.camera = pass.camera;
    combine.source = pass.source;
    combine.colour_target = Some(colour);

    pass.colour_target = Some(ctx.hybrid_target(colour, ambient_lit)?);
    pass.clear_colour = false;
    pass.clear_depth = false;
    pass.fold_ambient = true;

    pre_passes.push(input);
    pre_passes.push(combine);
    Ok(())
}
