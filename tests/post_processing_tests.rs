//! Post-Processing Tests
//!
//! Runs expanded pipelines through a tiny software renderer that evaluates
//! every full-screen graph per pixel, and checks the resulting images.
//!
//! Tests for:
//! - Bloom bypass (infinite threshold) leaves the image unchanged
//! - Bloom with a zero threshold only brightens
//! - Tone mapping and gamma formulas
//! - Identity colour adjustment
//! - Anti-aliasing leaves flat images untouched
//! - Ambient occlusion on an unoccluded plane keeps the ambient-lit surface colour

use std::collections::HashMap;

use glam::{UVec2, Vec2, Vec3, Vec4};

use strata::backend::headless;
use strata::graph::{EvalContext, Evaluator, TextureSource};
use strata::pipeline::PassKind;
use strata::resources::{
    BloomSettings, ColourAdjustSettings, FxaaSettings, GammaSettings, SsaoSettings, TextureId,
    ToneMappingMode, ToneMappingSettings,
};
use strata::{
    Camera, PipelineSettings, PostProcessingDescription, RenderCommand, RenderEntity, RenderFrame,
    RenderGraph, RenderPass, RenderPipeline, Renderer,
};

const SIZE: u32 = 8;
const EPSILON: f32 = 1e-5;

fn vec4_approx(a: Vec4, b: Vec4) -> bool {
    (a - b).abs().max_element() < EPSILON
}

// ============================================================================
// Software Renderer
// ============================================================================

/// Images keyed by colour texture; `None` is the default framebuffer.
#[derive(Default)]
struct Images(HashMap<Option<TextureId>, Vec<Vec4>>);

impl Images {
    fn get(&self, target: Option<TextureId>) -> Option<&Vec<Vec4>> {
        self.0.get(&target)
    }

    fn fill(&mut self, target: Option<TextureId>, f: impl Fn(UVec2) -> Vec4) {
        let pixels = pixels().map(f).collect();
        self.0.insert(target, pixels);
    }
}

impl TextureSource for Images {
    fn sample(&self, texture: TextureId, uv: Vec2) -> Vec4 {
        let Some(image) = self.0.get(&Some(texture)) else {
            return Vec4::ZERO;
        };
        let texel = (uv * SIZE as f32).floor().clamp(Vec2::ZERO, Vec2::splat((SIZE - 1) as f32));
        image[texel.y as usize * SIZE as usize + texel.x as usize]
    }

    fn texel_size(&self, _texture: TextureId) -> Vec2 {
        Vec2::splat(1.0 / SIZE as f32)
    }
}

fn pixels() -> impl Iterator<Item = UVec2> {
    (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| UVec2::new(x, y)))
}

fn pixel_centre(p: UVec2) -> Vec2 {
    (p.as_vec2() + 0.5) / SIZE as f32
}

/// Scene passes are "rasterised" as `scene_colour` for every pixel;
/// full-screen passes are evaluated per pixel.
struct SoftwareRenderer {
    scene_colour: fn(UVec2) -> Vec4,
    images: Images,
    target: Option<TextureId>,
}

impl SoftwareRenderer {
    fn new(scene_colour: fn(UVec2) -> Vec4) -> Self {
        Self {
            scene_colour,
            images: Images::default(),
            target: None,
        }
    }

    fn screen(&self) -> &[Vec4] {
        self.images.get(None).expect("nothing was presented")
    }
}

fn colour_texture(frame: &RenderFrame<'_>, target: Option<strata::resources::RenderTargetId>) -> Option<TextureId> {
    target.map(|t| frame.render_targets.colour_texture(t).unwrap())
}

impl Renderer for SoftwareRenderer {
    fn execute_pass_start(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        let pass = frame.pass(command).unwrap();
        self.target = colour_texture(frame, pass.colour_target);
        if pass.clear_colour || self.images.get(self.target).is_none() {
            self.images.fill(self.target, |_| Vec4::ZERO);
        }
    }

    fn execute_draw(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        let pass = frame.pass(command).unwrap();
        match pass.kind() {
            PassKind::Scene => {
                let colour = self.scene_colour;
                self.images.fill(self.target, colour);
            }
            PassKind::AmbientOcclusionInput => {
                // A flat plane facing the camera, lit by the ambient light only
                let ambient = frame.scene(command).unwrap().lighting().ambient().colour();
                let colour = self.scene_colour;
                self.images
                    .fill(self.target, |p| (colour(p).truncate() * ambient).extend(colour(p).w));
                self.images.fill(colour_texture(frame, pass.normal_target), |_| Vec4::Z);
                self.images.fill(colour_texture(frame, pass.position_target), |_| Vec4::ZERO);
            }
            PassKind::AmbientOcclusion | PassKind::PostProcessing => {
                let (_, graph) = frame.draw_target(command).unwrap();
                let out = evaluate_full_screen(graph, &self.images);
                self.images.0.insert(self.target, out);
            }
            PassKind::Shadow => {}
        }
    }
}

fn evaluate_full_screen(graph: &RenderGraph, images: &Images) -> Vec<Vec4> {
    let mut evaluator = Evaluator::new(graph, images);
    pixels()
        .map(|p| {
            evaluator
                .evaluate_root(&EvalContext::screen(pixel_centre(p)))
                .unwrap()
        })
        .collect()
}

// ============================================================================
// Fixtures
// ============================================================================

fn gradient(p: UVec2) -> Vec4 {
    Vec4::new(p.x as f32 * 0.25, p.y as f32 / SIZE as f32, 0.5, 1.0)
}

fn flat(_: UVec2) -> Vec4 {
    Vec4::new(0.3, 0.6, 0.9, 1.0)
}

fn run(description: PostProcessingDescription, scene_colour: fn(UVec2) -> Vec4) -> Vec<Vec4> {
    run_with(description, scene_colour, Vec3::ONE)
}

fn run_with(
    description: PostProcessingDescription,
    scene_colour: fn(UVec2) -> Vec4,
    ambient: Vec3,
) -> Vec<Vec4> {
    let _ = env_logger::builder().is_test(true).try_init();
    let settings = PipelineSettings {
        width: SIZE,
        height: SIZE,
        ..PipelineSettings::default()
    };
    let mut pipeline = RenderPipeline::new(settings, headless::managers(SIZE, SIZE));
    let scene = pipeline.create_scene();

    let mut graph = RenderGraph::new();
    let colour = graph.value(Vec4::ONE);
    graph.render(colour);
    let graph = pipeline.create_render_graph(graph);
    let cube = pipeline.meshes().cube(Vec4::ONE).unwrap();
    {
        let scene = pipeline.scene_mut(scene).unwrap();
        scene.add_entity(graph, RenderEntity::new(cube));
        scene.lighting_mut().set_ambient_colour(ambient);
    }

    let camera = Camera::new_perspective(1.0, 1.0, 0.1, 10.0);
    pipeline.create_pass(RenderPass::new(scene, camera).with_post_processing(description));

    let mut renderer = SoftwareRenderer::new(scene_colour);
    pipeline.render(&mut renderer).unwrap();
    renderer.screen().to_vec()
}

fn reference(scene_colour: fn(UVec2) -> Vec4) -> Vec<Vec4> {
    pixels().map(scene_colour).collect()
}

// ============================================================================
// Bloom
// ============================================================================

#[test]
fn infinite_threshold_bloom_is_exact_bypass() {
    let description = PostProcessingDescription {
        bloom: Some(BloomSettings::new().with_threshold(f32::INFINITY).with_iterations(2)),
        ..PostProcessingDescription::default()
    };
    let bloomed = run(description, gradient);
    assert_eq!(bloomed, run(PostProcessingDescription::default(), gradient));
    assert_eq!(bloomed, reference(gradient));
}

#[test]
fn zero_threshold_bloom_only_brightens() {
    let description = PostProcessingDescription {
        bloom: Some(BloomSettings::new().with_threshold(0.0).with_iterations(1)),
        ..PostProcessingDescription::default()
    };
    let bloomed = run(description, gradient);
    let original = reference(gradient);

    for (out, base) in bloomed.iter().zip(&original) {
        assert!(out.truncate().cmpge(base.truncate()).all(), "{out} < {base}");
    }
    assert!(bloomed.iter().zip(&original).any(|(out, base)| out.z > base.z));
}

// ============================================================================
// Tone Mapping, Gamma, Colour Adjustment
// ============================================================================

#[test]
fn reinhard_tone_mapping() {
    let description = PostProcessingDescription {
        tone_map: Some(ToneMappingSettings {
            mode: ToneMappingMode::Reinhard,
            exposure: 2.0,
        }),
        ..PostProcessingDescription::default()
    };
    let mapped = run(description, gradient);

    for (out, base) in mapped.iter().zip(reference(gradient)) {
        let c = base.truncate() * 2.0;
        let expected = (c / (Vec3::ONE + c)).extend(base.w);
        assert!(vec4_approx(*out, expected), "{out} != {expected}");
    }
}

#[test]
fn exposure_tone_mapping_stays_below_one() {
    let description = PostProcessingDescription {
        tone_map: Some(ToneMappingSettings::default()),
        ..PostProcessingDescription::default()
    };
    for out in run(description, gradient) {
        assert!(out.truncate().cmplt(Vec3::ONE).all());
        assert_eq!(out.w, 1.0);
    }
}

#[test]
fn gamma_correction() {
    let description = PostProcessingDescription {
        gamma: Some(GammaSettings { gamma: 2.0 }),
        ..PostProcessingDescription::default()
    };
    let corrected = run(description, flat);
    let expected = Vec4::new(0.3_f32.sqrt(), 0.6_f32.sqrt(), 0.9_f32.sqrt(), 1.0);
    assert!(corrected.iter().all(|out| vec4_approx(*out, expected)));
}

#[test]
fn default_colour_adjustment_is_identity() {
    let description = PostProcessingDescription {
        colour_adjust: Some(ColourAdjustSettings::default()),
        ..PostProcessingDescription::default()
    };
    let adjusted = run(description, gradient);
    for (out, base) in adjusted.iter().zip(reference(gradient)) {
        assert!(vec4_approx(*out, base), "{out} != {base}");
    }
}

#[test]
fn zero_saturation_is_greyscale() {
    let description = PostProcessingDescription {
        colour_adjust: Some(ColourAdjustSettings {
            saturation: 0.0,
            ..ColourAdjustSettings::default()
        }),
        ..PostProcessingDescription::default()
    };
    for out in run(description, flat) {
        assert!((out.x - out.y).abs() < EPSILON && (out.y - out.z).abs() < EPSILON);
    }
}

// ============================================================================
// Anti-Aliasing
// ============================================================================

#[test]
fn anti_aliasing_leaves_flat_image_untouched() {
    let description = PostProcessingDescription {
        anti_alias: Some(FxaaSettings::default()),
        ..PostProcessingDescription::default()
    };
    assert_eq!(run(description, flat), reference(flat));
}

// ============================================================================
// Ambient Occlusion
// ============================================================================

#[test]
fn unoccluded_plane_receives_full_ambient() {
    let description = PostProcessingDescription {
        ambient_occlusion: Some(SsaoSettings::default()),
        ..PostProcessingDescription::default()
    };
    let ambient = Vec3::new(0.2, 0.3, 0.4);
    let lit = run_with(description, gradient, ambient);

    // Only the ambient sub-pass exists and it is folded into the occlusion
    // pass, so the user pass draws nothing over the combined image.
    for (out, base) in lit.iter().zip(reference(gradient)) {
        let expected = (base.truncate() * ambient).extend(base.w);
        assert!(vec4_approx(*out, expected), "{out} != {expected}");
    }
}

#[test]
fn occlusion_keeps_surface_colour() {
    let description = PostProcessingDescription {
        ambient_occlusion: Some(SsaoSettings::default()),
        ..PostProcessingDescription::default()
    };
    let occluded = run(description, flat);
    assert_eq!(occluded, reference(flat));
    assert!(occluded.iter().all(|out| out.x < out.y && out.y < out.z));
}
