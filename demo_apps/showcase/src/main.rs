//! Showcase
//!
//! Builds a small scene on the headless backend and logs the command queue
//! the pipeline produces for it:
//!
//! - a terrain heightmap and a skinned figure lit by a shadow-casting sun
//! - a sky box, ambient occlusion and a bloom / tone-map / gamma / FXAA chain
//! - an idle -> lean blend on the base layer with a one-shot wave on top,
//!   driving the figure's skeleton
//!
//! Run with `RUST_LOG=info cargo run -p showcase`.

use anyhow::{Context, anyhow};
use glam::{Mat4, Quat, Vec3, Vec4};

use strata::backend::headless::{self, RecordingRenderer};
use strata::graph::{Attribute, RenderGraph};
use strata::resources::{
    BloomSettings, FxaaSettings, GammaSettings, SsaoSettings, ToneMappingMode, ToneMappingSettings,
};
use strata::scene::{Bone, DirectionalLight, PointLight};
use strata::{
    Animation, AnimationController, AnimationState, Camera, Keyframe, PipelineSettings,
    PlaybackType, PostProcessingDescription, RenderCommand, RenderEntity, RenderFrame, RenderPass,
    RenderPipeline, Renderer, Skeleton, Transform,
};

const FRAME_TIME: f32 = 1.0 / 60.0;

/// Logs every command as it is dispatched.
struct LoggingRenderer {
    inner: RecordingRenderer,
}

impl Renderer for LoggingRenderer {
    fn execute_pass_start(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        let label = frame.pass(command).map_or("?", RenderPass::label);
        log::info!("pass {:>2} start  [{label}]", command.pass);
        self.inner.execute_pass_start(frame, command);
    }

    fn execute_draw(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        let name = frame
            .draw_target(command)
            .and_then(|(item, _)| item.entity.name())
            .unwrap_or("<unnamed>");
        log::info!(
            "  draw {name:<10} light={:?} material={:?} shadow_map={:?}",
            command.light,
            command.material,
            command.shadow_map
        );
        self.inner.execute_draw(frame, command);
    }

    fn execute_pass_end(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        log::info!("pass {:>2} end", command.pass);
        self.inner.execute_pass_end(frame, command);
    }

    fn execute_present(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        log::info!("present");
        self.inner.execute_present(frame, command);
    }
}

fn figure() -> anyhow::Result<Skeleton> {
    let up = |y: f32| Transform::from_translation(Vec3::new(0.0, y, 0.0));
    let skeleton = Skeleton::new(vec![
        Bone::root("hips", Mat4::IDENTITY, up(1.0)),
        Bone::new("spine", "hips", Mat4::IDENTITY, up(0.5)),
        Bone::new("arm", "spine", Mat4::IDENTITY, Transform::from_translation(Vec3::X * 0.4)),
    ])?;
    Ok(skeleton)
}

fn animations(settings: &PipelineSettings) -> anyhow::Result<AnimationController> {
    let spine = |t: f32, tilt: f32| {
        Keyframe::new(
            t,
            Transform::new(Vec3::Y * 0.5, Quat::from_rotation_x(tilt), Vec3::ONE),
        )
    };
    let idle = Animation::new(
        "idle",
        [("spine".to_string(), vec![spine(0.0, 0.0), spine(1.0, 0.0)])],
        PlaybackType::Looping,
    )?;
    let lean = Animation::new(
        "lean",
        [("spine".to_string(), vec![spine(0.0, 0.3), spine(1.0, 0.3)])],
        PlaybackType::Looping,
    )?;

    let raised = |t: f32, angle: f32| {
        Keyframe::new(
            t,
            Transform::new(Vec3::X * 0.4, Quat::from_rotation_z(angle), Vec3::ONE),
        )
    };
    let wave = Animation::new(
        "wave",
        [(
            "arm".to_string(),
            vec![raised(0.0, 0.0), raised(0.25, 1.2), raised(0.5, 0.0)],
        )],
        PlaybackType::Single,
    )?;

    let mut controller = AnimationController::from_settings(settings);
    let idle = controller.add_state(AnimationState::new(idle, 0));
    let lean = controller.add_state(AnimationState::new(lean, 0));
    controller.add_transition(idle, lean, 0.3)?;
    // Overlay: plays once from the start, then eases back to the base layer
    controller.add_state(AnimationState::new(wave, 1));
    controller.set_layer_mask(1, ["arm"]);
    Ok(controller)
}

fn terrain_graph() -> RenderGraph {
    let mut graph = RenderGraph::new();
    let normal = graph.attribute(Attribute::Normal);
    let up = graph.select(normal, &[1]);
    let grass = graph.value(Vec4::new(0.2, 0.5, 0.1, 1.0));
    let shade = graph.multiply(grass, up);
    graph.render(shade);
    graph
}

fn flat_graph(colour: Vec4) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.value(colour);
    graph.render(colour);
    graph
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = PipelineSettings {
        width: 320,
        height: 180,
        shadow_map_size: 512,
        ..PipelineSettings::default()
    };
    let managers = headless::managers(settings.width, settings.height);
    let mut pipeline = RenderPipeline::new(settings.clone(), managers);
    let scene = pipeline.create_scene();

    // Meshes and materials
    let heights: Vec<f32> = (0..64).map(|i| ((i % 8) as f32 * 0.4).sin() * 0.2).collect();
    let terrain_mesh = pipeline.meshes().heightmap(Vec4::ONE, &heights, 8)?;
    let figure_mesh = pipeline.meshes().cube(Vec4::new(0.8, 0.6, 0.5, 1.0))?;
    let sky = pipeline
        .textures()
        .cube_map(["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"])?;

    let terrain_graph = pipeline.create_render_graph(terrain_graph());
    let figure_graph = pipeline.create_render_graph(flat_graph(Vec4::new(0.9, 0.7, 0.6, 1.0)));

    let scene_ref = pipeline.scene_mut(scene).context("scene was just created")?;
    let mut ground = RenderEntity::new(terrain_mesh).named("terrain");
    ground.set_scale(Vec3::new(10.0, 1.0, 10.0));
    scene_ref.add_entity(terrain_graph, ground);
    let body = RenderEntity::new(figure_mesh)
        .named("figure")
        .with_skeleton(figure()?);
    let figure_id = scene_ref.add_entity(figure_graph, body);

    let lighting = scene_ref.lighting_mut();
    lighting.set_ambient_colour(Vec3::splat(0.15));
    lighting.add_point_light(PointLight::new(
        Vec3::new(2.0, 3.0, 1.0),
        Vec3::new(1.0, 0.8, 0.6),
        8.0,
    ));
    let sun = DirectionalLight::new(Vec3::new(-0.4, -1.0, -0.3), Vec3::ONE).with_shadows();
    lighting.add_directional_light(sun);

    // Screen pass
    let camera = Camera::new_perspective(1.0, settings.aspect_ratio(), 0.1, 100.0)
        .looking_at(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, 1.0, 0.0));
    let post = PostProcessingDescription {
        ambient_occlusion: Some(SsaoSettings::default()),
        bloom: Some(BloomSettings::new().with_threshold(0.9).with_iterations(2)),
        tone_map: Some(ToneMappingSettings {
            mode: ToneMappingMode::Reinhard,
            ..ToneMappingSettings::default()
        }),
        gamma: Some(GammaSettings::default()),
        anti_alias: Some(FxaaSettings::default()),
        ..PostProcessingDescription::default()
    };
    pipeline.create_pass(
        RenderPass::new(scene, camera)
            .with_sky_box(sky)
            .with_post_processing(post)
            .with_label("main"),
    );

    let mut renderer = LoggingRenderer {
        inner: RecordingRenderer::new(),
    };
    pipeline.render(&mut renderer)?;
    log::info!(
        "first frame: {} passes, {} commands",
        pipeline.passes().len(),
        pipeline.commands().len()
    );

    // Animate for a second; the figure starts leaning a quarter of the way in.
    let mut controller = animations(&settings)?;
    for frame in 0..60 {
        if frame == 15 {
            controller.transition(0, "lean");
        }
        let skeleton = pipeline
            .scene_mut(scene)
            .and_then(|scene| scene.entity_mut(figure_id))
            .and_then(RenderEntity::skeleton_mut)
            .ok_or_else(|| anyhow!("figure lost its skeleton"))?;
        controller.update(FRAME_TIME, skeleton)?;
        if frame % 15 == 0 {
            let arm = skeleton.world_transform("arm").context("arm bone")?;
            let easing = controller.query().is_easing("arm", controller.clock());
            log::info!(
                "t={:.2}s arm at {} (easing: {easing})",
                controller.clock(),
                arm.w_axis.truncate()
            );
        }
    }

    // Skeleton updates are positional; the queue is replayed as is.
    log::info!("dirty level before second frame: {:?}", pipeline.dirty_level());
    pipeline.render(&mut renderer)?;
    log::info!(
        "rendered {} frames, {} commands dispatched",
        renderer.inner.frames,
        renderer.inner.commands.len()
    );
    Ok(())
}
