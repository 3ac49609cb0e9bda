//! Resource Layer Tests
//!
//! Tests for:
//! - Headless mesh, texture and render target managers (caching, errors)
//! - Hybrid render targets
//! - Post-processing settings: defaults, JSON loading, stage queries

use glam::Vec4;

use strata::backend::headless::{
    ATTACHMENT_TEXTURE_BASE, HeadlessMeshManager, HeadlessRenderTargetManager,
    HeadlessTextureManager, TargetKind,
};
use strata::resources::{
    BloomSettings, FxaaQuality, LoadedModel, MeshId, MeshManager, RenderTargetId,
    RenderTargetManager, SsaoSettings, TextureManager, ToneMappingMode,
};
use strata::{PostProcessingDescription, StrataError};

const EPSILON: f32 = 1e-5;

// ============================================================================
// Meshes
// ============================================================================

#[test]
fn procedural_meshes_are_cached_by_parameters() {
    let mut meshes = HeadlessMeshManager::default();
    let red = Vec4::new(1.0, 0.0, 0.0, 1.0);

    let a = meshes.cube(red).unwrap();
    let b = meshes.cube(red).unwrap();
    let c = meshes.cube(Vec4::ONE).unwrap();
    let d = meshes.sprite(red).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);

    assert_eq!(meshes.plane(red, 4).unwrap(), meshes.plane(red, 4).unwrap());
    assert_ne!(meshes.plane(red, 4).unwrap(), meshes.plane(red, 8).unwrap());
    assert_eq!(meshes.mesh_count(), 5);
}

#[test]
fn plane_without_divisions_is_rejected() {
    let mut meshes = HeadlessMeshManager::default();
    assert!(matches!(
        meshes.plane(Vec4::ONE, 0),
        Err(StrataError::Precondition { .. })
    ));
}

#[test]
fn heightmap_requires_whole_rows() {
    let mut meshes = HeadlessMeshManager::default();
    assert!(meshes.heightmap(Vec4::ONE, &[0.0; 6], 3).is_ok());
    assert!(meshes.heightmap(Vec4::ONE, &[0.0; 7], 3).is_err());
    assert!(meshes.heightmap(Vec4::ONE, &[0.0; 6], 0).is_err());
}

#[test]
fn loaded_models_are_cached_by_path() {
    let mut meshes = HeadlessMeshManager::default();
    meshes.register_model(
        "robot.glb",
        LoadedModel {
            meshes: vec![MeshId(0), MeshId(0)],
            texture_names: vec!["robot.png".to_string()],
            ..LoadedModel::default()
        },
    );

    let first = meshes.load_mesh("robot.glb").unwrap();
    let second = meshes.load_mesh("robot.glb").unwrap();
    assert_eq!(first.meshes.len(), 2);
    assert_ne!(first.meshes[0], first.meshes[1]);
    assert_eq!(first.meshes, second.meshes);
    assert_eq!(first.texture_names, vec!["robot.png"]);

    assert!(matches!(
        meshes.load_mesh("missing.glb"),
        Err(StrataError::AssetNotFound(path)) if path == "missing.glb"
    ));
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn textures_are_cached_by_path() {
    let mut textures = HeadlessTextureManager::default();
    let a = textures.load("albedo.png").unwrap();
    assert_eq!(textures.load("albedo.png").unwrap(), a);
    assert_ne!(textures.load("normal.png").unwrap(), a);
    assert!(textures.load("").is_err());
}

#[test]
fn cube_maps_are_cached_by_faces() {
    let mut textures = HeadlessTextureManager::default();
    let faces = ["px", "nx", "py", "ny", "pz", "nz"];
    let sky = textures.cube_map(faces).unwrap();
    assert_eq!(textures.cube_map(faces).unwrap(), sky);
    assert!(textures.cube_map(["px", "", "py", "ny", "pz", "nz"]).is_err());
}

// ============================================================================
// Render Targets
// ============================================================================

#[test]
fn window_sized_targets_use_manager_size() {
    let mut targets = HeadlessRenderTargetManager::new(640, 480);
    let screen = targets.create();
    let shadow = targets.create_sized(1024, 1024);
    assert_eq!(targets.size(screen), Some((640, 480)));
    assert_eq!(targets.size(shadow), Some((1024, 1024)));
    assert_eq!(targets.len(), 2);
}

#[test]
fn attachments_do_not_collide_with_loaded_textures() {
    let mut targets = HeadlessRenderTargetManager::new(4, 4);
    let target = targets.create();
    let colour = targets.colour_texture(target).unwrap();
    let depth = targets.depth_texture(target).unwrap();
    assert!(colour.0 >= ATTACHMENT_TEXTURE_BASE);
    assert_ne!(colour, depth);
}

#[test]
fn hybrid_target_mixes_attachments() {
    let mut targets = HeadlessRenderTargetManager::new(4, 4);
    let colour = targets.create();
    let depth = targets.create();
    let hybrid = targets.create_hybrid(colour, depth).unwrap();

    assert_eq!(targets.kind(hybrid), Some(TargetKind::Hybrid { colour, depth }));
    assert_eq!(
        targets.colour_texture(hybrid).unwrap(),
        targets.colour_texture(colour).unwrap()
    );
    assert_eq!(
        targets.depth_texture(hybrid).unwrap(),
        targets.depth_texture(depth).unwrap()
    );
    assert_eq!(targets.size(hybrid), Some((4, 4)));
}

#[test]
fn unknown_target_is_an_error() {
    let mut targets = HeadlessRenderTargetManager::new(4, 4);
    let colour = targets.create();
    let bogus = RenderTargetId(99);
    assert!(matches!(
        targets.colour_texture(bogus),
        Err(StrataError::UnknownRenderTarget(id)) if id == bogus
    ));
    assert!(targets.create_hybrid(colour, bogus).is_err());
}

// ============================================================================
// Post-Processing Settings
// ============================================================================

#[test]
fn empty_description_requests_nothing() {
    let description = PostProcessingDescription::default();
    assert!(description.is_empty());
    assert!(!description.has_post_stages());
}

#[test]
fn occlusion_alone_is_not_a_post_stage() {
    let description = PostProcessingDescription {
        ambient_occlusion: Some(SsaoSettings::default()),
        ..PostProcessingDescription::default()
    };
    assert!(!description.is_empty());
    assert!(!description.has_post_stages());
}

#[test]
fn bloom_without_iterations_is_disabled() {
    let description = PostProcessingDescription {
        bloom: Some(BloomSettings::new().with_iterations(0)),
        ..PostProcessingDescription::default()
    };
    assert!(description.is_empty());
}

#[test]
fn description_loads_from_json_with_defaults() {
    let description = PostProcessingDescription::from_json(
        r#"{
            "bloom": { "threshold": 2.0 },
            "tone_map": { "mode": "Reinhard" },
            "gamma": {}
        }"#,
    )
    .unwrap();

    let bloom = description.bloom.unwrap();
    assert_eq!(bloom.threshold, 2.0);
    assert_eq!(bloom.iterations, BloomSettings::default().iterations);
    assert_eq!(description.tone_map.unwrap().mode, ToneMappingMode::Reinhard);
    assert_eq!(description.gamma.unwrap().gamma, 2.2);
    assert!(description.anti_alias.is_none());
    assert!(description.has_post_stages());
}

#[test]
fn malformed_description_is_rejected() {
    assert!(matches!(
        PostProcessingDescription::from_json(r#"{ "bloom": { "iterations": -1 } }"#),
        Err(StrataError::InvalidSettings(_))
    ));
}

#[test]
fn ssao_sample_count_is_clamped() {
    let mut settings = SsaoSettings::new();
    settings.sample_count = 1;
    assert_eq!(settings.clamped_sample_count(), 4);
    settings.sample_count = 64;
    assert_eq!(settings.clamped_sample_count(), 16);
}

#[test]
fn fxaa_kernels_are_normalised() {
    for quality in [FxaaQuality::Low, FxaaQuality::Medium, FxaaQuality::High] {
        let weights = quality.weights();
        let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < EPSILON, "{}: {total}", quality.name());
    }
}

#[test]
fn gaussian_kernel_is_normalised() {
    let weights = strata::resources::bloom::GAUSSIAN_WEIGHTS;
    let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
    assert!((total - 1.0).abs() < 1e-4);
}
