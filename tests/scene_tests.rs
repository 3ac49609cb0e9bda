//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: entity insertion order, removal, lookup
//! - LightingRig: ambient, point and directional lights, instance order
//! - Dirty flag levels raised by each kind of mutation, including shadow
//!   receiving

use glam::Vec3;
use slotmap::SlotMap;

use strata::graph::GraphId;
use strata::resources::MeshId;
use strata::scene::{
    DirectionalLight, DirectionalLightId, DirtyFlag, DirtyLevel, LightRef, LightType, PointLight,
    PointLightId,
};
use strata::{RenderEntity, Scene};

fn new_scene() -> (Scene, DirtyFlag, GraphId) {
    let dirty = DirtyFlag::new();
    let mut graphs: SlotMap<GraphId, ()> = SlotMap::with_key();
    let graph = graphs.insert(());
    (Scene::new(dirty.clone()), dirty, graph)
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn entities_keep_insertion_order() {
    let (mut scene, _, graph) = new_scene();
    let a = scene.add_entity(graph, RenderEntity::new(MeshId(0)).named("a"));
    let b = scene.add_entity(graph, RenderEntity::new(MeshId(1)).named("b"));
    let c = scene.add_entity(graph, RenderEntity::new(MeshId(2)).named("c"));

    let order: Vec<_> = scene.entities().map(|(id, _)| id).collect();
    assert_eq!(order, vec![a, b, c]);
    assert_eq!(scene.len(), 3);
    assert_eq!(scene.graph_of(b), Some(graph));
    assert_eq!(scene.entity(c).unwrap().name(), Some("c"));
}

#[test]
fn removing_entity_preserves_remaining_order() {
    let (mut scene, _, graph) = new_scene();
    let a = scene.add_entity(graph, RenderEntity::new(MeshId(0)));
    let b = scene.add_entity(graph, RenderEntity::new(MeshId(1)));
    let c = scene.add_entity(graph, RenderEntity::new(MeshId(2)));

    let removed = scene.remove_entity(b).unwrap();
    assert_eq!(removed.entity.mesh(), MeshId(1));
    assert!(scene.entity(b).is_none());
    assert!(scene.remove_entity(b).is_none());

    let order: Vec<_> = scene.entities().map(|(id, _)| id).collect();
    assert_eq!(order, vec![a, c]);
}

#[test]
fn entity_defaults() {
    let entity = RenderEntity::new(MeshId(4));
    assert!(entity.receive_shadow());
    assert!(!entity.wireframe());
    assert!(entity.skeleton().is_none());
    assert!(entity.sky_box_of().is_none());
    assert_eq!(entity.position(), Vec3::ZERO);
}

// ============================================================================
// Lighting
// ============================================================================

#[test]
fn ambient_light_defaults_to_white() {
    let (scene, _, _) = new_scene();
    assert_eq!(scene.lighting().ambient().colour(), Vec3::ONE);
    assert_eq!(scene.lighting().instances(LightType::Ambient), vec![LightRef::Ambient]);
}

#[test]
fn instances_follow_insertion_order() {
    let (mut scene, _, _) = new_scene();
    let lighting = scene.lighting_mut();
    let p1 = lighting.add_point_light(PointLight::new(Vec3::X, Vec3::ONE, 1.0));
    let p2 = lighting.add_point_light(PointLight::new(Vec3::Y, Vec3::ONE, 1.0));
    let d = lighting.add_directional_light(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE));

    assert_eq!(
        lighting.instances(LightType::Point),
        vec![LightRef::Point(p1), LightRef::Point(p2)]
    );
    assert_eq!(lighting.instances(LightType::Directional), vec![LightRef::Directional(d)]);
    assert_eq!(LightRef::Point(p1).light_type(), LightType::Point);
}

#[test]
fn light_order_is_ambient_point_directional() {
    assert_eq!(
        LightType::ORDER,
        [LightType::Ambient, LightType::Point, LightType::Directional]
    );
}

#[test]
fn setters_on_unknown_lights_report_failure() {
    let (mut scene, dirty, _) = new_scene();
    let lighting = scene.lighting_mut();
    assert!(!lighting.set_point_light_colour(PointLightId::default(), Vec3::ONE));
    assert!(!lighting.set_directional_light_colour(DirectionalLightId::default(), Vec3::ONE));
    assert!(!lighting.set_casts_shadows(DirectionalLightId::default(), true));
    assert!(lighting.remove_point_light(PointLightId::default()).is_none());
    assert_eq!(dirty.level(), DirtyLevel::Clean);
}

// ============================================================================
// Dirty Levels
// ============================================================================

#[test]
fn entity_changes_request_rebuild() {
    let (mut scene, dirty, graph) = new_scene();
    let id = scene.add_entity(graph, RenderEntity::new(MeshId(0)));
    assert_eq!(dirty.level(), DirtyLevel::Rebuild);

    dirty.clear();
    scene.entity_mut(id).unwrap().set_position(Vec3::ONE);
    scene.entity_mut(id).unwrap().set_wireframe(true);
    assert_eq!(dirty.level(), DirtyLevel::Clean);

    scene.remove_entity(id);
    assert_eq!(dirty.level(), DirtyLevel::Rebuild);
}

#[test]
fn shadow_receiving_changes_request_rebuild() {
    let (mut scene, dirty, graph) = new_scene();
    let id = scene.add_entity(graph, RenderEntity::new(MeshId(0)).with_receive_shadow(false));
    assert!(!scene.entity(id).unwrap().receive_shadow());
    dirty.clear();

    assert!(scene.set_receive_shadow(id, false));
    assert_eq!(dirty.level(), DirtyLevel::Clean);

    assert!(scene.set_receive_shadow(id, true));
    assert!(scene.entity(id).unwrap().receive_shadow());
    assert_eq!(dirty.level(), DirtyLevel::Rebuild);

    scene.remove_entity(id);
    dirty.clear();
    assert!(!scene.set_receive_shadow(id, false));
    assert_eq!(dirty.level(), DirtyLevel::Clean);
}

#[test]
fn light_colour_changes_request_rebuild() {
    let (mut scene, dirty, _) = new_scene();
    let lighting = scene.lighting_mut();
    let point = lighting.add_point_light(PointLight::new(Vec3::ZERO, Vec3::ONE, 2.0));
    dirty.clear();

    lighting.point_light_mut(point).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(dirty.level(), DirtyLevel::Clean);

    assert!(lighting.set_point_light_colour(point, Vec3::X));
    assert_eq!(lighting.point_light(point).unwrap().colour(), Vec3::X);
    assert_eq!(dirty.level(), DirtyLevel::Rebuild);

    dirty.clear();
    lighting.set_ambient_colour(Vec3::splat(0.1));
    assert_eq!(dirty.level(), DirtyLevel::Rebuild);
}

#[test]
fn shadow_topology_changes_request_build() {
    let (mut scene, dirty, _) = new_scene();
    let lighting = scene.lighting_mut();
    let light = lighting.add_directional_light(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE));
    assert_eq!(dirty.level(), DirtyLevel::Build);

    dirty.clear();
    // Not a caster: direction is only read at draw time
    lighting.set_directional_light_direction(light, Vec3::NEG_X);
    assert_eq!(dirty.level(), DirtyLevel::Clean);

    assert!(lighting.set_casts_shadows(light, true));
    assert_eq!(dirty.level(), DirtyLevel::Build);

    dirty.clear();
    lighting.set_casts_shadows(light, true);
    assert_eq!(dirty.level(), DirtyLevel::Clean);

    lighting.set_directional_light_direction(light, Vec3::NEG_Z);
    assert_eq!(dirty.level(), DirtyLevel::Build);
    assert_eq!(lighting.directional_light(light).unwrap().direction(), Vec3::NEG_Z);

    dirty.clear();
    lighting.remove_directional_light(light);
    assert_eq!(dirty.level(), DirtyLevel::Build);
}

#[test]
fn dirty_level_never_drops_without_clear() {
    let (mut scene, dirty, graph) = new_scene();
    scene
        .lighting_mut()
        .add_directional_light(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE));
    scene.add_entity(graph, RenderEntity::new(MeshId(0)));
    assert_eq!(dirty.level(), DirtyLevel::Build);
    assert!(dirty.is_dirty());
}
