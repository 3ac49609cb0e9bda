//! Material cache tests
//!
//! Tests for:
//! - try_emplace idempotence and key sensitivity
//! - clear()
//! - The headless material manager's deduplication
//! - Material flags cover outputs and transparency only

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec4;
use strata::backend::headless::HeadlessMaterialManager;
use strata::graph::RenderGraph;
use strata::material::{MaterialCache, MaterialFlags, MaterialKey};
use strata::resources::{MaterialManager, MeshId, TextureId};
use strata::scene::{LightType, RenderEntity};
use strata::StrataError;

fn textured(texture: u32) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let colour = graph.texture(TextureId(texture));
    let tint = graph.value(Vec4::ONE);
    let colour = graph.multiply(colour, tint);
    graph.render(colour);
    graph
}

fn key(graph: &RenderGraph, light: LightType) -> MaterialKey {
    MaterialKey::new(graph, light, MaterialFlags::RENDER_TO_COLOUR)
}

// ============================================================================
// MaterialCache
// ============================================================================

#[test]
fn try_emplace_returns_same_material_for_equal_keys() {
    let mut cache = MaterialCache::new();
    let builds = Cell::new(0);
    let build = |_: &MaterialKey| {
        builds.set(builds.get() + 1);
        Ok(builds.get())
    };

    let a = cache.try_emplace(key(&textured(1), LightType::Ambient), build).unwrap();
    // An independently built, structurally equal graph
    let b = cache.try_emplace(key(&textured(1), LightType::Ambient), build).unwrap();

    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(builds.get(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn different_light_type_gives_distinct_material() {
    let mut cache = MaterialCache::new();
    let graph = textured(1);
    let a = cache.try_emplace(key(&graph, LightType::Ambient), |_| Ok("ambient")).unwrap();
    let b = cache.try_emplace(key(&graph, LightType::Directional), |_| Ok("directional")).unwrap();
    assert!(!Rc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 2);
}

#[test]
fn different_flags_give_distinct_material() {
    let mut cache = MaterialCache::new();
    let graph = textured(1);
    let colour = MaterialKey::new(&graph, LightType::Point, MaterialFlags::RENDER_TO_COLOUR);
    let gbuffer = MaterialKey::new(
        &graph,
        LightType::Point,
        MaterialFlags::RENDER_TO_NORMAL | MaterialFlags::RENDER_TO_POSITION,
    );
    let a = cache.try_emplace(colour, |_| Ok(1)).unwrap();
    let b = cache.try_emplace(gbuffer, |_| Ok(2)).unwrap();
    assert!(!Rc::ptr_eq(&a, &b));
}

#[test]
fn failed_construction_is_not_cached() {
    let mut cache: MaterialCache<u32> = MaterialCache::new();
    let k = key(&textured(1), LightType::Ambient);
    assert!(cache
        .try_emplace(k, |_| Err(StrataError::precondition("compile failed")))
        .is_err());
    assert!(cache.is_empty());
    assert_eq!(*cache.try_emplace(k, |_| Ok(7)).unwrap(), 7);
}

#[test]
fn clear_forgets_entries() {
    let mut cache = MaterialCache::new();
    let k = key(&textured(1), LightType::Ambient);
    let a = cache.try_emplace(k, |_| Ok(1)).unwrap();
    cache.clear();
    assert!(cache.get(&k).is_none());
    let b = cache.try_emplace(k, |_| Ok(1)).unwrap();
    assert!(!Rc::ptr_eq(&a, &b));
}

// ============================================================================
// HeadlessMaterialManager
// ============================================================================

#[test]
fn headless_manager_shares_materials_between_equal_graphs() {
    let mut manager = HeadlessMaterialManager::default();
    let entity = RenderEntity::new(MeshId(0));
    let flags = MaterialFlags::RENDER_TO_COLOUR;

    let a = manager.create(&textured(2), &entity, LightType::Ambient, flags).unwrap();
    let b = manager.create(&textured(2), &entity, LightType::Ambient, flags).unwrap();
    let c = manager.create(&textured(3), &entity, LightType::Ambient, flags).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(manager.compiled(), 2);

    manager.clear();
    assert_eq!(manager.compiled(), 0);
}

#[test]
fn entity_render_state_does_not_split_materials() {
    assert_eq!(
        MaterialFlags::all(),
        MaterialFlags::for_outputs(true, true, true) | MaterialFlags::HAS_TRANSPARENCY
    );

    let mut manager = HeadlessMaterialManager::default();
    let plain = RenderEntity::new(MeshId(0));
    let mut wireframe = RenderEntity::new(MeshId(0));
    wireframe.set_wireframe(true);
    let flags = MaterialFlags::RENDER_TO_COLOUR;

    let a = manager.create(&textured(4), &plain, LightType::Point, flags).unwrap();
    let b = manager.create(&textured(4), &wireframe, LightType::Point, flags).unwrap();
    assert_eq!(a, b);
    assert_eq!(manager.compiled(), 1);
}

#[test]
fn headless_manager_rejects_ill_typed_graphs() {
    let mut manager = HeadlessMaterialManager::default();
    let mut graph = RenderGraph::new();
    let a = graph.value(glam::Vec2::ONE);
    let b = graph.value(glam::Vec3::ONE);
    let sum = graph.add(a, b);
    graph.render(sum);

    let result = manager.create(
        &graph,
        &RenderEntity::new(MeshId(0)),
        LightType::Ambient,
        MaterialFlags::RENDER_TO_COLOUR,
    );
    assert!(matches!(result, Err(StrataError::TypeMismatch(_))));
}
