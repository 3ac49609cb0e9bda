use slotmap::{SlotMap, new_key_type};

use super::dirty::{DirtyFlag, DirtyLevel};
use super::entity::RenderEntity;
use super::light::LightingRig;
use crate::graph::GraphId;

new_key_type! {
    /// Handle to a [`Scene`] owned by a pipeline.
    pub struct SceneId;
    pub struct EntityId;
}

/// An entity together with the render graph that shades it.
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub graph: GraphId,
    pub entity: RenderEntity,
}

/// Render entities plus a lighting rig.
///
/// Entities are drawn in list order. Adding or removing entities raises the
/// owning pipeline's dirty flag.
#[derive(Debug)]
pub struct Scene {
    entities: SlotMap<EntityId, SceneEntity>,
    order: Vec<EntityId>,
    lighting: LightingRig,
    dirty: DirtyFlag,
}

impl Scene {
    /// Creates an empty scene reporting changes to `dirty`.
    #[must_use]
    pub fn new(dirty: DirtyFlag) -> Self {
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            lighting: LightingRig::new(dirty.clone()),
            dirty,
        }
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Appends an entity shaded by `graph`.
    pub fn add_entity(&mut self, graph: GraphId, entity: RenderEntity) -> EntityId {
        let id = self.entities.insert(SceneEntity { graph, entity });
        self.order.push(id);
        self.dirty.mark(DirtyLevel::Rebuild);
        id
    }

    /// Inserts an entity so that it is drawn before every other entity.
    pub(crate) fn insert_entity_front(&mut self, graph: GraphId, entity: RenderEntity) -> EntityId {
        let id = self.entities.insert(SceneEntity { graph, entity });
        self.order.insert(0, id);
        self.dirty.mark(DirtyLevel::Rebuild);
        id
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<SceneEntity> {
        let removed = self.entities.remove(id)?;
        self.order.retain(|&e| e != id);
        self.dirty.mark(DirtyLevel::Rebuild);
        Some(removed)
    }

    /// Removes every entity injected as a pass's sky box.
    pub(crate) fn remove_sky_boxes(&mut self) -> usize {
        let sky: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.entities[id].entity.sky_box_of().is_some())
            .collect();
        for &id in &sky {
            self.remove_entity(id);
        }
        sky.len()
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&RenderEntity> {
        self.entities.get(id).map(|e| &e.entity)
    }

    /// Mutable access for positional, skeletal and rasterisation state.
    ///
    /// Nothing reachable through the returned reference changes the command
    /// queue, so the pipeline is not marked dirty. Shadow receiving does and
    /// goes through [`set_receive_shadow`](Self::set_receive_shadow).
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut RenderEntity> {
        self.entities.get_mut(id).map(|e| &mut e.entity)
    }

    /// Sets whether directional draws of `id` sample shadow maps. Returns
    /// `false` for an unknown entity.
    pub fn set_receive_shadow(&mut self, id: EntityId, receive_shadow: bool) -> bool {
        let Some(item) = self.entities.get_mut(id) else {
            return false;
        };
        if item.entity.receive_shadow() != receive_shadow {
            item.entity.set_receive_shadow(receive_shadow);
            self.dirty.mark(DirtyLevel::Rebuild);
        }
        true
    }

    /// Entity together with its render graph handle.
    #[must_use]
    pub fn scene_entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn graph_of(&self, id: EntityId) -> Option<GraphId> {
        self.entities.get(id).map(|e| e.graph)
    }

    /// Entities in draw order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &SceneEntity)> {
        self.order.iter().map(|&id| (id, &self.entities[id]))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // ========================================================================
    // Lighting
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    #[inline]
    pub fn lighting_mut(&mut self) -> &mut LightingRig {
        &mut self.lighting
    }
}
