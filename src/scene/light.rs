use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use super::camera::Camera;
use super::dirty::{DirtyFlag, DirtyLevel};

new_key_type! {
    pub struct PointLightId;
    pub struct DirectionalLightId;
}

/// Light category. Draws are emitted per pass in [`LightType::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LightType {
    Ambient,
    Point,
    Directional,
}

impl LightType {
    /// Fixed sub-pass order within a render pass.
    pub const ORDER: [LightType; 3] = [Self::Ambient, Self::Point, Self::Directional];
}

/// Identifies one light instance within a scene's lighting rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightRef {
    Ambient,
    Point(PointLightId),
    Directional(DirectionalLightId),
}

impl LightRef {
    #[must_use]
    pub fn light_type(self) -> LightType {
        match self {
            Self::Ambient => LightType::Ambient,
            Self::Point(_) => LightType::Point,
            Self::Directional(_) => LightType::Directional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    colour: Vec3,
}

impl AmbientLight {
    #[inline]
    #[must_use]
    pub fn colour(&self) -> Vec3 {
        self.colour
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Distance at which the light's contribution reaches zero.
    pub range: f32,
    colour: Vec3,
}

impl PointLight {
    #[must_use]
    pub fn new(position: Vec3, colour: Vec3, range: f32) -> Self {
        Self {
            position,
            range,
            colour,
        }
    }

    #[inline]
    #[must_use]
    pub fn colour(&self) -> Vec3 {
        self.colour
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    direction: Vec3,
    colour: Vec3,
    casts_shadows: bool,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(direction: Vec3, colour: Vec3) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::NEG_Y),
            colour,
            casts_shadows: false,
        }
    }

    #[must_use]
    pub fn with_shadows(mut self) -> Self {
        self.casts_shadows = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction.normalize_or(Vec3::NEG_Y);
    }

    #[inline]
    #[must_use]
    pub fn colour(&self) -> Vec3 {
        self.colour
    }

    #[inline]
    #[must_use]
    pub fn casts_shadows(&self) -> bool {
        self.casts_shadows
    }

    /// Orthographic camera looking along the light direction, covering a cube
    /// of half extent `distance` around the origin.
    #[must_use]
    pub fn shadow_camera(&self, distance: f32) -> Camera {
        let extent = distance * 2.0;
        Camera::new_orthographic(extent, extent, 0.0, distance * 2.0)
            .looking_at(-self.direction * distance, Vec3::ZERO)
    }
}

/// The lights of one scene: exactly one ambient light plus any number of
/// point and directional lights.
///
/// Colour changes and additions/removals raise the owning pipeline's dirty
/// flag; positional changes through [`point_light_mut`](Self::point_light_mut)
/// do not, because draw commands only reference lights by id.
#[derive(Debug)]
pub struct LightingRig {
    ambient: AmbientLight,
    point: SlotMap<PointLightId, PointLight>,
    directional: SlotMap<DirectionalLightId, DirectionalLight>,
    dirty: DirtyFlag,
}

impl LightingRig {
    pub(crate) fn new(dirty: DirtyFlag) -> Self {
        Self {
            ambient: AmbientLight { colour: Vec3::ONE },
            point: SlotMap::with_key(),
            directional: SlotMap::with_key(),
            dirty,
        }
    }

    // ========================================================================
    // Ambient
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn set_ambient_colour(&mut self, colour: Vec3) {
        self.ambient.colour = colour;
        self.dirty.mark(DirtyLevel::Rebuild);
    }

    // ========================================================================
    // Point lights
    // ========================================================================

    pub fn add_point_light(&mut self, light: PointLight) -> PointLightId {
        self.dirty.mark(DirtyLevel::Rebuild);
        self.point.insert(light)
    }

    pub fn remove_point_light(&mut self, id: PointLightId) -> Option<PointLight> {
        let removed = self.point.remove(id);
        if removed.is_some() {
            self.dirty.mark(DirtyLevel::Rebuild);
        }
        removed
    }

    #[must_use]
    pub fn point_light(&self, id: PointLightId) -> Option<&PointLight> {
        self.point.get(id)
    }

    pub fn point_light_mut(&mut self, id: PointLightId) -> Option<&mut PointLight> {
        self.point.get_mut(id)
    }

    /// Returns `false` if the light does not exist.
    pub fn set_point_light_colour(&mut self, id: PointLightId, colour: Vec3) -> bool {
        let Some(light) = self.point.get_mut(id) else {
            return false;
        };
        light.colour = colour;
        self.dirty.mark(DirtyLevel::Rebuild);
        true
    }

    pub fn point_lights(&self) -> impl Iterator<Item = (PointLightId, &PointLight)> {
        self.point.iter()
    }

    // ========================================================================
    // Directional lights
    // ========================================================================

    /// Adding a directional light may add a shadow pass, so it requests a
    /// full pipeline build.
    pub fn add_directional_light(&mut self, light: DirectionalLight) -> DirectionalLightId {
        self.dirty.mark(DirtyLevel::Build);
        self.directional.insert(light)
    }

    pub fn remove_directional_light(&mut self, id: DirectionalLightId) -> Option<DirectionalLight> {
        let removed = self.directional.remove(id);
        if removed.is_some() {
            self.dirty.mark(DirtyLevel::Build);
        }
        removed
    }

    #[must_use]
    pub fn directional_light(&self, id: DirectionalLightId) -> Option<&DirectionalLight> {
        self.directional.get(id)
    }

    pub fn set_directional_light_colour(&mut self, id: DirectionalLightId, colour: Vec3) -> bool {
        let Some(light) = self.directional.get_mut(id) else {
            return false;
        };
        light.colour = colour;
        self.dirty.mark(DirtyLevel::Rebuild);
        true
    }

    pub fn set_directional_light_direction(&mut self, id: DirectionalLightId, direction: Vec3) -> bool {
        let Some(light) = self.directional.get_mut(id) else {
            return false;
        };
        light.set_direction(direction);
        // Shadow cameras are baked into shadow passes at build time
        if light.casts_shadows {
            self.dirty.mark(DirtyLevel::Build);
        }
        true
    }

    pub fn set_casts_shadows(&mut self, id: DirectionalLightId, casts_shadows: bool) -> bool {
        let Some(light) = self.directional.get_mut(id) else {
            return false;
        };
        if light.casts_shadows != casts_shadows {
            light.casts_shadows = casts_shadows;
            self.dirty.mark(DirtyLevel::Build);
        }
        true
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = (DirectionalLightId, &DirectionalLight)> {
        self.directional.iter()
    }

    /// Every light instance of `light_type`, in storage order.
    #[must_use]
    pub fn instances(&self, light_type: LightType) -> Vec<LightRef> {
        match light_type {
            LightType::Ambient => vec![LightRef::Ambient],
            LightType::Point => self.point.keys().map(LightRef::Point).collect(),
            LightType::Directional => self.directional.keys().map(LightRef::Directional).collect(),
        }
    }
}
