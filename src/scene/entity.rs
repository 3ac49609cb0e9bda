use glam::{Mat3, Mat4, Quat, Vec3};

use super::skeleton::Skeleton;
use super::transform::Transform;
use crate::pipeline::PassId;
use crate::resources::MeshId;

/// Primitive topology used to draw a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    #[default]
    Triangles,
    Lines,
}

/// A drawable instance of a mesh.
///
/// The model matrix and the normal matrix are recomputed together on every
/// positional mutation, so [`normal_transform`](Self::normal_transform) is
/// always the inverse-transpose of [`transform`](Self::transform) with the
/// translation row and column cleared.
#[derive(Debug, Clone)]
pub struct RenderEntity {
    mesh: MeshId,
    pose: Transform,
    model_matrix: Mat4,
    normal_matrix: Mat4,
    primitive_type: PrimitiveType,
    skeleton: Option<Skeleton>,
    wireframe: bool,
    receive_shadow: bool,
    name: Option<String>,
    sky_box_of: Option<PassId>,
}

impl RenderEntity {
    #[must_use]
    pub fn new(mesh: MeshId) -> Self {
        Self::with_transform(mesh, Transform::IDENTITY)
    }

    #[must_use]
    pub fn with_transform(mesh: MeshId, pose: Transform) -> Self {
        let mut entity = Self {
            mesh,
            pose,
            model_matrix: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
            primitive_type: PrimitiveType::Triangles,
            skeleton: None,
            wireframe: false,
            receive_shadow: true,
            name: None,
            sky_box_of: None,
        };
        entity.update_matrices();
        entity
    }

    /// Builder-style name setter.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder-style shadow receiving setter. Once the entity is in a scene,
    /// use [`Scene::set_receive_shadow`](super::Scene::set_receive_shadow).
    #[must_use]
    pub fn with_receive_shadow(mut self, receive_shadow: bool) -> Self {
        self.receive_shadow = receive_shadow;
        self
    }

    /// Builder-style skeleton setter.
    #[must_use]
    pub fn with_skeleton(mut self, skeleton: Skeleton) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    // ========================================================================
    // Positional state
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.pose.translation
    }

    #[inline]
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.pose.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.pose.scale
    }

    #[inline]
    #[must_use]
    pub fn pose(&self) -> &Transform {
        &self.pose
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.pose.translation = position;
        self.update_matrices();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.pose.rotation = orientation;
        self.update_matrices();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.pose.scale = scale;
        self.update_matrices();
    }

    pub fn set_pose(&mut self, pose: Transform) {
        self.pose = pose;
        self.update_matrices();
    }

    /// Model matrix.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.model_matrix
    }

    /// Matrix for transforming normals.
    #[inline]
    #[must_use]
    pub fn normal_transform(&self) -> Mat4 {
        self.normal_matrix
    }

    fn update_matrices(&mut self) {
        self.model_matrix = self.pose.matrix();
        // Upper 3x3 of an affine inverse equals the inverse of its upper 3x3
        let linear = Mat3::from_mat4(self.model_matrix);
        self.normal_matrix = Mat4::from_mat3(linear.inverse().transpose());
    }

    // ========================================================================
    // Render state
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    #[inline]
    #[must_use]
    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    pub fn set_primitive_type(&mut self, primitive_type: PrimitiveType) {
        self.primitive_type = primitive_type;
    }

    #[inline]
    #[must_use]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    /// Whether directional draws of this entity sample shadow maps.
    #[inline]
    #[must_use]
    pub fn receive_shadow(&self) -> bool {
        self.receive_shadow
    }

    pub(crate) fn set_receive_shadow(&mut self, receive_shadow: bool) {
        self.receive_shadow = receive_shadow;
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[must_use]
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.skeleton.as_mut()
    }

    pub fn set_skeleton(&mut self, skeleton: Option<Skeleton>) {
        self.skeleton = skeleton;
    }

    /// The pass whose sky box this entity renders, if any.
    #[inline]
    #[must_use]
    pub fn sky_box_of(&self) -> Option<PassId> {
        self.sky_box_of
    }

    pub(crate) fn mark_sky_box(&mut self, pass: PassId) {
        self.sky_box_of = Some(pass);
    }
}
