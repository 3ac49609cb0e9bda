use glam::{Mat4, Vec3};

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    /// Vertical field of view in radians and width / height ratio.
    Perspective { fov: f32, aspect: f32 },
    /// Full width and height of the view volume.
    Orthographic { width: f32, height: f32 },
}

/// A view into a scene.
///
/// Cameras are plain values: render passes own their camera by value, and the
/// pipeline copies cameras freely when synthesising passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub projection_type: ProjectionType,
    pub near: f32,
    pub far: f32,

    position: Vec3,
    target: Vec3,
    up: Vec3,

    // Cached matrices, refreshed on every mutation
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::with_projection(ProjectionType::Perspective { fov, aspect }, near, far)
    }

    #[must_use]
    pub fn new_orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self::with_projection(ProjectionType::Orthographic { width, height }, near, far)
    }

    /// Orthographic camera covering clip space exactly, used by full-screen passes.
    #[must_use]
    pub fn full_screen() -> Self {
        Self::new_orthographic(2.0, 2.0, -1.0, 1.0)
    }

    fn with_projection(projection_type: ProjectionType, near: f32, far: f32) -> Self {
        let mut camera = Self {
            projection_type,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrices();
    }

    /// Points the camera at `target`, picking an up vector that is not
    /// parallel to the view direction.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        let forward = (target - self.position).normalize_or_zero();
        self.up = if forward.cross(Vec3::Y).length_squared() < 1e-4 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.update_matrices();
    }

    /// Builder form of [`set_position`](Self::set_position) followed by
    /// [`look_at`](Self::look_at).
    #[must_use]
    pub fn looking_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.position = position;
        self.look_at(target);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection_type, ProjectionType::Orthographic { .. })
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    fn update_matrices(&mut self) {
        self.view_matrix = if self.position == self.target {
            Mat4::IDENTITY
        } else {
            Mat4::look_at_rh(self.position, self.target, self.up)
        };
        self.projection_matrix = match self.projection_type {
            // glam's perspective_rh maps depth to 0..1
            ProjectionType::Perspective { fov, aspect } => {
                Mat4::perspective_rh(fov, aspect, self.near, self.far)
            }
            ProjectionType::Orthographic { width, height } => {
                let (w, h) = (width * 0.5, height * 0.5);
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };
    }
}
