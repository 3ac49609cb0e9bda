//! Scene Data Model
//!
//! - [`Scene`]: render entities plus a [`LightingRig`]
//! - [`RenderEntity`]: mesh, transform, normal matrix and optional skeleton
//! - [`Camera`]: perspective or orthographic view
//! - Lights: [`AmbientLight`], [`PointLight`], [`DirectionalLight`]
//! - [`Skeleton`] / [`Bone`]: hierarchical bone transforms for skinning
//! - [`DirtyFlag`]: change notification shared with the owning pipeline

pub mod camera;
pub mod dirty;
pub mod entity;
pub mod light;
pub mod scene;
pub mod skeleton;
pub mod transform;

pub use camera::{Camera, ProjectionType};
pub use dirty::{DirtyFlag, DirtyLevel};
pub use entity::{PrimitiveType, RenderEntity};
pub use light::{
    AmbientLight, DirectionalLight, DirectionalLightId, LightRef, LightType, LightingRig,
    PointLight, PointLightId,
};
pub use scene::{EntityId, Scene, SceneEntity, SceneId};
pub use skeleton::{Bone, BoneQuery, Skeleton};
pub use transform::Transform;
