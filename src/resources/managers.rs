//! Manager Interfaces
//!
//! The pipeline never talks to a graphics API directly. Meshes, textures,
//! render targets and materials are created through these traits, which a
//! concrete backend implements. [`crate::backend::headless`] provides an
//! in-memory implementation of each.

use glam::Vec4;

use crate::animation::Animation;
use crate::errors::Result;
use crate::graph::RenderGraph;
use crate::material::MaterialFlags;
use crate::resources::{MaterialId, MeshId, RenderTargetId, TextureId};
use crate::scene::{LightType, RenderEntity, Skeleton};

/// Everything an asset loader extracts from one model file.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub meshes: Vec<MeshId>,
    pub texture_names: Vec<String>,
    pub skeleton: Option<Skeleton>,
    pub animations: Vec<Animation>,
}

/// Factory for immutable meshes.
///
/// Procedural meshes are cached by their parameter signature; loaded models
/// are cached by path.
pub trait MeshManager {
    fn sprite(&mut self, colour: Vec4) -> Result<MeshId>;
    fn cube(&mut self, colour: Vec4) -> Result<MeshId>;
    /// A subdivided unit plane. `divisions == 0` is a precondition error.
    fn plane(&mut self, colour: Vec4, divisions: u32) -> Result<MeshId>;
    /// A full-screen quad in clip space.
    fn quad(&mut self, colour: Vec4) -> Result<MeshId>;
    /// A grid of `heights.len() / width` rows.
    fn heightmap(&mut self, colour: Vec4, heights: &[f32], width: u32) -> Result<MeshId>;
    fn load_mesh(&mut self, path: &str) -> Result<LoadedModel>;
}

/// Factory for sampled textures.
pub trait TextureManager {
    fn load(&mut self, path: &str) -> Result<TextureId>;
    /// Faces in +X, -X, +Y, -Y, +Z, -Z order.
    fn cube_map(&mut self, faces: [&str; 6]) -> Result<TextureId>;
}

/// Factory for off-screen render targets.
pub trait RenderTargetManager {
    /// A window-sized target with colour and depth attachments.
    fn create(&mut self) -> RenderTargetId;
    fn create_sized(&mut self, width: u32, height: u32) -> RenderTargetId;
    /// A target that writes into `colour`'s colour attachment while
    /// depth-testing against `depth`'s depth attachment.
    fn create_hybrid(&mut self, colour: RenderTargetId, depth: RenderTargetId) -> Result<RenderTargetId>;
    fn colour_texture(&self, target: RenderTargetId) -> Result<TextureId>;
    fn depth_texture(&self, target: RenderTargetId) -> Result<TextureId>;
}

/// Compiles render graphs into backend materials.
///
/// Implementations are expected to deduplicate through
/// [`MaterialCache`](crate::material::MaterialCache) so that structurally
/// identical graphs share one compiled program.
pub trait MaterialManager {
    fn create(
        &mut self,
        graph: &RenderGraph,
        entity: &RenderEntity,
        light: LightType,
        flags: MaterialFlags,
    ) -> Result<MaterialId>;

    /// Drops every compiled material. Previously returned ids become invalid.
    fn clear(&mut self);
}
