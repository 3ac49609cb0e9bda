//! Headless Backend
//!
//! In-memory implementations of every manager trait plus a renderer that
//! records what it is asked to do. Used by tests, benchmarks and tools that
//! inspect a frame without a GPU.

use std::rc::Rc;

use glam::Vec4;
use rustc_hash::FxHashMap;

use crate::errors::{Result, StrataError};
use crate::graph::RenderGraph;
use crate::material::{MaterialCache, MaterialFlags, MaterialKey};
use crate::pipeline::{CommandKind, Managers, RenderCommand};
use crate::renderer::{RenderFrame, Renderer};
use crate::resources::{
    LoadedModel, MaterialId, MaterialManager, MeshId, MeshManager, RenderTargetId,
    RenderTargetManager, TextureId, TextureManager,
};
use crate::scene::{LightType, RenderEntity};

/// Texture ids handed out for render-target attachments start here, so they
/// never collide with textures loaded through [`HeadlessTextureManager`].
pub const ATTACHMENT_TEXTURE_BASE: u32 = 1 << 24;

/// Managers for a pipeline rendering `width` × `height` frames.
#[must_use]
pub fn managers(width: u32, height: u32) -> Managers {
    Managers {
        meshes: Box::new(HeadlessMeshManager::default()),
        textures: Box::new(HeadlessTextureManager::default()),
        render_targets: Box::new(HeadlessRenderTargetManager::new(width, height)),
        materials: Box::new(HeadlessMaterialManager::default()),
    }
}

// ============================================================================
// Meshes
// ============================================================================

/// Parameters a procedural mesh is cached by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MeshSignature {
    Sprite([u32; 4]),
    Cube([u32; 4]),
    Plane([u32; 4], u32),
    Quad([u32; 4]),
    Heightmap([u32; 4], Vec<u32>, u32),
}

fn colour_bits(colour: Vec4) -> [u32; 4] {
    colour.to_array().map(f32::to_bits)
}

#[derive(Debug, Default)]
pub struct HeadlessMeshManager {
    procedural: FxHashMap<MeshSignature, MeshId>,
    models: FxHashMap<String, LoadedModel>,
    /// Loaded models by path; anything else is reported as not found.
    sources: FxHashMap<String, LoadedModel>,
    next: u32,
}

impl HeadlessMeshManager {
    /// Makes `model` loadable from `path`. Mesh ids in `model` are replaced
    /// with freshly allocated ones on first load.
    pub fn register_model(&mut self, path: impl Into<String>, model: LoadedModel) {
        self.sources.insert(path.into(), model);
    }

    /// Number of distinct meshes created so far.
    #[must_use]
    pub fn mesh_count(&self) -> u32 {
        self.next
    }

    fn allocate(&mut self) -> MeshId {
        let id = MeshId(self.next);
        self.next += 1;
        id
    }

    fn procedural(&mut self, signature: MeshSignature) -> MeshId {
        if let Some(&id) = self.procedural.get(&signature) {
            return id;
        }
        let id = self.allocate();
        self.procedural.insert(signature, id);
        id
    }
}

impl MeshManager for HeadlessMeshManager {
    fn sprite(&mut self, colour: Vec4) -> Result<MeshId> {
        Ok(self.procedural(MeshSignature::Sprite(colour_bits(colour))))
    }

    fn cube(&mut self, colour: Vec4) -> Result<MeshId> {
        Ok(self.procedural(MeshSignature::Cube(colour_bits(colour))))
    }

    fn plane(&mut self, colour: Vec4, divisions: u32) -> Result<MeshId> {
        if divisions == 0 {
            return Err(StrataError::precondition("plane divisions must be non-zero"));
        }
        Ok(self.procedural(MeshSignature::Plane(colour_bits(colour), divisions)))
    }

    fn quad(&mut self, colour: Vec4) -> Result<MeshId> {
        Ok(self.procedural(MeshSignature::Quad(colour_bits(colour))))
    }

    fn heightmap(&mut self, colour: Vec4, heights: &[f32], width: u32) -> Result<MeshId> {
        if width == 0 || heights.len() % width as usize != 0 {
            return Err(StrataError::precondition(format!(
                "{} heights do not form rows of width {width}",
                heights.len()
            )));
        }
        let heights = heights.iter().map(|h| h.to_bits()).collect();
        Ok(self.procedural(MeshSignature::Heightmap(colour_bits(colour), heights, width)))
    }

    fn load_mesh(&mut self, path: &str) -> Result<LoadedModel> {
        if let Some(model) = self.models.get(path) {
            return Ok(model.clone());
        }
        let mut model = self
            .sources
            .get(path)
            .cloned()
            .ok_or_else(|| StrataError::AssetNotFound(path.to_string()))?;
        for mesh in &mut model.meshes {
            *mesh = self.allocate();
        }
        log::debug!("Loaded '{path}': {} meshes", model.meshes.len());
        self.models.insert(path.to_string(), model.clone());
        Ok(model)
    }
}

// ============================================================================
// Textures
// ============================================================================

#[derive(Debug, Default)]
pub struct HeadlessTextureManager {
    by_path: FxHashMap<String, TextureId>,
    next: u32,
}

impl HeadlessTextureManager {
    fn cached(&mut self, key: String) -> TextureId {
        if let Some(&id) = self.by_path.get(&key) {
            return id;
        }
        let id = TextureId(self.next);
        self.next += 1;
        self.by_path.insert(key, id);
        id
    }
}

impl TextureManager for HeadlessTextureManager {
    fn load(&mut self, path: &str) -> Result<TextureId> {
        if path.is_empty() {
            return Err(StrataError::AssetNotFound(path.to_string()));
        }
        Ok(self.cached(path.to_string()))
    }

    fn cube_map(&mut self, faces: [&str; 6]) -> Result<TextureId> {
        if faces.iter().any(|face| face.is_empty()) {
            return Err(StrataError::AssetNotFound(faces.join(",")));
        }
        Ok(self.cached(faces.join("|")))
    }
}

// ============================================================================
// Render Targets
// ============================================================================

/// What a headless render target stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Sized { width: u32, height: u32 },
    Hybrid { colour: RenderTargetId, depth: RenderTargetId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TargetRecord {
    kind: TargetKind,
    colour: TextureId,
    depth: TextureId,
}

#[derive(Debug)]
pub struct HeadlessRenderTargetManager {
    width: u32,
    height: u32,
    targets: Vec<TargetRecord>,
    next_texture: u32,
}

impl HeadlessRenderTargetManager {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            targets: Vec::new(),
            next_texture: ATTACHMENT_TEXTURE_BASE,
        }
    }

    #[must_use]
    pub fn kind(&self, target: RenderTargetId) -> Option<TargetKind> {
        self.targets.get(target.0 as usize).map(|t| t.kind)
    }

    /// Pixel size of `target`; hybrids report their colour target's size.
    #[must_use]
    pub fn size(&self, target: RenderTargetId) -> Option<(u32, u32)> {
        match self.kind(target)? {
            TargetKind::Sized { width, height } => Some((width, height)),
            TargetKind::Hybrid { colour, .. } => self.size(colour),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn record(&self, target: RenderTargetId) -> Result<&TargetRecord> {
        self.targets
            .get(target.0 as usize)
            .ok_or(StrataError::UnknownRenderTarget(target))
    }

    fn texture(&mut self) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        id
    }

    fn push(&mut self, record: TargetRecord) -> RenderTargetId {
        let id = RenderTargetId(self.targets.len() as u32);
        self.targets.push(record);
        id
    }
}

impl RenderTargetManager for HeadlessRenderTargetManager {
    fn create(&mut self) -> RenderTargetId {
        self.create_sized(self.width, self.height)
    }

    fn create_sized(&mut self, width: u32, height: u32) -> RenderTargetId {
        let colour = self.texture();
        let depth = self.texture();
        self.push(TargetRecord {
            kind: TargetKind::Sized { width, height },
            colour,
            depth,
        })
    }

    fn create_hybrid(&mut self, colour: RenderTargetId, depth: RenderTargetId) -> Result<RenderTargetId> {
        let colour_texture = self.record(colour)?.colour;
        let depth_texture = self.record(depth)?.depth;
        Ok(self.push(TargetRecord {
            kind: TargetKind::Hybrid { colour, depth },
            colour: colour_texture,
            depth: depth_texture,
        }))
    }

    fn colour_texture(&self, target: RenderTargetId) -> Result<TextureId> {
        Ok(self.record(target)?.colour)
    }

    fn depth_texture(&self, target: RenderTargetId) -> Result<TextureId> {
        Ok(self.record(target)?.depth)
    }
}

// ============================================================================
// Materials
// ============================================================================

/// A "compiled" material: the inputs it was compiled from.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMaterial {
    pub id: MaterialId,
    pub key: MaterialKey,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct HeadlessMaterialManager {
    cache: MaterialCache<HeadlessMaterial>,
    next: u32,
}

impl HeadlessMaterialManager {
    /// Number of materials compiled since the last clear.
    #[must_use]
    pub fn compiled(&self) -> usize {
        self.cache.len()
    }

    pub fn material(&self, key: &MaterialKey) -> Option<Rc<HeadlessMaterial>> {
        self.cache.get(key).cloned()
    }
}

impl MaterialManager for HeadlessMaterialManager {
    fn create(
        &mut self,
        graph: &RenderGraph,
        _entity: &RenderEntity,
        light: LightType,
        flags: MaterialFlags,
    ) -> Result<MaterialId> {
        let key = MaterialKey::new(graph, light, flags);
        let next = &mut self.next;
        let material = self.cache.try_emplace(key, |key| {
            graph.validate()?;
            let id = MaterialId(*next);
            *next += 1;
            Ok(HeadlessMaterial {
                id,
                key: *key,
                description: graph.describe(),
            })
        })?;
        Ok(material.id)
    }

    fn clear(&mut self) {
        self.cache.clear();
    }
}

// ============================================================================
// Recording Renderer
// ============================================================================

/// Records every dispatched command, and the label of each started pass.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<RenderCommand>,
    pub pass_labels: Vec<String>,
    pub frames: usize,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds of the recorded commands, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<CommandKind> {
        self.commands.iter().map(|c| c.kind).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn execute_pass_start(&mut self, frame: &RenderFrame<'_>, command: &RenderCommand) {
        self.commands.push(*command);
        if let Some(pass) = frame.pass(command) {
            self.pass_labels.push(pass.label().to_string());
        }
    }

    fn execute_draw(&mut self, _frame: &RenderFrame<'_>, command: &RenderCommand) {
        self.commands.push(*command);
    }

    fn execute_pass_end(&mut self, _frame: &RenderFrame<'_>, command: &RenderCommand) {
        self.commands.push(*command);
    }

    fn execute_present(&mut self, _frame: &RenderFrame<'_>, command: &RenderCommand) {
        self.commands.push(*command);
        self.frames += 1;
    }
}
