use slotmap::new_key_type;

use crate::resources::{PostProcessingDescription, RenderTargetId, TextureId};
use crate::scene::{Camera, DirectionalLightId, SceneId};

new_key_type! {
    /// Handle to a user-declared [`RenderPass`].
    pub struct PassId;
}

/// Origin of a pass in the expanded pass list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Declared by the application.
    Scene,
    /// Depth from a directional light's point of view.
    Shadow,
    /// Depth, normals and positions feeding ambient occlusion.
    AmbientOcclusionInput,
    /// Full-screen ambient light with occlusion applied.
    AmbientOcclusion,
    /// Full-screen post-processing stage.
    PostProcessing,
}

/// One traversal of a scene from one camera into one target.
///
/// A `None` colour target renders to the default framebuffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub scene: SceneId,
    pub camera: Camera,
    pub colour_target: Option<RenderTargetId>,
    pub normal_target: Option<RenderTargetId>,
    pub position_target: Option<RenderTargetId>,
    pub depth_only: bool,
    pub clear_colour: bool,
    pub clear_depth: bool,
    pub sky_box: Option<TextureId>,
    pub post_processing: PostProcessingDescription,

    pub(crate) kind: PassKind,
    pub(crate) source: Option<PassId>,
    pub(crate) fold_ambient: bool,
    pub(crate) shadow_light: Option<DirectionalLightId>,
    pub(crate) label: String,
}

impl RenderPass {
    /// A colour pass into the default framebuffer that clears colour and depth.
    #[must_use]
    pub fn new(scene: SceneId, camera: Camera) -> Self {
        Self {
            scene,
            camera,
            colour_target: None,
            normal_target: None,
            position_target: None,
            depth_only: false,
            clear_colour: true,
            clear_depth: true,
            sky_box: None,
            post_processing: PostProcessingDescription::default(),
            kind: PassKind::Scene,
            source: None,
            fold_ambient: false,
            shadow_light: None,
            label: "scene".to_string(),
        }
    }

    pub(crate) fn synthesized(kind: PassKind, scene: SceneId, camera: Camera, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            ..Self::new(scene, camera)
        }
    }

    #[must_use]
    pub fn with_colour_target(mut self, target: RenderTargetId) -> Self {
        self.colour_target = Some(target);
        self
    }

    #[must_use]
    pub fn with_sky_box(mut self, texture: TextureId) -> Self {
        self.sky_box = Some(texture);
        self
    }

    #[must_use]
    pub fn with_post_processing(mut self, description: PostProcessingDescription) -> Self {
        self.post_processing = description;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> PassKind {
        self.kind
    }

    /// User pass this pass was declared as or synthesized for.
    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<PassId> {
        self.source
    }

    /// Whether the ambient contribution was already drawn by an ambient
    /// occlusion pass.
    #[inline]
    #[must_use]
    pub fn folds_ambient(&self) -> bool {
        self.fold_ambient
    }

    /// Light whose shadow map this pass renders.
    #[inline]
    #[must_use]
    pub fn shadow_light(&self) -> Option<DirectionalLightId> {
        self.shadow_light
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}
