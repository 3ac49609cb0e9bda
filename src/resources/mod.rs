//! Resource Layer
//!
//! Backend-independent resource identities and the manager interfaces the
//! pipeline consumes:
//! - Typed handles: [`MeshId`], [`TextureId`], [`RenderTargetId`], [`MaterialId`]
//! - Manager traits: [`MeshManager`], [`TextureManager`], [`RenderTargetManager`],
//!   [`MaterialManager`]
//! - Post-processing settings as pure data, grouped by
//!   [`PostProcessingDescription`]

pub mod bloom;
pub mod colour_adjust;
pub mod fxaa;
pub mod managers;
pub mod post_processing;
pub mod ssao;
pub mod tone_mapping;

use serde::{Deserialize, Serialize};

pub use bloom::BloomSettings;
pub use colour_adjust::ColourAdjustSettings;
pub use fxaa::{FxaaQuality, FxaaSettings};
pub use managers::{LoadedModel, MaterialManager, MeshManager, RenderTargetManager, TextureManager};
pub use post_processing::PostProcessingDescription;
pub use ssao::SsaoSettings;
pub use tone_mapping::{GammaSettings, ToneMappingMode, ToneMappingSettings};

macro_rules! define_resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw index assigned by the owning manager.
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_resource_id!(
    /// Handle to an immutable mesh owned by a [`MeshManager`].
    MeshId
);
define_resource_id!(
    /// Handle to a texture. Render graphs reference textures by this identity,
    /// so it participates in structural hashing.
    TextureId
);
define_resource_id!(
    /// Handle to an off-screen render target owned by a [`RenderTargetManager`].
    RenderTargetId
);
define_resource_id!(
    /// Handle to a compiled material owned by a [`MaterialManager`].
    MaterialId
);
