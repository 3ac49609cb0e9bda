//! Pipeline Settings
//!
//! Global configuration consumed by [`RenderPipeline`](crate::pipeline::RenderPipeline)
//! and the animation controller.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use strata::settings::PipelineSettings;
//!
//! // Defaults: 1280x720, 2048² shadow maps
//! let settings = PipelineSettings::default();
//!
//! // Load from a JSON document (missing fields fall back to defaults)
//! let settings = PipelineSettings::from_json(r#"{ "width": 1920, "height": 1080 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StrataError};

/// Default duration of the ease-out blend after a single-shot animation ends.
pub const DEFAULT_EASE_OUT_SECONDS: f32 = 0.25;

/// Configuration for pass expansion and animation blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Width of window-sized render targets, in pixels.
    pub width: u32,
    /// Height of window-sized render targets, in pixels.
    pub height: u32,
    /// Edge length of each directional shadow map, in pixels.
    ///
    /// Default: `2048`
    pub shadow_map_size: u32,
    /// Half extent of the orthographic volume covered by a directional
    /// light's shadow camera, in world units.
    ///
    /// Default: `20.0`
    pub shadow_distance: f32,
    /// Length of the blend window used when a single-shot animation layer
    /// finishes and hands its bones back to the base layer.
    pub ease_out_seconds: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            shadow_map_size: 2048,
            shadow_distance: 20.0,
            ease_out_seconds: DEFAULT_EASE_OUT_SECONDS,
        }
    }
}

impl PipelineSettings {
    /// Parses settings from JSON, validating the result.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects zero-sized targets and non-positive blend windows.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StrataError::precondition(format!(
                "render target size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.shadow_map_size == 0 {
            return Err(StrataError::precondition("shadow_map_size must be non-zero"));
        }
        if self.shadow_distance <= 0.0 {
            return Err(StrataError::precondition("shadow_distance must be positive"));
        }
        if self.ease_out_seconds <= 0.0 {
            return Err(StrataError::precondition("ease_out_seconds must be positive"));
        }
        Ok(())
    }

    /// Width over height.
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
