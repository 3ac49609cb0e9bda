//! Post-Processing Description
//!
//! Per-pass post-processing intent. Every stage is optional; an empty
//! description leaves the pass untouched.

use serde::{Deserialize, Serialize};

use super::{
    BloomSettings, ColourAdjustSettings, FxaaSettings, GammaSettings, SsaoSettings,
    ToneMappingSettings,
};

/// Post-processing stages requested for one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessingDescription {
    pub ambient_occlusion: Option<SsaoSettings>,
    pub bloom: Option<BloomSettings>,
    pub colour_adjust: Option<ColourAdjustSettings>,
    pub tone_map: Option<ToneMappingSettings>,
    pub gamma: Option<GammaSettings>,
    pub anti_alias: Option<FxaaSettings>,
}

impl PostProcessingDescription {
    /// Parses a description from JSON.
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether any stage after the pass itself is requested.
    ///
    /// Bloom with zero iterations does not count.
    #[must_use]
    pub fn has_post_stages(&self) -> bool {
        self.bloom.is_some_and(|b| b.is_enabled())
            || self.colour_adjust.is_some()
            || self.tone_map.is_some()
            || self.gamma.is_some()
            || self.anti_alias.is_some()
    }

    /// Whether the description requests nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ambient_occlusion.is_none() && !self.has_post_stages()
    }
}
