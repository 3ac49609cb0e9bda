//! Tone Mapping & Gamma Configuration
//!
//! Tone mapping compresses HDR colour into displayable range; gamma
//! correction then encodes linear colour for the display.

use serde::{Deserialize, Serialize};

/// Tone mapping operator.
///
/// - [`Linear`](ToneMappingMode::Linear): `c * exposure`
/// - [`Reinhard`](ToneMappingMode::Reinhard): `c / (1 + c)` after exposure
/// - [`Exposure`](ToneMappingMode::Exposure): `1 - exp(-c * exposure)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToneMappingMode {
    Linear,
    Reinhard,
    #[default]
    Exposure,
}

impl ToneMappingMode {
    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Reinhard => "Reinhard",
            Self::Exposure => "Exposure",
        }
    }
}

/// Tone mapping configuration (pure data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMappingSettings {
    pub mode: ToneMappingMode,
    /// Default: `1.0`
    pub exposure: f32,
}

impl Default for ToneMappingSettings {
    fn default() -> Self {
        Self {
            mode: ToneMappingMode::default(),
            exposure: 1.0,
        }
    }
}

/// Gamma correction configuration (pure data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaSettings {
    /// Display gamma. Output is `c ^ (1 / gamma)`.
    ///
    /// Default: `2.2`
    pub gamma: f32,
}

impl Default for GammaSettings {
    fn default() -> Self {
        Self { gamma: 2.2 }
    }
}
