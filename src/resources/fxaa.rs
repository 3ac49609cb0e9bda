//! Anti-Aliasing Configuration
//!
//! The anti-aliasing stage is a luma-contrast edge filter: pixels whose
//! luminance differs from their blurred neighbourhood by more than
//! `edge_threshold` are replaced by the neighbourhood average. It runs last,
//! on gamma-encoded colour.
//!
//! # Quality Presets
//!
//! | Preset   | Taps per axis |
//! |----------|---------------|
//! | `Low`    | 3             |
//! | `Medium` | 5             |
//! | `High`   | 7             |

use serde::{Deserialize, Serialize};

/// Anti-aliasing quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FxaaQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl FxaaQuality {
    /// Returns a human-readable name for the quality preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Normalised box weights from the centre tap outwards.
    #[must_use]
    pub fn weights(self) -> &'static [f32] {
        match self {
            Self::Low => &[1.0 / 3.0, 1.0 / 3.0],
            Self::Medium => &[0.2, 0.2, 0.2],
            Self::High => &[1.0 / 7.0, 1.0 / 7.0, 1.0 / 7.0, 1.0 / 7.0],
        }
    }
}

/// Anti-aliasing configuration (pure data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxaaSettings {
    pub quality: FxaaQuality,
    /// Minimum luminance contrast treated as an edge.
    ///
    /// Default: `0.125`
    pub edge_threshold: f32,
}

impl Default for FxaaSettings {
    fn default() -> Self {
        Self {
            quality: FxaaQuality::default(),
            edge_threshold: 0.125,
        }
    }
}
