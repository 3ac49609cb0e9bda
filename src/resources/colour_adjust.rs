//! Colour Adjustment Configuration
//!
//! Applied after bloom and before tone mapping:
//!
//! ```text
//! grey     = dot(c, LUMINANCE_WEIGHTS)
//! c        = grey + (c - grey) * saturation
//! c        = (c - 0.5) * contrast + 0.5
//! c        = c * brightness
//! ```

use serde::{Deserialize, Serialize};

/// Colour adjustment configuration (pure data). The default is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourAdjustSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for ColourAdjustSettings {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}
