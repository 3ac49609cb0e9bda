//! SSAO (Screen Space Ambient Occlusion) Configuration
//!
//! Requesting ambient occlusion on a pass adds two passes in front of it:
//!
//! 1. An input pass drawing the scene under its ambient light, writing that
//!    colour along with view-space normals and positions.
//! 2. A full-screen pass that estimates occlusion from those buffers and
//!    writes the darkened ambient colour directly, so the lit pass skips its
//!    own ambient draw.

use serde::{Deserialize, Serialize};

/// SSAO configuration (pure data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    /// Sampling radius, in view-space units.
    pub radius: f32,
    /// Depth bias that suppresses self-occlusion acne.
    pub bias: f32,
    /// Linear scale on the averaged occlusion, applied before clamping to
    /// `0..=1`.
    pub intensity: f32,
    /// Number of neighbourhood taps. Clamped to `4..=16`.
    pub sample_count: u32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            radius: 0.5,
            bias: 0.025,
            intensity: 1.0,
            sample_count: 8,
        }
    }
}

impl SsaoSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample count after clamping to the supported range.
    #[inline]
    #[must_use]
    pub fn clamped_sample_count(&self) -> u32 {
        self.sample_count.clamp(4, 16)
    }
}
