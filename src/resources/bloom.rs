//! Bloom Post-Processing Configuration
//!
//! Bloom is expanded into a chain of full-screen passes:
//!
//! 1. **Reference copy**: the incoming colour is copied unchanged.
//! 2. **Bright pass**: pixels whose luminance exceeds `threshold` keep their
//!    colour, everything else becomes black.
//! 3. **Blur**: `iterations` separable Gaussian blurs (a horizontal and a
//!    vertical pass each).
//! 4. **Composite**: the blurred bright pass is added onto the reference copy,
//!    scaled by `strength`.
//!
//! An infinite threshold makes the bright pass black, so the composite
//! reduces to the reference copy. Zero iterations skips bloom entirely.

use serde::{Deserialize, Serialize};

/// Perceptual luminance weights (Rec. 709).
pub const LUMINANCE_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Normalised 9-tap Gaussian kernel, centre tap first.
pub const GAUSSIAN_WEIGHTS: [f32; 5] = [0.227_027, 0.194_594_6, 0.121_621_6, 0.054_054, 0.016_216];

/// Bloom configuration (pure data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Luminance above which a pixel contributes to bloom.
    ///
    /// Default: `1.0`
    pub threshold: f32,
    /// Number of separable blur iterations.
    ///
    /// Default: `4`
    pub iterations: u32,
    /// Scale applied to the blurred result before compositing.
    ///
    /// Default: `1.0`
    pub strength: f32,
    /// Distance between blur taps, in texels.
    ///
    /// Default: `1.0`
    pub radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            iterations: 4,
            strength: 1.0,
            radius: 1.0,
        }
    }
}

impl BloomSettings {
    /// Creates new bloom settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style threshold setter.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder-style iteration count setter.
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Whether any bloom passes are generated for these settings.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.iterations > 0
    }
}
