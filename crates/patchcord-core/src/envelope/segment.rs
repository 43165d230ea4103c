//! Exponential segment coefficients.
//!
//! A segment moves the output with `out = base + out * multiplier`. Aiming
//! at a target overshot by `ratio` makes the curve reach the real target in
//! the requested number of samples; small ratios give strongly exponential
//! curves, large ones approach linear.
//!
//! Reference: Nigel Redmon, "Envelope generators—ADSR", earlevel.com (2013).

use libm::{expf, logf};

/// Smallest curve ratio accepted; keeps the logarithm finite.
pub const MIN_RATIO: f32 = 1e-6;

/// Largest curve ratio accepted. Beyond it every curve is already linear.
pub const MAX_RATIO: f32 = 1e6;

/// Clamps `ratio` to `[MIN_RATIO, MAX_RATIO]`; NaN becomes [`MIN_RATIO`].
#[inline]
pub fn curve_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        MIN_RATIO
    } else {
        ratio.clamp(MIN_RATIO, MAX_RATIO)
    }
}

/// Coefficients of one exponential segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Segment {
    /// Constant term.
    pub base: f32,
    /// Feedback of the previous output.
    pub multiplier: f32,
}

impl Segment {
    /// Rises from the current level to `1` over `samples`.
    pub fn rise(samples: f32, ratio: f32) -> Self {
        let ratio = curve_ratio(ratio);
        let multiplier = coefficient(samples, ratio);
        Self {
            base: (1.0 + ratio) * (1.0 - multiplier),
            multiplier,
        }
    }

    /// Falls from the current level to `target` over `samples`.
    pub fn fall(target: f32, samples: f32, ratio: f32) -> Self {
        let ratio = curve_ratio(ratio);
        let multiplier = coefficient(samples, ratio);
        Self {
            base: (target - ratio) * (1.0 - multiplier),
            multiplier,
        }
    }

    /// Advances `out` by one sample.
    #[inline]
    pub fn apply(&self, out: f32) -> f32 {
        self.base + out * self.multiplier
    }
}

/// `exp(-ln((1 + ratio) / ratio) / samples)`, or `0` for instant segments.
#[inline]
pub fn coefficient(samples: f32, ratio: f32) -> f32 {
    if samples.is_nan() || samples < 1.0 {
        return 0.0;
    }
    let ratio = curve_ratio(ratio);
    expf(-logf((1.0 + ratio) / ratio) / samples)
}
