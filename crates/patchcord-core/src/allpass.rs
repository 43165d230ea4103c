//! Schroeder allpass for diffusion.
//!
//! ```text
//! w[n] = x[n] + g * w[n - d]
//! y[n] = w[n - d] - g * w[n]
//! ```
//!
//! Flat magnitude response, smeared phase. Chained allpasses turn the
//! reverb's discrete echoes into a dense tail.

use crate::delay::DelayLine;
use crate::math::flush_denormal;

/// Allpass filter over a variable-length [`DelayLine`].
///
/// # Example
///
/// ```rust
/// use patchcord_core::Allpass;
///
/// let mut allpass = Allpass::new(64);
/// assert_eq!(allpass.tick(1.0, 8.0, 0.5), -0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Allpass {
    line: DelayLine,
}

impl Allpass {
    /// Creates an allpass holding up to `capacity` samples of delay.
    pub fn new(capacity: usize) -> Self {
        Self {
            line: DelayLine::new(capacity),
        }
    }

    /// Filters one sample. `gain` is clamped to `(-1, 1)`.
    #[inline]
    pub fn tick(&mut self, input: f32, duration: f32, gain: f32) -> f32 {
        let gain = gain.clamp(-0.999, 0.999);
        let delayed = self.line.peek(duration);
        let w = flush_denormal(input + gain * delayed);
        self.line.tick(w, duration);
        delayed - gain * w
    }

    /// Clears the delay.
    pub fn clear(&mut self) {
        self.line.clear();
    }

    /// Maximum delay in samples.
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_energy() {
        let mut allpass = Allpass::new(64);
        let mut energy = 0.0f32;
        for n in 0..20_000 {
            let out = allpass.tick(if n == 0 { 1.0 } else { 0.0 }, 17.0, 0.6);
            energy += out * out;
        }
        assert!((energy - 1.0).abs() < 1e-3, "energy {energy}");
    }

    #[test]
    fn impulse_response_shape() {
        let mut allpass = Allpass::new(16);
        let out: Vec<f32> = (0..5)
            .map(|n| allpass.tick(if n == 0 { 1.0 } else { 0.0 }, 4.0, 0.5))
            .collect();
        assert_eq!(out[0], -0.5);
        assert_eq!(out[1], 0.0);
        assert!((out[4] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn stays_finite_with_extreme_gain() {
        let mut allpass = Allpass::new(8);
        for _ in 0..10_000 {
            assert!(allpass.tick(1.0, 3.0, 10.0).is_finite());
        }
    }
}
