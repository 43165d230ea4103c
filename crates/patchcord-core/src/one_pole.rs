//! One-pole lowpass for damping and smoothing.
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])
//! ```
//!
//! `coeff` is either derived from a cutoff (`exp(-2π * freq / sample_rate)`)
//! or set directly as a damping amount in `[0, 1)`, which is how the reverb
//! darkens its feedback paths.

use core::f32::consts::TAU;

use libm::expf;

use crate::math::flush_denormal;

/// One-pole (6 dB/oct) lowpass filter.
#[derive(Debug, Clone, Default)]
pub struct OnePole {
    state: f32,
    coeff: f32,
}

impl OnePole {
    /// Creates a filter with its cutoff at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self::default();
        filter.set_frequency(sample_rate, freq_hz);
        filter
    }

    /// Creates a filter with a raw damping coefficient.
    pub fn with_coefficient(coeff: f32) -> Self {
        let mut filter = Self::default();
        filter.set_coefficient(coeff);
        filter
    }

    /// Moves the cutoff.
    pub fn set_frequency(&mut self, sample_rate: f32, freq_hz: f32) {
        self.coeff = expf(-TAU * freq_hz / sample_rate);
    }

    /// Sets the coefficient directly. `0` passes the input, values near `1`
    /// filter heavily. Clamped to `[0, 0.999]`.
    #[inline]
    pub fn set_coefficient(&mut self, coeff: f32) {
        self.coeff = coeff.clamp(0.0, 0.999);
    }

    /// Current coefficient.
    pub fn coefficient(&self) -> f32 {
        self.coeff
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Zeroes the state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_dc() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should pass, got {out}");
    }

    #[test]
    fn attenuates_nyquist() {
        let mut lp = OnePole::new(48000.0, 100.0);
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += lp.process(input).abs();
        }
        assert!(sum / 4800.0 < 0.05);
    }

    #[test]
    fn zero_coefficient_is_transparent() {
        let mut lp = OnePole::with_coefficient(0.0);
        assert_eq!(lp.process(0.3), 0.3);
        assert_eq!(lp.process(-0.8), -0.8);
    }

    #[test]
    fn coefficient_is_clamped() {
        let lp = OnePole::with_coefficient(4.0);
        assert!(lp.coefficient() < 1.0);
    }
}
