//! Cascadable state-variable filter.
//!
//! Topology-preserving transform SVF after Zavalishin, "The Art of VA Filter
//! Design", chapter 3. Cutoff is normalized (cycles per sample), which is
//! what a patched `Hz` source delivers, so the filter never needs the sample
//! rate.
//!
//! Each stage has two integrator accumulators. Stages cascade for steeper
//! slopes: stage `n + 1` filters the output of stage `n` in the same mode.
//! Every mode keeps its own accumulators, so [`Svf::tick_all`] yields a
//! consistent low/band/high snapshot from one call.
//!
//! The tangent coefficient is only recomputed when the cutoff changes.

use core::f32::consts::PI;

use libm::tanf;

use crate::math::flush_denormal;

/// Maximum number of cascaded stages.
pub const MAX_STAGES: usize = 4;

/// Highest normalized cutoff; just below Nyquist keeps `tan` finite.
pub const MAX_CUTOFF: f32 = 0.49;

/// Highest resonance; a cascade of undamped stages would grow without bound.
pub const MAX_RESONANCE: f32 = 100.0;

/// Filter response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfMode {
    /// Passes below the cutoff.
    #[default]
    Lowpass,
    /// Passes around the cutoff.
    Bandpass,
    /// Passes above the cutoff.
    Highpass,
}

impl SvfMode {
    const ALL: [SvfMode; 3] = [SvfMode::Lowpass, SvfMode::Bandpass, SvfMode::Highpass];

    fn index(self) -> usize {
        match self {
            SvfMode::Lowpass => 0,
            SvfMode::Bandpass => 1,
            SvfMode::Highpass => 2,
        }
    }
}

/// All three responses of one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SvfTaps {
    /// Lowpass output.
    pub low: f32,
    /// Bandpass output.
    pub band: f32,
    /// Highpass output.
    pub high: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct Stage {
    ic1: f32,
    ic2: f32,
}

impl Stage {
    #[inline]
    fn tick(&mut self, input: f32, g: f32, k: f32) -> SvfTaps {
        let v3 = input - self.ic2;
        let v1 = (g * v3 + self.ic1) / (1.0 + g * (g + k));
        let v2 = self.ic2 + g * v1;
        self.ic1 = flush_denormal(2.0 * v1 - self.ic1);
        self.ic2 = flush_denormal(2.0 * v2 - self.ic2);
        SvfTaps {
            low: v2,
            band: v1,
            high: input - k * v1 - v2,
        }
    }
}

/// State-variable filter with 1 to [`MAX_STAGES`] cascaded stages.
///
/// # Example
///
/// ```rust
/// use patchcord_core::{Svf, SvfMode};
///
/// let mut svf = Svf::new(2, SvfMode::Lowpass);
/// let out = svf.tick(1.0, 0.01, 1.0);
/// assert!(out > 0.0 && out < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Svf {
    stages: [[Stage; MAX_STAGES]; 3],
    count: usize,
    mode: SvfMode,
    cutoff: f32,
    g: f32,
}

impl Svf {
    /// Creates a filter of `stages` stages (clamped to `1..=MAX_STAGES`).
    pub fn new(stages: usize, mode: SvfMode) -> Self {
        let mut svf = Self {
            stages: [[Stage::default(); MAX_STAGES]; 3],
            count: stages.clamp(1, MAX_STAGES),
            mode,
            cutoff: 0.0,
            g: 0.0,
        };
        svf.set_cutoff(0.01);
        svf
    }

    /// Number of cascaded stages.
    pub fn stages(&self) -> usize {
        self.count
    }

    /// Response used by [`tick`](Self::tick).
    pub fn mode(&self) -> SvfMode {
        self.mode
    }

    /// Changes the response used by [`tick`](Self::tick).
    pub fn set_mode(&mut self, mode: SvfMode) {
        self.mode = mode;
    }

    /// Sets the normalized cutoff. Takes the absolute value and clamps below
    /// Nyquist; the coefficient is only recomputed on change.
    #[inline]
    pub fn set_cutoff(&mut self, cutoff: f32) {
        let cutoff = if cutoff.is_finite() {
            cutoff.abs().min(MAX_CUTOFF)
        } else {
            0.0
        };
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            self.g = tanf(PI * cutoff);
        }
    }

    /// Current normalized cutoff.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Filters one sample in the configured mode.
    #[inline]
    pub fn tick(&mut self, input: f32, cutoff: f32, resonance: f32) -> f32 {
        self.set_cutoff(cutoff);
        let k = damping(resonance);
        let mode = self.mode;
        let mut signal = input;
        for stage in &mut self.stages[mode.index()][..self.count] {
            signal = select(stage.tick(signal, self.g, k), mode);
        }
        signal
    }

    /// Filters one sample through all three responses.
    #[inline]
    pub fn tick_all(&mut self, input: f32, cutoff: f32, resonance: f32) -> SvfTaps {
        self.set_cutoff(cutoff);
        let k = damping(resonance);
        let mut taps = SvfTaps::default();
        for mode in SvfMode::ALL {
            let mut signal = input;
            for stage in &mut self.stages[mode.index()][..self.count] {
                signal = select(stage.tick(signal, self.g, k), mode);
            }
            match mode {
                SvfMode::Lowpass => taps.low = signal,
                SvfMode::Bandpass => taps.band = signal,
                SvfMode::Highpass => taps.high = signal,
            }
        }
        taps
    }

    /// Zeroes every accumulator.
    pub fn reset(&mut self) {
        self.stages = [[Stage::default(); MAX_STAGES]; 3];
    }
}

/// `k = 2r` with `r = 1 / max(resonance, 1)`, resonance capped at
/// [`MAX_RESONANCE`].
#[inline]
fn damping(resonance: f32) -> f32 {
    let resonance = if resonance.is_nan() { 1.0 } else { resonance };
    2.0 / resonance.clamp(1.0, MAX_RESONANCE)
}

#[inline]
fn select(taps: SvfTaps, mode: SvfMode) -> f32 {
    match mode {
        SvfMode::Lowpass => taps.low,
        SvfMode::Bandpass => taps.band,
        SvfMode::Highpass => taps.high,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_gain(svf: &mut Svf, freq: f32, cutoff: f32) -> f32 {
        let mut peak = 0.0f32;
        for n in 0..20_000 {
            let x = libm::sinf(2.0 * PI * freq * n as f32);
            let y = svf.tick(x, cutoff, 1.0);
            if n > 10_000 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut svf = Svf::new(1, SvfMode::Lowpass);
        let mut out = 0.0;
        for _ in 0..10_000 {
            out = svf.tick(1.0, 0.01, 1.0);
        }
        assert!((out - 1.0).abs() < 1e-3);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut svf = Svf::new(1, SvfMode::Highpass);
        let mut out = 1.0;
        for _ in 0..10_000 {
            out = svf.tick(1.0, 0.01, 1.0);
        }
        assert!(out.abs() < 1e-3);
    }

    #[test]
    fn more_stages_attenuate_more() {
        let one = sine_gain(&mut Svf::new(1, SvfMode::Lowpass), 0.1, 0.01);
        let four = sine_gain(&mut Svf::new(4, SvfMode::Lowpass), 0.1, 0.01);
        assert!(four < one * 0.1, "one {one}, four {four}");
    }

    #[test]
    fn negative_and_oversized_cutoff_are_sanitized() {
        let mut svf = Svf::new(1, SvfMode::Lowpass);
        svf.set_cutoff(-0.02);
        assert_eq!(svf.cutoff(), 0.02);
        svf.set_cutoff(3.0);
        assert_eq!(svf.cutoff(), MAX_CUTOFF);
        svf.set_cutoff(f32::NAN);
        assert_eq!(svf.cutoff(), 0.0);
        assert!(svf.tick(1.0, f32::INFINITY, 1.0).is_finite());
    }

    #[test]
    fn tick_all_matches_single_mode() {
        let mut all = Svf::new(2, SvfMode::Lowpass);
        let mut band = Svf::new(2, SvfMode::Bandpass);
        for n in 0..500 {
            let x = if n % 37 < 18 { 1.0 } else { -1.0 };
            let taps = all.tick_all(x, 0.03, 2.0);
            assert_eq!(taps.band, band.tick(x, 0.03, 2.0));
        }
    }

    #[test]
    fn extreme_resonance_stays_bounded() {
        assert_eq!(damping(f32::INFINITY), damping(MAX_RESONANCE));
        assert_eq!(damping(f32::NAN), damping(1.0));

        let mut svf = Svf::new(MAX_STAGES, SvfMode::Lowpass);
        for _ in 0..48000 {
            let taps = svf.tick_all(1.0, 0.01, f32::INFINITY);
            assert!(taps.low.is_finite() && taps.band.is_finite() && taps.high.is_finite());
        }
    }

    #[test]
    fn low_resonance_clamps_to_one() {
        assert_eq!(damping(0.1), damping(1.0));
        assert!(damping(10.0) < damping(1.0));
    }
}
