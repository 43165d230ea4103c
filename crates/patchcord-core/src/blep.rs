//! Band-limited oscillator.
//!
//! Phase is measured in turns (`[0, 1)`) and advanced by a per-sample
//! increment `delta`, which is exactly what a patched `Hz` or `Pitch` source
//! delivers. Saw and pulse are naive waveforms corrected around each
//! discontinuity with a 4th-order polynomial BLEP spanning two samples on
//! either side. The triangle is the leaky integral of the corrected square,
//! and the sub-octave square runs on its own accumulator at half the rate.
//!
//! Hard sync resets both accumulators on a rising edge of the sync input.

use core::f32::consts::TAU;

use libm::{fabsf, sinf};

use crate::edge::EdgeDetector;

/// Narrowest pulse width accepted.
pub const MIN_PULSE_WIDTH: f32 = 0.01;

/// Every waveform for one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OscTaps {
    /// Sine.
    pub sine: f32,
    /// Band-limited saw, rising.
    pub saw: f32,
    /// Band-limited pulse.
    pub pulse: f32,
    /// Triangle, integrated from the square.
    pub triangle: f32,
    /// Square one octave down.
    pub sub: f32,
}

/// Multi-waveform oscillator with independent main and sub phases.
///
/// # Example
///
/// ```rust
/// use patchcord_core::BlepOscillator;
///
/// let mut osc = BlepOscillator::new();
/// let delta = 440.0 / 48000.0;
/// let taps = osc.tick(delta, 0.5, 0.0);
/// assert!(taps.saw.abs() <= 1.1);
/// ```
#[derive(Debug, Clone)]
pub struct BlepOscillator {
    phase: f32,
    sub_phase: f32,
    triangle: f32,
    sync: EdgeDetector,
}

impl Default for BlepOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlepOscillator {
    /// Creates an oscillator at phase zero.
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            sub_phase: 0.0,
            triangle: -1.0,
            sync: EdgeDetector::new(),
        }
    }

    /// Main phase in turns.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Restarts both accumulators.
    pub fn restart(&mut self) {
        self.phase = 0.0;
        self.sub_phase = 0.0;
        self.triangle = -1.0;
    }

    /// Produces one sample of every waveform and advances.
    ///
    /// `delta` is the phase increment in turns per sample (negative runs
    /// backwards), `pulse_width` the high fraction of the pulse, and `sync` a
    /// gate whose rising edge restarts the cycle.
    #[inline]
    pub fn tick(&mut self, delta: f32, pulse_width: f32, sync: f32) -> OscTaps {
        if self.sync.rising(sync) {
            self.restart();
        }

        let dt = fabsf(delta).min(0.5);
        let pw = pulse_width.clamp(MIN_PULSE_WIDTH, 1.0 - MIN_PULSE_WIDTH);
        let t = self.phase;

        let sine = sinf(TAU * t);
        let saw = 2.0 * t - 1.0 - poly_blep(t, dt);
        let pulse = square(t, pw, dt);
        let square_half = square(t, 0.5, dt);
        self.triangle = 4.0 * dt * square_half + (1.0 - 0.01 * dt) * self.triangle;
        let sub = square(self.sub_phase, 0.5, dt * 0.5);

        self.phase = wrap(self.phase + delta);
        self.sub_phase = wrap(self.sub_phase + delta * 0.5);

        OscTaps {
            sine,
            saw,
            pulse,
            triangle: self.triangle.clamp(-1.0, 1.0),
            sub,
        }
    }
}

#[inline]
fn wrap(phase: f32) -> f32 {
    let wrapped = phase - libm::floorf(phase);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

#[inline]
fn square(t: f32, width: f32, dt: f32) -> f32 {
    let naive = if t < width { 1.0 } else { -1.0 };
    naive + poly_blep(t, dt) - poly_blep(wrap(t - width + 1.0), dt)
}

/// 4th-order polynomial band-limited step residual.
///
/// C²-continuous fit to the ideal BLEP over two samples either side of the
/// discontinuity at `t = 0`. Subtract from a falling naive edge, add to a
/// rising one.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    const A4: f32 = -43.0 / 48.0;
    const A3: f32 = 7.0 / 6.0;
    const A2: f32 = 0.5;
    const A0: f32 = -1.0;
    const C: f32 = -11.0 / 48.0;

    if dt <= 0.0 {
        return 0.0;
    }

    let near = |n: f32| {
        if n < 1.0 {
            let n2 = n * n;
            A4 * n2 * n2 + A3 * n2 * n + A2 * n2 + A0
        } else {
            let u = 2.0 - n;
            let u2 = u * u;
            C * u2 * u2
        }
    };

    let span = 2.0 * dt;
    if t < span {
        near(t / dt)
    } else if t > 1.0 - span {
        -near((1.0 - t) / dt)
    } else {
        0.0
    }
}
