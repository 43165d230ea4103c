//! Feed-forward and feedback comb filters.
//!
//! ```text
//! feed-forward:  y[n] = x[n] + g * x[n - d]
//! feedback:      y[n] = x[n] + g * y[n - d]
//! ```
//!
//! The feedback form optionally damps its loop with a [`OnePole`], the
//! Freeverb arrangement used by the reverb network.

use crate::delay::DelayLine;
use crate::math::flush_denormal;
use crate::one_pole::OnePole;

/// Which comb structure a [`Comb`] runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombKind {
    /// Adds a delayed copy of the input.
    FeedForward,
    /// Adds a delayed copy of the output.
    #[default]
    Feedback,
}

/// Comb filter over a variable-length [`DelayLine`].
///
/// # Example
///
/// ```rust
/// use patchcord_core::{Comb, CombKind};
///
/// let mut comb = Comb::new(CombKind::Feedback, 64);
/// let first = comb.tick(1.0, 10.0, 0.5);
/// assert_eq!(first, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Comb {
    kind: CombKind,
    line: DelayLine,
    damp: OnePole,
}

impl Comb {
    /// Creates a comb holding up to `capacity` samples of delay.
    pub fn new(kind: CombKind, capacity: usize) -> Self {
        Self {
            kind,
            line: DelayLine::new(capacity),
            damp: OnePole::with_coefficient(0.0),
        }
    }

    /// Sets the loop damping in `[0, 1)`; only the feedback form uses it.
    pub fn set_damp(&mut self, damp: f32) {
        self.damp.set_coefficient(damp);
    }

    /// Structure this comb runs.
    pub fn kind(&self) -> CombKind {
        self.kind
    }

    /// Filters one sample with delay `duration` (samples) and gain `gain`.
    ///
    /// Feedback gain is clamped to `(-1, 1)` to keep the loop stable.
    #[inline]
    pub fn tick(&mut self, input: f32, duration: f32, gain: f32) -> f32 {
        match self.kind {
            CombKind::FeedForward => input + gain * self.line.tick(input, duration),
            CombKind::Feedback => {
                let gain = gain.clamp(-0.999, 0.999);
                let delayed = self.damp.process(self.line.peek(duration));
                let out = flush_denormal(input + gain * delayed);
                self.line.tick(out, duration);
                out
            }
        }
    }

    /// Clears the delay and damping state.
    pub fn clear(&mut self) {
        self.line.clear();
        self.damp.reset();
    }

    /// Maximum delay in samples.
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }
}
