//! Ring-buffer delay lines.
//!
//! # Types
//!
//! - [`DelayLine`] - Single line with a per-tick duration
//! - [`TappedDelay`] - Lines in series, one output per stage
//!
//! # Duration semantics
//!
//! The buffer is allocated once at its capacity. Each tick names the
//! duration it wants, clamped to `[0, capacity]`. The cursor wraps to the
//! start when it reaches the duration (or the capacity), so shortening the
//! duration takes effect within one cycle of the new length.
//!
//! A value pushed into a line of duration `d >= 1` comes back out on the
//! `d`-th subsequent tick. A duration of zero passes input straight through.

use crate::math::ms_to_samples;

/// Circular buffer delay whose length can change every sample.
///
/// # Example
///
/// ```rust
/// use patchcord_core::DelayLine;
///
/// let mut line = DelayLine::new(8);
/// assert_eq!(line.tick(1.0, 3.0), 0.0);
/// assert_eq!(line.tick(2.0, 3.0), 0.0);
/// assert_eq!(line.tick(3.0, 3.0), 0.0);
/// assert_eq!(line.tick(4.0, 3.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    cursor: usize,
}

impl DelayLine {
    /// Creates a line holding up to `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            cursor: 0,
        }
    }

    /// Creates a line holding up to `max_ms` milliseconds at `sample_rate`.
    pub fn from_ms(max_ms: f32, sample_rate: f32) -> Self {
        Self::new(ms_to_samples(max_ms, sample_rate))
    }

    /// Pushes `value` and returns the sample `duration` ticks old.
    ///
    /// `duration` is in samples, rounded to the nearest whole sample and
    /// clamped to the capacity.
    #[inline]
    pub fn tick(&mut self, value: f32, duration: f32) -> f32 {
        let capacity = self.buffer.len();
        let duration = clamp_duration(duration, capacity);
        if duration == 0 {
            return value;
        }

        if self.cursor >= duration || self.cursor >= capacity {
            self.cursor = 0;
        }
        let out = core::mem::replace(&mut self.buffer[self.cursor], value);
        self.cursor += 1;
        out
    }

    /// Returns the sample the next [`tick`](Self::tick) with the same
    /// `duration` would return, without pushing anything.
    ///
    /// Feedback structures read the delayed sample first, then push a value
    /// computed from it.
    #[inline]
    pub fn peek(&self, duration: f32) -> f32 {
        let capacity = self.buffer.len();
        let duration = clamp_duration(duration, capacity);
        if duration == 0 {
            return 0.0;
        }
        if self.cursor >= duration || self.cursor >= capacity {
            self.buffer[0]
        } else {
            self.buffer[self.cursor]
        }
    }

    /// Zeroes the buffer and rewinds the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
    }

    /// Maximum duration in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[inline]
fn clamp_duration(duration: f32, capacity: usize) -> usize {
    if duration.is_nan() || duration <= 0.0 {
        return 0;
    }
    let rounded = libm::roundf(duration);
    if rounded >= capacity as f32 {
        capacity
    } else {
        rounded as usize
    }
}

/// Delay lines in series, each stage's output feeding the next.
///
/// Stage `n` outputs the input delayed by the sum of durations `0..=n`.
#[derive(Debug, Clone)]
pub struct TappedDelay {
    lines: Vec<DelayLine>,
    taps: Vec<f32>,
}

impl TappedDelay {
    /// Creates `taps` stages each holding up to `capacity` samples.
    pub fn new(taps: usize, capacity: usize) -> Self {
        Self {
            lines: (0..taps).map(|_| DelayLine::new(capacity)).collect(),
            taps: vec![0.0; taps],
        }
    }

    /// Pushes `value` through every stage. `durations[n]` is the length of
    /// stage `n`; missing entries use the last one given (or zero).
    #[inline]
    pub fn tick(&mut self, value: f32, durations: &[f32]) -> &[f32] {
        let mut signal = value;
        let mut duration = 0.0;
        for (n, (line, tap)) in self.lines.iter_mut().zip(self.taps.iter_mut()).enumerate() {
            if let Some(&d) = durations.get(n) {
                duration = d;
            }
            signal = line.tick(signal, duration);
            *tap = signal;
        }
        &self.taps
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` when there are no stages.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clears every stage.
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.taps.fill(0.0);
    }
}
