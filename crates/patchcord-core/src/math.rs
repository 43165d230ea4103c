//! Small math helpers shared by the DSP primitives.
//!
//! - [`flush_denormal`] - Zero out values small enough to go subnormal
//! - [`semitones_to_ratio`] - Detune in semitones to a frequency ratio
//! - [`db_to_linear`] - Decibels to linear gain
//! - [`lerp`] - Linear interpolation
//! - [`ms_to_samples`] - Milliseconds to a whole sample count

use libm::{floorf, powf};

/// Flush values below 1e-20 to zero.
///
/// Recursive filters and feedback loops decay towards zero forever; once the
/// state goes subnormal, arithmetic on it becomes very slow on most CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Convert a detune in semitones to a frequency ratio.
///
/// ```rust
/// use patchcord_core::semitones_to_ratio;
///
/// assert!((semitones_to_ratio(12.0) - 2.0).abs() < 1e-6);
/// assert!((semitones_to_ratio(0.0) - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    powf(2.0, semitones / 12.0)
}

/// Convert decibels to linear gain.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    powf(10.0, db / 20.0)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert milliseconds to a whole number of samples, at least one.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    let samples = floorf(ms.max(0.0) * sample_rate / 1000.0);
    (samples as usize).max(1)
}
