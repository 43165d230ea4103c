//! Gate and trigger edge detection.
//!
//! One rule is used everywhere a module reacts to a gate or clock: a rising
//! edge is `previous <= 0 && current > 0`, a falling edge is the mirror
//! image.

/// Returns `true` when `current` rises above zero from at or below it.
#[inline]
pub fn is_rising(previous: f32, current: f32) -> bool {
    previous <= 0.0 && current > 0.0
}

/// Returns `true` when `current` falls to or below zero from above it.
#[inline]
pub fn is_falling(previous: f32, current: f32) -> bool {
    previous > 0.0 && current <= 0.0
}

/// Which transition a sample produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Edge {
    /// Crossed from `<= 0` to `> 0`.
    Rising,
    /// Crossed from `> 0` to `<= 0`.
    Falling,
    /// No crossing.
    #[default]
    None,
}

/// Remembers the previous sample of a gate signal.
///
/// ```rust
/// use patchcord_core::{Edge, EdgeDetector};
///
/// let mut gate = EdgeDetector::new();
/// assert_eq!(gate.tick(0.0), Edge::None);
/// assert_eq!(gate.tick(1.0), Edge::Rising);
/// assert_eq!(gate.tick(1.0), Edge::None);
/// assert_eq!(gate.tick(0.0), Edge::Falling);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    previous: f32,
}

impl EdgeDetector {
    /// Creates a detector whose previous sample is zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one sample and reports the transition it made.
    #[inline]
    pub fn tick(&mut self, current: f32) -> Edge {
        let previous = self.previous;
        self.previous = current;
        if is_rising(previous, current) {
            Edge::Rising
        } else if is_falling(previous, current) {
            Edge::Falling
        } else {
            Edge::None
        }
    }

    /// Feeds one sample and returns `true` on a rising edge.
    #[inline]
    pub fn rising(&mut self, current: f32) -> bool {
        self.tick(current) == Edge::Rising
    }

    /// Whether the last sample was high.
    pub fn is_high(&self) -> bool {
        self.previous > 0.0
    }
}
