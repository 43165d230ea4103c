//! Envelope generators.
//!
//! Each generator is a closed enum of stages plus one transition function per
//! stage. A tick copies the inputs into a mutable record, runs the current
//! stage's transition, stores the stage it returns and reads the record's
//! output. Curves come from [`Segment`], computed once on segment entry.

mod adsr;
mod ahd;
mod segment;
mod shape;

pub use adsr::{Adsr, AdsrInput, AdsrStage};
pub use ahd::{Ahd, AhdInput, AhdStage};
pub use segment::{MAX_RATIO, MIN_RATIO, Segment, coefficient, curve_ratio};
pub use shape::{Shape, ShapeInput, ShapeStage};

/// Level below which a falling segment is considered finished.
pub const EPSILON: f32 = 1e-4;

/// One sample of envelope output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeOutput {
    /// Envelope level in `[0, 1]`.
    pub out: f32,
    /// High for one sample after a cycle completes.
    pub end_cycle: bool,
}

impl EnvelopeOutput {
    /// `end_cycle` as a gate value.
    #[inline]
    pub fn end_gate(&self) -> f32 {
        if self.end_cycle { 1.0 } else { 0.0 }
    }
}
