//! Trigger-driven rise/fall generator with optional cycling.

use super::segment::Segment;
use super::{EPSILON, EnvelopeOutput};
use crate::edge::EdgeDetector;

/// Shape stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeStage {
    /// Silent, waiting for a trigger or a high cycle input.
    #[default]
    Idle,
    /// Rising towards full level.
    Rise,
    /// Falling to silence.
    Fall,
}

/// Per-sample inputs. Times are in samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShapeInput {
    /// Trigger; a rising edge starts a rise unless one is underway.
    pub trigger: f32,
    /// Rise time.
    pub rise: f32,
    /// Fall time.
    pub fall: f32,
    /// While high the generator loops.
    pub cycle: f32,
    /// Curve ratio.
    pub ratio: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct Record {
    input: ShapeInput,
    triggered: bool,
    segment: Segment,
    out: f32,
    finished: bool,
}

impl Record {
    fn cycling(&self) -> bool {
        self.input.cycle > 0.0
    }

    fn enter_rise(&mut self) -> ShapeStage {
        self.segment = Segment::rise(self.input.rise, self.input.ratio);
        ShapeStage::Rise
    }

    fn enter_fall(&mut self) -> ShapeStage {
        self.segment = Segment::fall(0.0, self.input.fall, self.input.ratio);
        ShapeStage::Fall
    }
}

fn idle(r: &mut Record) -> ShapeStage {
    r.out = 0.0;
    if r.triggered || r.cycling() {
        r.enter_rise()
    } else {
        ShapeStage::Idle
    }
}

fn rise(r: &mut Record) -> ShapeStage {
    r.out = r.segment.apply(r.out);
    if r.out < 1.0 {
        return ShapeStage::Rise;
    }
    r.out = 1.0;
    r.enter_fall()
}

fn fall(r: &mut Record) -> ShapeStage {
    if r.triggered {
        return r.enter_rise();
    }
    r.out = r.segment.apply(r.out);
    if r.out > EPSILON {
        return ShapeStage::Fall;
    }
    r.out = 0.0;
    r.finished = true;
    if r.cycling() {
        r.enter_rise()
    } else {
        ShapeStage::Idle
    }
}

/// Rise/fall function generator.
///
/// A trigger starts one rise-then-fall cycle. Holding `cycle` high turns it
/// into a free-running LFO whose period is `rise + fall`. `end_cycle` pulses
/// for one sample after every completed fall.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    stage: ShapeStage,
    record: Record,
    trigger: EdgeDetector,
}

impl Shape {
    /// Creates an idle generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    pub fn stage(&self) -> ShapeStage {
        self.stage
    }

    /// Current output level.
    pub fn level(&self) -> f32 {
        self.record.out
    }

    /// Runs one sample.
    #[inline]
    pub fn tick(&mut self, input: ShapeInput) -> EnvelopeOutput {
        let r = &mut self.record;
        r.input = input;
        r.triggered = self.trigger.rising(input.trigger);
        let end_cycle = core::mem::take(&mut r.finished);

        self.stage = match self.stage {
            ShapeStage::Idle => idle(r),
            ShapeStage::Rise => rise(r),
            ShapeStage::Fall => fall(r),
        };

        EnvelopeOutput {
            out: r.out,
            end_cycle,
        }
    }
}
