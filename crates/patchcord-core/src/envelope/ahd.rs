//! Trigger-driven attack/hold/decay generator.

use super::segment::Segment;
use super::{EPSILON, EnvelopeOutput};
use crate::edge::EdgeDetector;

/// AHD stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AhdStage {
    /// Silent, waiting for a trigger.
    #[default]
    Idle,
    /// Rising towards full level.
    Attack,
    /// Holding full level.
    Hold,
    /// Falling to silence.
    Decay,
}

/// Per-sample inputs. Times are in samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AhdInput {
    /// Trigger; any rising edge restarts the attack.
    pub trigger: f32,
    /// Attack time.
    pub attack: f32,
    /// Hold time.
    pub hold: f32,
    /// Decay time.
    pub decay: f32,
    /// Curve ratio.
    pub ratio: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct Record {
    input: AhdInput,
    triggered: bool,
    segment: Segment,
    held: f32,
    out: f32,
    finished: bool,
}

impl Record {
    fn enter_attack(&mut self) -> AhdStage {
        self.segment = Segment::rise(self.input.attack, self.input.ratio);
        AhdStage::Attack
    }

    fn enter_hold(&mut self) -> AhdStage {
        self.held = 0.0;
        AhdStage::Hold
    }

    fn enter_decay(&mut self) -> AhdStage {
        self.segment = Segment::fall(0.0, self.input.decay, self.input.ratio);
        AhdStage::Decay
    }
}

fn idle(r: &mut Record) -> AhdStage {
    r.out = 0.0;
    if r.triggered {
        r.enter_attack()
    } else {
        AhdStage::Idle
    }
}

fn attack(r: &mut Record) -> AhdStage {
    r.out = r.segment.apply(r.out);
    if r.out < 1.0 {
        return AhdStage::Attack;
    }
    r.out = 1.0;
    r.enter_hold()
}

fn hold(r: &mut Record) -> AhdStage {
    r.out = 1.0;
    r.held += 1.0;
    if r.held >= r.input.hold {
        r.enter_decay()
    } else {
        AhdStage::Hold
    }
}

fn decay(r: &mut Record) -> AhdStage {
    r.out = r.segment.apply(r.out);
    if r.out <= EPSILON {
        r.out = 0.0;
        r.finished = true;
        AhdStage::Idle
    } else {
        AhdStage::Decay
    }
}

/// Attack/hold/decay envelope. A rising trigger restarts the attack from the
/// current level in any stage.
#[derive(Clone, Debug, Default)]
pub struct Ahd {
    stage: AhdStage,
    record: Record,
    trigger: EdgeDetector,
}

impl Ahd {
    /// Creates an idle envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    pub fn stage(&self) -> AhdStage {
        self.stage
    }

    /// Current output level.
    pub fn level(&self) -> f32 {
        self.record.out
    }

    /// Runs one sample.
    #[inline]
    pub fn tick(&mut self, input: AhdInput) -> EnvelopeOutput {
        let r = &mut self.record;
        r.input = input;
        r.triggered = self.trigger.rising(input.trigger);
        let end_cycle = core::mem::take(&mut r.finished);

        let stage = if r.triggered && self.stage != AhdStage::Idle {
            r.enter_attack()
        } else {
            self.stage
        };
        self.stage = match stage {
            AhdStage::Idle => idle(r),
            AhdStage::Attack => attack(r),
            AhdStage::Hold => hold(r),
            AhdStage::Decay => decay(r),
        };

        EnvelopeOutput {
            out: r.out,
            end_cycle,
        }
    }
}
