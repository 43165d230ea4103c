//! Gate-driven attack/decay/sustain/release generator.

use super::segment::Segment;
use super::{EPSILON, EnvelopeOutput};
use crate::edge::{Edge, EdgeDetector};

/// ADSR stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdsrStage {
    /// Silent, waiting for a gate.
    #[default]
    Idle,
    /// Rising towards full level.
    Attack,
    /// Falling towards the sustain level.
    Decay,
    /// Holding the sustain level while the gate is high.
    Sustain,
    /// Falling to silence after the gate closed.
    Release,
}

/// Per-sample inputs. Times are in samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AdsrInput {
    /// Gate signal.
    pub gate: f32,
    /// Attack time.
    pub attack: f32,
    /// Decay time.
    pub decay: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time.
    pub release: f32,
    /// Curve ratio; small is exponential, large is near linear.
    pub ratio: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct Record {
    input: AdsrInput,
    edge: Edge,
    segment: Segment,
    out: f32,
    finished: bool,
    disable_sustain: bool,
}

impl Record {
    fn rising(&self) -> bool {
        self.edge == Edge::Rising
    }

    fn falling(&self) -> bool {
        self.edge == Edge::Falling
    }

    fn sustain(&self) -> f32 {
        let sustain = self.input.sustain;
        if sustain.is_nan() {
            0.0
        } else {
            sustain.clamp(0.0, 1.0)
        }
    }

    fn enter_attack(&mut self) -> AdsrStage {
        let input = self.input;
        self.segment = Segment::rise(input.attack, input.ratio);
        AdsrStage::Attack
    }

    fn enter_decay(&mut self) -> AdsrStage {
        let input = self.input;
        self.segment = Segment::fall(self.sustain(), input.decay, input.ratio);
        AdsrStage::Decay
    }

    fn enter_release(&mut self) -> AdsrStage {
        let input = self.input;
        self.segment = Segment::fall(0.0, input.release, input.ratio);
        AdsrStage::Release
    }

    /// Where to go once the sustain level is reached.
    fn after_decay(&mut self) -> AdsrStage {
        self.out = self.sustain();
        if self.disable_sustain {
            self.enter_release()
        } else {
            AdsrStage::Sustain
        }
    }
}

fn idle(r: &mut Record) -> AdsrStage {
    r.out = 0.0;
    if r.rising() {
        r.enter_attack()
    } else {
        AdsrStage::Idle
    }
}

fn attack(r: &mut Record) -> AdsrStage {
    if r.falling() && !r.disable_sustain {
        return r.enter_release();
    }
    r.out = r.segment.apply(r.out);
    if r.out < 1.0 {
        return AdsrStage::Attack;
    }
    r.out = 1.0;
    if r.input.decay < 1.0 {
        r.after_decay()
    } else {
        r.enter_decay()
    }
}

fn decay(r: &mut Record) -> AdsrStage {
    if r.falling() && !r.disable_sustain {
        return r.enter_release();
    }
    r.out = r.segment.apply(r.out);
    if r.out <= r.sustain() {
        r.after_decay()
    } else {
        AdsrStage::Decay
    }
}

fn sustain(r: &mut Record) -> AdsrStage {
    r.out = r.sustain();
    if r.falling() {
        r.enter_release()
    } else {
        AdsrStage::Sustain
    }
}

fn release(r: &mut Record) -> AdsrStage {
    if r.rising() {
        return r.enter_attack();
    }
    r.out = r.segment.apply(r.out);
    if r.out <= EPSILON {
        r.out = 0.0;
        r.finished = true;
        AdsrStage::Idle
    } else {
        AdsrStage::Release
    }
}

/// ADSR envelope.
///
/// With `disable_sustain` the envelope runs attack and decay to the sustain
/// level and then releases on its own, ignoring the gate's fall: a one-shot
/// triggered by the rising edge.
///
/// # Example
///
/// ```rust
/// use patchcord_core::{Adsr, AdsrInput, AdsrStage};
///
/// let mut env = Adsr::new(false);
/// let held = AdsrInput { gate: 1.0, attack: 10.0, decay: 10.0, sustain: 0.5, release: 10.0, ratio: 0.01 };
/// for _ in 0..100 {
///     env.tick(held);
/// }
/// assert_eq!(env.stage(), AdsrStage::Sustain);
/// assert_eq!(env.level(), 0.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Adsr {
    stage: AdsrStage,
    record: Record,
    gate: EdgeDetector,
}

impl Adsr {
    /// Creates an idle envelope.
    pub fn new(disable_sustain: bool) -> Self {
        Self {
            record: Record {
                disable_sustain,
                ..Record::default()
            },
            ..Self::default()
        }
    }

    /// Current stage.
    pub fn stage(&self) -> AdsrStage {
        self.stage
    }

    /// Current output level.
    pub fn level(&self) -> f32 {
        self.record.out
    }

    /// Runs one sample.
    #[inline]
    pub fn tick(&mut self, input: AdsrInput) -> EnvelopeOutput {
        let r = &mut self.record;
        r.input = input;
        r.edge = self.gate.tick(input.gate);
        let end_cycle = core::mem::take(&mut r.finished);

        self.stage = match self.stage {
            AdsrStage::Idle => idle(r),
            AdsrStage::Attack => attack(r),
            AdsrStage::Decay => decay(r),
            AdsrStage::Sustain => sustain(r),
            AdsrStage::Release => release(r),
        };

        EnvelopeOutput {
            out: r.out,
            end_cycle,
        }
    }
}
