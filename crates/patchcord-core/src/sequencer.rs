//! Clock and step sequencer state machines.
//!
//! Built like the envelopes: a closed enum of stages, one transition function
//! per stage over a mutable record, and a tick that copies the inputs in,
//! stores the stage the transition returns and reads the record back out.
//! Every clock, run and reset input reacts to the shared rising-edge rule.

use crate::edge::{Edge, EdgeDetector};

/// Step sequencer stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeqStage {
    /// Waiting for the first clock since construction or reset.
    #[default]
    Idle,
    /// Playing the step at this index.
    Step(usize),
}

/// Per-sample sequencer inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeqInput {
    /// Clock signal; each rising edge advances one step.
    pub clock: f32,
    /// Reset signal; a rising edge rewinds to idle.
    pub reset: f32,
}

/// One sample of sequencer state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeqOutput {
    /// Current step, `None` before the first clock.
    pub step: Option<usize>,
    /// Clock is high and a step is playing.
    pub gate: bool,
    /// The sequence wrapped back to its first step on this sample.
    pub end: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct SeqRecord {
    clock: Edge,
    high: bool,
    reset: bool,
    len: usize,
    wrapped: bool,
}

impl SeqRecord {
    fn advanced(&self) -> bool {
        self.clock == Edge::Rising
    }
}

fn seq_idle(r: &mut SeqRecord) -> SeqStage {
    if r.advanced() {
        SeqStage::Step(0)
    } else {
        SeqStage::Idle
    }
}

fn seq_step(r: &mut SeqRecord, index: usize) -> SeqStage {
    if r.reset {
        return seq_idle(r);
    }
    if !r.advanced() {
        return SeqStage::Step(index);
    }
    let next = index + 1;
    if next < r.len {
        SeqStage::Step(next)
    } else {
        r.wrapped = true;
        SeqStage::Step(0)
    }
}

/// Clock-driven cursor over a fixed number of steps.
///
/// # Example
///
/// ```rust
/// use patchcord_core::{SeqInput, SeqStage, Sequencer};
///
/// let mut seq = Sequencer::new(2);
/// let pulse = |clock| SeqInput { clock, reset: 0.0 };
/// assert_eq!(seq.tick(pulse(1.0)).step, Some(0));
/// seq.tick(pulse(0.0));
/// assert_eq!(seq.tick(pulse(1.0)).step, Some(1));
/// seq.tick(pulse(0.0));
/// assert!(seq.tick(pulse(1.0)).end);
/// assert_eq!(seq.stage(), SeqStage::Step(0));
/// ```
#[derive(Clone, Debug)]
pub struct Sequencer {
    stage: SeqStage,
    record: SeqRecord,
    clock: EdgeDetector,
    reset: EdgeDetector,
}

impl Sequencer {
    /// Creates an idle sequencer over `len` steps. `len` must be non-zero.
    pub fn new(len: usize) -> Self {
        Self {
            stage: SeqStage::Idle,
            record: SeqRecord {
                len: len.max(1),
                ..SeqRecord::default()
            },
            clock: EdgeDetector::new(),
            reset: EdgeDetector::new(),
        }
    }

    /// Current stage.
    pub fn stage(&self) -> SeqStage {
        self.stage
    }

    /// Number of steps.
    pub fn steps(&self) -> usize {
        self.record.len
    }

    /// Runs one sample.
    #[inline]
    pub fn tick(&mut self, input: SeqInput) -> SeqOutput {
        let r = &mut self.record;
        r.clock = self.clock.tick(input.clock);
        r.high = input.clock > 0.0;
        r.reset = self.reset.rising(input.reset);
        r.wrapped = false;

        self.stage = match self.stage {
            SeqStage::Idle => seq_idle(r),
            SeqStage::Step(index) => seq_step(r, index),
        };

        let step = match self.stage {
            SeqStage::Idle => None,
            SeqStage::Step(index) => Some(index),
        };
        SeqOutput {
            step,
            gate: step.is_some() && r.high,
            end: r.wrapped,
        }
    }
}

/// Clock generator stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetronomeStage {
    /// `run` is low; every output is low.
    #[default]
    Stopped,
    /// Counting beats.
    Running,
}

/// Per-sample clock generator inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetronomeInput {
    /// Beats per sample. Clamped to `[0, 1]`; non-finite values stop the
    /// phase.
    pub tempo: f32,
    /// High fraction of each period, clamped to `[0, 1]`.
    pub width: f32,
    /// Run signal; a rising edge restarts on beat one.
    pub run: f32,
}

/// One sample of clock generator output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetronomeOutput {
    /// Every beat.
    pub beat: bool,
    /// Every second beat.
    pub half: bool,
    /// Every fourth beat.
    pub quarter: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct MetronomeRecord {
    input: MetronomeInput,
    run: Edge,
    phase: f32,
    beat: u32,
    out: MetronomeOutput,
}

impl MetronomeRecord {
    fn tempo(&self) -> f32 {
        let tempo = self.input.tempo;
        if tempo.is_finite() {
            tempo.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn high(&self, period: u32) -> bool {
        let width = self.input.width.clamp(0.0, 1.0);
        let position = ((self.beat % period) as f32 + self.phase) / period as f32;
        position < width
    }

    fn advance(&mut self) {
        // phase < 1 and tempo <= 1, so at most one beat per sample
        self.phase += self.tempo();
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            self.beat = (self.beat + 1) % 4;
        }
    }
}

fn stopped(r: &mut MetronomeRecord) -> MetronomeStage {
    if r.run != Edge::Rising {
        r.out = MetronomeOutput::default();
        return MetronomeStage::Stopped;
    }
    r.phase = 0.0;
    r.beat = 0;
    running(r)
}

fn running(r: &mut MetronomeRecord) -> MetronomeStage {
    if r.input.run <= 0.0 {
        return stopped(r);
    }
    r.out = MetronomeOutput {
        beat: r.high(1),
        half: r.high(2),
        quarter: r.high(4),
    };
    r.advance();
    MetronomeStage::Running
}

/// Phase-accumulating clock with divided outputs.
///
/// ```rust
/// use patchcord_core::{Metronome, MetronomeInput, MetronomeStage};
///
/// let mut clock = Metronome::new();
/// let input = MetronomeInput { tempo: 0.25, width: 0.5, run: 1.0 };
/// let beats: Vec<bool> = (0..8).map(|_| clock.tick(input).beat).collect();
/// assert_eq!(beats, [true, true, false, false, true, true, false, false]);
/// assert_eq!(clock.stage(), MetronomeStage::Running);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Metronome {
    stage: MetronomeStage,
    record: MetronomeRecord,
    run: EdgeDetector,
}

impl Metronome {
    /// Creates a stopped clock. A high `run` on the first tick starts it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    pub fn stage(&self) -> MetronomeStage {
        self.stage
    }

    /// Position within the current beat, in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.record.phase
    }

    /// Beat within the bar, `0..4`.
    pub fn beat(&self) -> u32 {
        self.record.beat
    }

    /// Runs one sample.
    #[inline]
    pub fn tick(&mut self, input: MetronomeInput) -> MetronomeOutput {
        let r = &mut self.record;
        r.input = input;
        r.run = self.run.tick(input.run);

        self.stage = match self.stage {
            MetronomeStage::Stopped => stopped(r),
            MetronomeStage::Running => running(r),
        };
        r.out
    }
}
