//! Step sequencer.
//!
//! Steps are semitone offsets. Each rising clock edge moves to the next step;
//! `out` holds `step + transpose` until the next one, so patch it into an
//! oscillator's `detune`. `gate` follows the clock once the sequence has
//! started, and `end` pulses for one sample when the sequence wraps back to
//! the first step.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Module, ModuleConfig, OutSpec, SeqInput,
    Sequencer, Taps, Unit,
};

use crate::gate;

const KIND: &str = "step-seq";

const CLOCK: usize = 0;
const RESET: usize = 1;
const TRANSPOSE: usize = 2;

struct StepSeq {
    steps: Vec<f32>,
    cursor: Sequencer,
}

impl StepSeq {
    fn new(steps: Vec<f32>) -> Self {
        Self {
            cursor: Sequencer::new(steps.len()),
            steps,
        }
    }

    /// Advances one sample and returns `(out, gate, end)`.
    #[inline]
    fn tick(&mut self, clock: f32, reset: f32, transpose: f32) -> (f32, f32, f32) {
        let out = self.cursor.tick(SeqInput { clock, reset });
        let step = self.steps[out.step.unwrap_or(0)];
        (step + transpose, gate(out.gate), gate(out.end))
    }
}

impl Kernel for StepSeq {
    fn taps(&self) -> usize {
        3
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let (out, gate, end) = self.tick(ins[CLOCK][i], ins[RESET][i], ins[TRANSPOSE][i]);
            taps[0][i] = out;
            taps[1][i] = gate;
            taps[2][i] = end;
        }
    }
}

/// Builds a step sequencer. Config: `steps`, semitone offsets (default
/// `[0, 3, 7, 12]`).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let steps = config
        .list(KIND, "steps")?
        .unwrap_or_else(|| vec![0.0, 3.0, 7.0, 12.0]);
    if steps.is_empty() {
        return Err(ConfigError::invalid_field(KIND, "steps", "needs at least one step"));
    }
    if let Some(bad) = steps.iter().find(|s| !s.is_finite()) {
        return Err(ConfigError::invalid_field(
            KIND,
            "steps",
            format!("step {bad} is not a number"),
        ));
    }

    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("clock", 0.0),
            InSpec::new("reset", 0.0),
            InSpec::new("transpose", 0.0),
        ],
        vec![
            OutSpec::new("out", 0),
            OutSpec::new("gate", 1),
            OutSpec::new("end", 2),
        ],
        StepSeq::new(steps),
    )
}
