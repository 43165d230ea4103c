//! Gate sequencer.
//!
//! Each rising clock edge moves to the next step. While the clock is high,
//! `on` follows it for active steps and `off` for inactive ones. A rising
//! `reset` rewinds so the next clock plays the first step.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Module, ModuleConfig, OutSpec, SeqInput,
    Sequencer, Taps, Unit,
};

use crate::gate;

const KIND: &str = "gate-seq";

const CLOCK: usize = 0;
const RESET: usize = 1;

struct GateSeq {
    steps: Vec<bool>,
    cursor: Sequencer,
}

impl GateSeq {
    fn new(steps: Vec<bool>) -> Self {
        Self {
            cursor: Sequencer::new(steps.len()),
            steps,
        }
    }

    /// Runs one sample and returns `(on, off)`.
    #[inline]
    fn tick(&mut self, clock: f32, reset: f32) -> (f32, f32) {
        let out = self.cursor.tick(SeqInput { clock, reset });
        match out.step {
            Some(step) if out.gate => {
                let active = self.steps[step];
                (gate(active), gate(!active))
            }
            _ => (0.0, 0.0),
        }
    }
}

impl Kernel for GateSeq {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let (on, off) = self.tick(ins[CLOCK][i], ins[RESET][i]);
            taps[0][i] = on;
            taps[1][i] = off;
        }
    }
}

/// Builds a gate sequencer. Config: `steps`, a list where values above zero
/// are active steps (default `[1, 0, 0, 0]`).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let steps: Vec<bool> = config
        .list(KIND, "steps")?
        .unwrap_or_else(|| vec![1.0, 0.0, 0.0, 0.0])
        .into_iter()
        .map(|s| s > 0.0)
        .collect();
    if steps.is_empty() {
        return Err(ConfigError::invalid_field(KIND, "steps", "needs at least one step"));
    }

    Unit::build(
        KIND,
        config,
        vec![InSpec::new("clock", 0.0), InSpec::new("reset", 0.0)],
        vec![OutSpec::new("on", 0), OutSpec::new("off", 1)],
        GateSeq::new(steps),
    )
}
