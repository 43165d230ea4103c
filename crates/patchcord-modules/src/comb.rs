//! Comb filter with feed-forward and feedback paths.
//!
//! The input runs through a feed-forward comb scaled by `gain`, then a
//! feedback comb scaled by `feedback`, both `time` long. Short times give
//! metallic resonances tuned to `1 / time`.

use patchcord_core::{
    Comb as CombFilter, CombKind, ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module,
    ModuleConfig, OutSpec, Taps, Unit,
};

use crate::max_delay;

const KIND: &str = "comb";

const IN: usize = 0;
const TIME: usize = 1;
const GAIN: usize = 2;
const FEEDBACK: usize = 3;

struct Comb {
    forward: CombFilter,
    back: CombFilter,
}

impl Kernel for Comb {
    fn taps(&self) -> usize {
        1
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let time = ins[TIME][i];
            let x = self.forward.tick(ins[IN][i], time, ins[GAIN][i]);
            taps[0][i] = self.back.tick(x, time, ins[FEEDBACK][i]);
        }
    }
}

/// Builds a comb. Config: `max`, the longest delay in ms (default 100).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let capacity = max_delay(config, KIND, 100.0)?;
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("in", 0.0),
            InSpec::new("time", Literal::Ms(10.0)),
            InSpec::new("gain", 0.0),
            InSpec::new("feedback", 0.5),
        ],
        vec![OutSpec::new("out", 0)],
        Comb {
            forward: CombFilter::new(CombKind::FeedForward, capacity),
            back: CombFilter::new(CombKind::Feedback, capacity),
        },
    )
}
