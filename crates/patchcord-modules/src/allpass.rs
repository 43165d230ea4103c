//! Schroeder allpass diffuser.

use patchcord_core::{
    Allpass as AllpassFilter, ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module,
    ModuleConfig, OutSpec, Taps, Unit,
};

use crate::max_delay;

const KIND: &str = "allpass";

const IN: usize = 0;
const TIME: usize = 1;
const GAIN: usize = 2;

struct Allpass {
    filter: AllpassFilter,
}

impl Kernel for Allpass {
    fn taps(&self) -> usize {
        1
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            taps[0][i] = self.filter.tick(ins[IN][i], ins[TIME][i], ins[GAIN][i]);
        }
    }
}

/// Builds an allpass. Config: `max`, the longest delay in ms (default 100).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let capacity = max_delay(config, KIND, 100.0)?;
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("in", 0.0),
            InSpec::new("time", Literal::Ms(10.0)),
            InSpec::new("gain", 0.5),
        ],
        vec![OutSpec::new("out", 0)],
        Allpass {
            filter: AllpassFilter::new(capacity),
        },
    )
}
