//! Four-quadrant multiplier: ring modulation, VCA and scaling in one.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Module, ModuleConfig, OutSpec, Taps, Unit,
};

const KIND: &str = "mult";

struct Mult;

impl Kernel for Mult {
    fn taps(&self) -> usize {
        1
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            taps[0][i] = ins[0][i] * ins[1][i];
        }
    }
}

/// Builds a multiplier; `b` defaults to `1` so an unpatched `b` passes `a`.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    Unit::build(
        KIND,
        config,
        vec![InSpec::new("a", 0.0), InSpec::new("b", 1.0)],
        vec![OutSpec::new("out", 0)],
        Mult,
    )
}
