//! Mixer.
//!
//! `out = master * sum(in_n * level_n)` over `size` channels.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Module, ModuleConfig, OutSpec, Taps, Unit,
};

const KIND: &str = "mix";

/// Upper bound on the `size` field.
pub const MAX_CHANNELS: usize = 32;

struct Mix {
    channels: usize,
}

impl Kernel for Mix {
    fn taps(&self) -> usize {
        1
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        let n = self.channels;
        let out = &mut taps[0];
        out.fill(0.0);
        for channel in 0..n {
            let (signal, level) = (&ins[channel], &ins[n + channel]);
            for i in 0..FRAME_SIZE {
                out[i] += signal[i] * level[i];
            }
        }
        let master = &ins[2 * n];
        for i in 0..FRAME_SIZE {
            out[i] *= master[i];
        }
    }
}

/// Builds a mixer. Config: `size`, the channel count (1 to 32, default 4).
///
/// Inputs are declared `in0..`, then `level0..`, then `master`.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let channels = config.count(KIND, "size", 4)?;
    if !(1..=MAX_CHANNELS).contains(&channels) {
        return Err(ConfigError::invalid_field(
            KIND,
            "size",
            format!("expected 1 to {MAX_CHANNELS}, got {channels}"),
        ));
    }

    let mut ins: Vec<InSpec> = (0..channels)
        .map(|c| InSpec::new(format!("in{c}"), 0.0))
        .collect();
    ins.extend((0..channels).map(|c| InSpec::new(format!("level{c}"), 1.0)));
    ins.push(InSpec::new("master", 1.0));

    Unit::build(
        KIND,
        config,
        ins,
        vec![OutSpec::new("out", 0)],
        Mix { channels },
    )
}
