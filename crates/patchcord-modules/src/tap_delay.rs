//! Multi-tap delay.
//!
//! `taps` delay lines run in series, each `time` long, and every stage is an
//! output: `tap0` is the input delayed by `time`, `tap1` by twice that, and
//! so on.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module, ModuleConfig, OutSpec, Taps,
    TappedDelay, Unit,
};

use crate::max_delay;

const KIND: &str = "tap-delay";

/// Upper bound on the `taps` field.
pub const MAX_TAPS: usize = 16;

const IN: usize = 0;
const TIME: usize = 1;

struct TapDelay {
    delay: TappedDelay,
}

impl Kernel for TapDelay {
    fn taps(&self) -> usize {
        self.delay.len()
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let time = ins[TIME][i];
            let out = self.delay.tick(ins[IN][i], &[time]);
            for (t, &sample) in out.iter().enumerate() {
                taps[t][i] = sample;
            }
        }
    }
}

/// Builds a tap delay. Config: `taps` (1 to 16, default 4) and `max`, the
/// longest per-stage delay in ms (default 500).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let count = config.count(KIND, "taps", 4)?;
    if !(1..=MAX_TAPS).contains(&count) {
        return Err(ConfigError::invalid_field(
            KIND,
            "taps",
            format!("expected 1 to {MAX_TAPS}, got {count}"),
        ));
    }
    let capacity = max_delay(config, KIND, 500.0)?;

    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("in", 0.0),
            InSpec::new("time", Literal::Ms(100.0)),
        ],
        (0..count)
            .map(|t| OutSpec::new(format!("tap{t}"), t))
            .collect(),
        TapDelay {
            delay: TappedDelay::new(count, capacity),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcord_core::{Processor, Source, new_frame};

    #[test]
    fn taps_are_spaced_by_time() {
        let delay = new(&ModuleConfig::new(48000.0).with("taps", 3.0)).unwrap();
        assert_eq!(delay.outputs().len(), 3);
        delay.patch("time", Source::Value(10.0)).unwrap();
        delay.patch("in", Source::Value(1.0)).unwrap();

        let mut readers: Vec<_> = (0..3)
            .map(|t| delay.output(&format!("tap{t}")).unwrap())
            .collect();
        let mut frame = new_frame();
        for (t, reader) in readers.iter_mut().enumerate() {
            reader.process(&mut frame);
            let first = frame.iter().position(|&s| s == 1.0).unwrap();
            assert_eq!(first, 10 * (t + 1));
        }
    }

    #[test]
    fn tap_count_is_bounded() {
        let config = ModuleConfig::new(48000.0).with("taps", 0.0);
        assert!(new(&config).is_err());
        let config = ModuleConfig::new(48000.0).with("taps", 17.0);
        assert!(new(&config).is_err());
    }
}
