//! Multimode state-variable filter.
//!
//! `cutoff` is in cycles per sample (patch `Hz`), `resonance` is `1` for a
//! flat response and rises towards self-oscillation. All three responses are
//! computed every step from independent state, so any combination of `lp`,
//! `bp` and `hp` can be patched at once.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module, ModuleConfig, OutSpec, Svf,
    SvfMode, Taps, Unit, svf::MAX_STAGES,
};

const KIND: &str = "filter";

const IN: usize = 0;
const CUTOFF: usize = 1;
const RESONANCE: usize = 2;

struct Filter {
    svf: Svf,
}

impl Kernel for Filter {
    fn taps(&self) -> usize {
        3
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let out = self.svf.tick_all(ins[IN][i], ins[CUTOFF][i], ins[RESONANCE][i]);
            taps[0][i] = out.low;
            taps[1][i] = out.band;
            taps[2][i] = out.high;
        }
    }
}

/// Builds a filter. Config: `poles`, an even slope order from 2 to 8
/// (default 2); every two poles add a cascaded stage.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let poles = config.count(KIND, "poles", 2)?;
    if poles == 0 || poles % 2 != 0 || poles / 2 > MAX_STAGES {
        return Err(ConfigError::invalid_field(
            KIND,
            "poles",
            format!("expected 2, 4, 6 or 8, got {poles}"),
        ));
    }

    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("in", 0.0),
            InSpec::new("cutoff", Literal::Hz(1000.0)),
            InSpec::new("resonance", 1.0),
        ],
        vec![
            OutSpec::new("lp", 0),
            OutSpec::new("bp", 1),
            OutSpec::new("hp", 2),
        ],
        Filter {
            svf: Svf::new(poles / 2, SvfMode::Lowpass),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcord_core::{Processor, Source, new_frame};

    #[test]
    fn dc_passes_lowpass_and_not_highpass() {
        let filter = new(&ModuleConfig::new(48000.0).with("poles", 4.0)).unwrap();
        filter.patch("in", Source::Value(1.0)).unwrap();
        let mut lp = filter.output("lp").unwrap();
        let mut hp = filter.output("hp").unwrap();
        let (mut low, mut high) = (new_frame(), new_frame());
        for _ in 0..20 {
            lp.process(&mut low);
            hp.process(&mut high);
        }
        assert!((low[FRAME_SIZE - 1] - 1.0).abs() < 1e-3);
        assert!(high[FRAME_SIZE - 1].abs() < 1e-3);
    }

    #[test]
    fn odd_poles_are_rejected() {
        for poles in [0.0, 3.0, 10.0] {
            let config = ModuleConfig::new(48000.0).with("poles", poles);
            assert!(matches!(new(&config), Err(ConfigError::InvalidField { .. })));
        }
    }
}
