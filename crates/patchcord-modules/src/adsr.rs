//! Gate-driven ADSR envelope.
//!
//! Times are in samples (patch `Ms`). `end-cycle` pulses for one sample
//! after a release completes. With the `disable-sustain` config flag the
//! envelope is a one-shot: the rising gate starts it and it releases as soon
//! as the decay reaches the sustain level.

use patchcord_core::{
    Adsr as Envelope, AdsrInput, ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module,
    ModuleConfig, OutSpec, Taps, Unit,
};

const KIND: &str = "adsr";

const GATE: usize = 0;
const ATTACK: usize = 1;
const DECAY: usize = 2;
const SUSTAIN: usize = 3;
const RELEASE: usize = 4;
const RATIO: usize = 5;

struct Adsr {
    env: Envelope,
}

impl Kernel for Adsr {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let out = self.env.tick(AdsrInput {
                gate: ins[GATE][i],
                attack: ins[ATTACK][i],
                decay: ins[DECAY][i],
                sustain: ins[SUSTAIN][i],
                release: ins[RELEASE][i],
                ratio: ins[RATIO][i],
            });
            taps[0][i] = out.out;
            taps[1][i] = out.end_gate();
        }
    }
}

/// Builds an ADSR. Config: `disable-sustain` (bool, default `false`).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let disable_sustain = config.flag(KIND, "disable-sustain", false)?;
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("gate", 0.0),
            InSpec::new("attack", Literal::Ms(10.0)),
            InSpec::new("decay", Literal::Ms(100.0)),
            InSpec::new("sustain", 0.7),
            InSpec::new("release", Literal::Ms(200.0)),
            InSpec::new("ratio", 0.1),
        ],
        vec![OutSpec::new("out", 0), OutSpec::new("end-cycle", 1)],
        Adsr {
            env: Envelope::new(disable_sustain),
        },
    )
}
