//! Trigger-driven attack/hold/decay envelope.
//!
//! A rising trigger starts the attack from the current level. The hold is
//! counted in samples, so patch it as `Ms` like the other times.

use patchcord_core::{
    Ahd as Envelope, AhdInput, ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module,
    ModuleConfig, OutSpec, Taps, Unit,
};

const KIND: &str = "ahd";

const TRIGGER: usize = 0;
const ATTACK: usize = 1;
const HOLD: usize = 2;
const DECAY: usize = 3;
const RATIO: usize = 4;

struct Ahd {
    env: Envelope,
}

impl Kernel for Ahd {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let out = self.env.tick(AhdInput {
                trigger: ins[TRIGGER][i],
                attack: ins[ATTACK][i],
                hold: ins[HOLD][i],
                decay: ins[DECAY][i],
                ratio: ins[RATIO][i],
            });
            taps[0][i] = out.out;
            taps[1][i] = out.end_gate();
        }
    }
}

/// Builds an AHD envelope.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("trigger", 0.0),
            InSpec::new("attack", Literal::Ms(5.0)),
            InSpec::new("hold", Literal::Ms(50.0)),
            InSpec::new("decay", Literal::Ms(200.0)),
            InSpec::new("ratio", 0.1),
        ],
        vec![OutSpec::new("out", 0), OutSpec::new("end-cycle", 1)],
        Ahd {
            env: Envelope::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcord_core::{Processor, Source, new_frame};

    #[test]
    fn end_cycle_pulses_once_per_trigger() {
        let ahd = new(&ModuleConfig::new(48000.0)).unwrap();
        ahd.patch("trigger", Source::Value(1.0)).unwrap();
        let mut end = ahd.output("end-cycle").unwrap();
        let mut frame = new_frame();
        let mut pulses = 0;
        // 300 ms
        for _ in 0..57 {
            end.process(&mut frame);
            pulses += frame.iter().filter(|&&s| s > 0.0).count();
        }
        assert_eq!(pulses, 1);
    }
}
