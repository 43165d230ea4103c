//! Feedback delay with an external send/return loop.
//!
//! `send` carries the delayed signal out of the module; whatever comes back
//! on `return` is written into the line alongside the input and the internal
//! feedback. `return` is force-sinking, so the loop may run through any
//! chain of modules, this one included, at the cost of one block of latency.
//!
//! ```text
//! delayed = line[time]
//! line   <- in + feedback * delayed + return
//! out     = in + mix * (delayed - in)
//! ```

use patchcord_core::{
    ConfigError, DelayLine, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module, ModuleConfig,
    OutSpec, Taps, Unit, flush_denormal, lerp,
};

use crate::max_delay;

const KIND: &str = "delay";

const IN: usize = 0;
const TIME: usize = 1;
const FEEDBACK: usize = 2;
const MIX: usize = 3;
const RETURN: usize = 4;

struct Delay {
    line: DelayLine,
}

impl Kernel for Delay {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let input = ins[IN][i];
            let time = ins[TIME][i];
            let feedback = ins[FEEDBACK][i].clamp(-0.999, 0.999);

            let delayed = self.line.peek(time);
            let write = flush_denormal(input + feedback * delayed + ins[RETURN][i]);
            self.line.tick(write, time);

            taps[0][i] = lerp(input, delayed, ins[MIX][i]);
            taps[1][i] = delayed;
        }
    }
}

/// Builds a delay. Config: `max`, the longest delay in ms (default 2000).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let capacity = max_delay(config, KIND, 2000.0)?;
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("in", 0.0),
            InSpec::new("time", Literal::Ms(250.0)),
            InSpec::new("feedback", 0.3),
            InSpec::new("mix", 0.5),
            InSpec::sink("return", 0.0),
        ],
        vec![OutSpec::new("out", 0), OutSpec::new("send", 1)],
        Delay {
            line: DelayLine::new(capacity),
        },
    )
}
