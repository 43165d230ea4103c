//! Rise/fall function generator.
//!
//! A rising trigger runs one rise-then-fall cycle; holding `cycle` high
//! loops it, making the module a shapeable LFO whose period is
//! `rise + fall`.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module, ModuleConfig, OutSpec,
    Shape as Generator, ShapeInput, Taps, Unit,
};

const KIND: &str = "shape";

const TRIGGER: usize = 0;
const RISE: usize = 1;
const FALL: usize = 2;
const CYCLE: usize = 3;
const RATIO: usize = 4;

struct Shape {
    shape: Generator,
}

impl Kernel for Shape {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let out = self.shape.tick(ShapeInput {
                trigger: ins[TRIGGER][i],
                rise: ins[RISE][i],
                fall: ins[FALL][i],
                cycle: ins[CYCLE][i],
                ratio: ins[RATIO][i],
            });
            taps[0][i] = out.out;
            taps[1][i] = out.end_gate();
        }
    }
}

/// Builds a function generator.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("trigger", 0.0),
            InSpec::new("rise", Literal::Ms(100.0)),
            InSpec::new("fall", Literal::Ms(100.0)),
            InSpec::new("cycle", 0.0),
            InSpec::new("ratio", 1.0),
        ],
        vec![OutSpec::new("out", 0), OutSpec::new("end-cycle", 1)],
        Shape {
            shape: Generator::new(),
        },
    )
}
