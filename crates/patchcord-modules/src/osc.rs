//! Band-limited multi-waveform oscillator.
//!
//! The phase increment per sample is `pitch * 2^(detune / 12) + fm`, where
//! `pitch` is in cycles per sample (patch `Hz` or a note name) and `fm` is a
//! linear offset in the same unit. Every waveform is computed each step and
//! exposed on its own output, all scaled by `amp`.

use patchcord_core::{
    BlepOscillator, ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module, ModuleConfig,
    OutSpec, Taps, Unit, semitones_to_ratio,
};

const KIND: &str = "osc";

const PITCH: usize = 0;
const DETUNE: usize = 1;
const FM: usize = 2;
const PULSE_WIDTH: usize = 3;
const SYNC: usize = 4;
const AMP: usize = 5;

const SINE: usize = 0;
const SAW: usize = 1;
const PULSE: usize = 2;
const TRIANGLE: usize = 3;
const SUB: usize = 4;

struct Osc {
    osc: BlepOscillator,
    detune: f32,
    ratio: f32,
}

impl Kernel for Osc {
    fn taps(&self) -> usize {
        5
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let detune = ins[DETUNE][i];
            if detune != self.detune {
                self.detune = detune;
                self.ratio = semitones_to_ratio(detune);
            }
            let delta = ins[PITCH][i] * self.ratio + ins[FM][i];
            let out = self.osc.tick(delta, ins[PULSE_WIDTH][i], ins[SYNC][i]);
            let amp = ins[AMP][i];

            taps[SINE][i] = out.sine * amp;
            taps[SAW][i] = out.saw * amp;
            taps[PULSE][i] = out.pulse * amp;
            taps[TRIANGLE][i] = out.triangle * amp;
            taps[SUB][i] = out.sub * amp;
        }
    }
}

/// Builds an oscillator. Pitch defaults to `A4`.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("pitch", Literal::Pitch("A4".into())),
            InSpec::new("detune", 0.0),
            InSpec::new("fm", 0.0),
            InSpec::new("pulse-width", 0.5),
            InSpec::new("sync", 0.0),
            InSpec::new("amp", 1.0),
        ],
        vec![
            OutSpec::new("sine", SINE),
            OutSpec::new("saw", SAW),
            OutSpec::new("pulse", PULSE),
            OutSpec::new("triangle", TRIANGLE),
            OutSpec::new("sub", SUB),
        ],
        Osc {
            osc: BlepOscillator::new(),
            detune: 0.0,
            ratio: 1.0,
        },
    )
}
