//! White and pink noise.
//!
//! White noise comes from a xorshift32 generator. Pink noise filters the
//! same samples through Paul Kellet's economy three-pole filter, accurate to
//! about ±0.5 dB above 9 Hz at 44.1 kHz.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Module, ModuleConfig, OutSpec, Taps, Unit,
    flush_denormal,
};

const KIND: &str = "noise";

const DEFAULT_SEED: u32 = 0x1234_5678;

struct Noise {
    state: u32,
    pink: [f32; 3],
}

impl Noise {
    fn new(seed: u32) -> Self {
        Self {
            // xorshift never leaves zero
            state: if seed == 0 { DEFAULT_SEED } else { seed },
            pink: [0.0; 3],
        }
    }

    #[inline]
    fn white(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as i32 as f32) / (i32::MAX as f32)
    }

    #[inline]
    fn pink(&mut self, white: f32) -> f32 {
        let [b0, b1, b2] = &mut self.pink;
        *b0 = flush_denormal(0.99765 * *b0 + white * 0.0990460);
        *b1 = flush_denormal(0.96300 * *b1 + white * 0.2965164);
        *b2 = flush_denormal(0.57000 * *b2 + white * 1.0526913);
        (*b0 + *b1 + *b2 + white * 0.1848) * 0.25
    }
}

impl Kernel for Noise {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let amp = ins[0][i];
            let white = self.white();
            let pink = self.pink(white);
            taps[0][i] = white * amp;
            taps[1][i] = pink * amp;
        }
    }
}

/// Builds a noise source. Config: `seed` (integer, optional).
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let seed = config.count(KIND, "seed", DEFAULT_SEED as usize)?;
    Unit::build(
        KIND,
        config,
        vec![InSpec::new("amp", 1.0)],
        vec![OutSpec::new("white", 0), OutSpec::new("pink", 1)],
        Noise::new(seed as u32),
    )
}
