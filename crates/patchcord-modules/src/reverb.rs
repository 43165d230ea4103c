//! Stereo algorithmic reverb.
//!
//! Freeverb topology: eight damped feedback combs in parallel feeding four
//! allpasses in series, once per channel. The `b` channel's delays are
//! offset by a fixed spread so the two outputs decorrelate.
//!
//! - `size` (0-1) scales every delay between half and full length
//! - `decay` (0-1) sets the comb feedback
//! - `damp` (0-1) darkens the tail
//! - `mix` (0-1) blends dry and wet

use patchcord_core::{
    Allpass, Comb, CombKind, ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Module,
    ModuleConfig, OutSpec, Taps, Unit, lerp,
};

const KIND: &str = "reverb";

/// Comb delays in samples at the reference rate, mutually prime.
const COMB_TUNINGS_44K: [f32; 8] = [1116.0, 1188.0, 1277.0, 1356.0, 1422.0, 1491.0, 1557.0, 1617.0];

/// Allpass delays in samples at the reference rate.
const ALLPASS_TUNINGS_44K: [f32; 4] = [556.0, 441.0, 341.0, 225.0];

/// Extra delay of the second channel, in reference samples.
const STEREO_SPREAD: f32 = 23.0;

const REFERENCE_RATE: f32 = 44100.0;
const INPUT_GAIN: f32 = 0.015;
const ALLPASS_GAIN: f32 = 0.5;

const IN: usize = 0;
const SIZE: usize = 1;
const DECAY: usize = 2;
const DAMP: usize = 3;
const MIX: usize = 4;

struct Channel {
    combs: [Comb; 8],
    allpasses: [Allpass; 4],
    comb_times: [f32; 8],
    allpass_times: [f32; 4],
}

impl Channel {
    fn new(scale: f32, spread: f32) -> Self {
        let time = |reference: f32| (reference + spread) * scale;
        let comb_times = COMB_TUNINGS_44K.map(time);
        let allpass_times = ALLPASS_TUNINGS_44K.map(time);
        Self {
            combs: comb_times.map(|t| Comb::new(CombKind::Feedback, libm::ceilf(t) as usize + 1)),
            allpasses: allpass_times.map(|t| Allpass::new(libm::ceilf(t) as usize + 1)),
            comb_times,
            allpass_times,
        }
    }

    #[inline]
    fn tick(&mut self, input: f32, size: f32, feedback: f32) -> f32 {
        let mut wet = 0.0;
        for (comb, &time) in self.combs.iter_mut().zip(&self.comb_times) {
            wet += comb.tick(input, time * size, feedback);
        }
        for (allpass, &time) in self.allpasses.iter_mut().zip(&self.allpass_times) {
            wet = allpass.tick(wet, time * size, ALLPASS_GAIN);
        }
        wet
    }

    fn set_damp(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }
}

struct Reverb {
    a: Channel,
    b: Channel,
    damp: f32,
}

impl Kernel for Reverb {
    fn taps(&self) -> usize {
        2
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let damp = ins[DAMP][i].clamp(0.0, 1.0) * 0.4;
            if damp != self.damp {
                self.damp = damp;
                self.a.set_damp(damp);
                self.b.set_damp(damp);
            }

            let dry = ins[IN][i];
            let size = 0.5 + 0.5 * ins[SIZE][i].clamp(0.0, 1.0);
            let feedback = 0.7 + 0.28 * ins[DECAY][i].clamp(0.0, 1.0);
            let mix = ins[MIX][i].clamp(0.0, 1.0);
            let input = dry * INPUT_GAIN;

            taps[0][i] = lerp(dry, self.a.tick(input, size, feedback), mix);
            taps[1][i] = lerp(dry, self.b.tick(input, size, feedback), mix);
        }
    }
}

/// Builds a reverb tuned for the configured sample rate.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    let scale = config.sample_rate / REFERENCE_RATE;
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("in", 0.0),
            InSpec::new("size", 0.5),
            InSpec::new("decay", 0.5),
            InSpec::new("damp", 0.5),
            InSpec::new("mix", 0.3),
        ],
        vec![OutSpec::new("a", 0), OutSpec::new("b", 1)],
        Reverb {
            a: Channel::new(scale, 0.0),
            b: Channel::new(scale, STEREO_SPREAD),
            damp: -1.0,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcord_core::{Processor, Source, new_frame};

    fn energy(frame: &[f32]) -> f32 {
        frame.iter().map(|s| s * s).sum()
    }

    #[test]
    fn tail_rings_after_input_stops() {
        let reverb = new(&ModuleConfig::new(48000.0)).unwrap();
        reverb.patch("mix", Source::Value(1.0)).unwrap();
        reverb.patch("in", Source::Value(1.0)).unwrap();
        let mut a = reverb.output("a").unwrap();
        let mut frame = new_frame();
        for _ in 0..8 {
            a.process(&mut frame);
        }
        reverb.patch("in", Source::Value(0.0)).unwrap();
        a.process(&mut frame);
        assert!(energy(&frame[..]) > 0.0);
        assert!(frame.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn channels_decorrelate() {
        let reverb = new(&ModuleConfig::new(48000.0)).unwrap();
        reverb.patch("mix", Source::Value(1.0)).unwrap();
        reverb.patch("in", Source::Value(1.0)).unwrap();
        let mut a = reverb.output("a").unwrap();
        let mut b = reverb.output("b").unwrap();
        let (mut left, mut right) = (new_frame(), new_frame());
        for _ in 0..10 {
            a.process(&mut left);
            b.process(&mut right);
        }
        assert_ne!(left[..], right[..]);
    }

    #[test]
    fn dry_mix_passes_input() {
        let reverb = new(&ModuleConfig::new(48000.0)).unwrap();
        reverb.patch("mix", Source::Value(0.0)).unwrap();
        reverb.patch("in", Source::Value(0.25)).unwrap();
        let mut a = reverb.output("a").unwrap();
        let mut frame = new_frame();
        a.process(&mut frame);
        assert!(frame.iter().all(|&s| s == 0.25));
    }
}
