//! Tempo clock with divided outputs.
//!
//! The phase advances by `tempo` beats per sample (patch `Bpm`). `out` is
//! high for the first `pulse-width` of every beat, `div2` and `div4` for the
//! same fraction of every second and fourth beat. While `run` is low the
//! clock stops with every output low; a rising `run` restarts it on beat one.

use patchcord_core::{
    ConfigError, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Metronome, MetronomeInput, Module,
    ModuleConfig, OutSpec, Taps, Unit,
};

use crate::gate;

const KIND: &str = "clock";

const TEMPO: usize = 0;
const PULSE_WIDTH: usize = 1;
const RUN: usize = 2;

struct Clock {
    metronome: Metronome,
}

impl Kernel for Clock {
    fn taps(&self) -> usize {
        3
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            let out = self.metronome.tick(MetronomeInput {
                tempo: ins[TEMPO][i],
                width: ins[PULSE_WIDTH][i],
                run: ins[RUN][i],
            });
            taps[0][i] = gate(out.beat);
            taps[1][i] = gate(out.half);
            taps[2][i] = gate(out.quarter);
        }
    }
}

/// Builds a clock running at 120 BPM.
pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError> {
    Unit::build(
        KIND,
        config,
        vec![
            InSpec::new("tempo", Literal::Bpm(120.0)),
            InSpec::new("pulse-width", 0.5),
            InSpec::new("run", 1.0),
        ],
        vec![
            OutSpec::new("out", 0),
            OutSpec::new("div2", 1),
            OutSpec::new("div4", 2),
        ],
        Clock {
            metronome: Metronome::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcord_core::{Processor, Source, new_frame};

    fn rising(signal: &[f32]) -> usize {
        signal.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count()
    }

    /// Pulls `blocks` blocks of every output with `tempo` patched in.
    fn render(tempo: Source, blocks: usize) -> [Vec<f32>; 3] {
        let clock = new(&ModuleConfig::new(48000.0)).unwrap();
        clock.patch("tempo", tempo).unwrap();
        let mut readers = ["out", "div2", "div4"].map(|name| clock.output(name).unwrap());
        let mut signals: [Vec<f32>; 3] = Default::default();
        let mut frame = new_frame();
        for _ in 0..blocks {
            for (reader, signal) in readers.iter_mut().zip(signals.iter_mut()) {
                reader.process(&mut frame);
                signal.extend_from_slice(&frame[..]);
            }
        }
        signals
    }

    #[test]
    fn divisions_halve_the_rate() {
        // 0.02 beats per sample over 800 samples is 16 beats
        let [out, div2, div4] = render(Source::Value(0.02), 4);
        let out = &out[..800];
        let (div2, div4) = (&div2[..800], &div4[..800]);
        // the first edge is at sample 0
        assert_eq!(rising(out), 15);
        assert_eq!(rising(div2), 7);
        assert_eq!(rising(div4), 3);
    }

    #[test]
    fn bpm_literal_sets_the_beat_length() {
        // 120 BPM at 48 kHz is one beat every 24000 samples
        let [out, ..] = render(Source::Bpm(120.0), 150);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[12100], 0.0);
        assert_eq!(rising(&out[..36000]), 1);
    }

    #[test]
    fn low_run_stops_every_output() {
        let clock = new(&ModuleConfig::new(48000.0)).unwrap();
        clock.patch("run", Source::Value(0.0)).unwrap();
        let mut out = clock.output("out").unwrap();
        let mut frame = new_frame();
        out.process(&mut frame);
        assert!(frame.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn extreme_tempo_still_returns_a_block() {
        for tempo in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 1e9, -1e9] {
            let [out, div2, div4] = render(Source::Value(tempo), 2);
            for signal in [&out, &div2, &div4] {
                assert!(
                    signal.iter().all(|&s| s == 0.0 || s == 1.0),
                    "tempo {tempo}"
                );
            }
        }
    }
}
