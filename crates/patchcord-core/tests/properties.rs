//! Property-based tests for the patchcord graph and delay primitives.
//!
//! Randomized rewiring must always be undone by `reset`, and delay lines must
//! return exactly what was written, exactly on time.

use patchcord_core::{
    DelayLine, FRAME_SIZE, InSpec, Inputs, Kernel, Literal, Module, ModuleConfig, OutSpec,
    Source, Taps, Unit, new_frame,
};
use proptest::prelude::*;

const SAMPLE_RATE: f32 = 48000.0;

/// Copies input `n` to tap `n`.
struct Through(usize);

impl Kernel for Through {
    fn taps(&self) -> usize {
        self.0
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for n in 0..self.0 {
            taps[n].copy_from_slice(&ins[n][..]);
        }
    }
}

fn through(defaults: &[Literal]) -> Module {
    let ins = defaults
        .iter()
        .enumerate()
        .map(|(n, d)| InSpec::new(format!("in{n}"), d.clone()))
        .collect();
    let outs = (0..defaults.len())
        .map(|n| OutSpec::new(format!("out{n}"), n))
        .collect();
    Unit::build(
        "through",
        &ModuleConfig::new(SAMPLE_RATE),
        ins,
        outs,
        Through(defaults.len()),
    )
    .unwrap()
}

fn defaults() -> Vec<Literal> {
    vec![
        Literal::Value(0.0),
        Literal::Hz(440.0),
        Literal::Ms(10.0),
        Literal::Pitch("C3".into()),
    ]
}

/// One rewiring step: which input, and what to wire it to.
#[derive(Debug, Clone)]
enum Wire {
    Value(usize, f32),
    Hz(usize, f32),
    Bpm(usize, f32),
    Port(usize, usize),
    Unpatch(usize),
}

fn wire() -> impl Strategy<Value = Wire> {
    prop_oneof![
        (0usize..4, -10.0f32..10.0).prop_map(|(i, v)| Wire::Value(i, v)),
        (0usize..4, 1.0f32..20000.0).prop_map(|(i, v)| Wire::Hz(i, v)),
        (0usize..4, 20.0f32..300.0).prop_map(|(i, v)| Wire::Bpm(i, v)),
        (0usize..4, 0usize..4).prop_map(|(i, o)| Wire::Port(i, o)),
        (0usize..4).prop_map(Wire::Unpatch),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever was patched in between, `reset` puts every input back on its
    /// construction default.
    #[test]
    fn reset_restores_defaults(wires in prop::collection::vec(wire(), 0..24)) {
        let target = through(&defaults());
        let upstream = through(&defaults());
        let initial = target.inputs();

        for w in wires {
            let input = |i: usize| format!("in{i}");
            // claim conflicts are expected and leave the wiring unchanged
            let _ = match w {
                Wire::Value(i, v) => target.patch(&input(i), Source::Value(v)),
                Wire::Hz(i, v) => target.patch(&input(i), Source::Hz(v)),
                Wire::Bpm(i, v) => target.patch(&input(i), Source::Bpm(v)),
                Wire::Port(i, o) => target.patch(
                    &input(i),
                    patchcord_core::Port::new(&upstream, format!("out{o}")).into(),
                ),
                Wire::Unpatch(i) => target.unpatch(&input(i)),
            };
        }

        target.reset();
        let after = target.inputs();
        for (now, before) in after.iter().zip(&initial) {
            prop_assert_eq!(&now.source, &before.default);
            prop_assert_eq!(&now.source, &before.source);
        }
        // every upstream claim was released
        prop_assert!(upstream.outputs().iter().all(|o| !o.active));
    }

    /// A value written into a line of duration `d` comes back on the `d`-th
    /// following tick, and the ticks before it return what was there before.
    #[test]
    fn delay_round_trip(
        duration in 1usize..512,
        prefix in prop::collection::vec(-1.0f32..1.0, 0..64),
        value in -1.0f32..1.0,
    ) {
        let mut line = DelayLine::new(512);
        let d = duration as f32;
        for &p in &prefix {
            line.tick(p, d);
        }
        line.tick(value, d);

        let mut out = Vec::with_capacity(duration);
        for _ in 0..duration {
            out.push(line.tick(0.0, d));
        }
        prop_assert_eq!(out[duration - 1], value);

        // earlier reads return the prefix, or silence where nothing was written
        for (k, &sample) in out[..duration - 1].iter().enumerate() {
            let back = prefix.len() as isize + 1 - duration as isize + k as isize;
            let expected = if back >= 0 { prefix[back as usize] } else { 0.0 };
            prop_assert_eq!(sample, expected);
        }
    }

    /// A pulled frame of a constant-wired input is that constant everywhere.
    #[test]
    fn constants_fill_whole_frames(v in -1000.0f32..1000.0) {
        let module = through(&[Literal::Value(0.0)]);
        module.patch("in0", Source::Value(v)).unwrap();
        let mut reader = module.output("out0").unwrap();
        let mut frame = new_frame();
        patchcord_core::Processor::process(&mut reader, &mut frame);
        prop_assert!(frame[..FRAME_SIZE].iter().all(|&s| s == v));
    }
}
