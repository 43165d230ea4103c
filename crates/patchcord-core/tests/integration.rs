//! Integration tests for the patchcord signal graph.
//!
//! Builds small racks out of test kernels and checks block-level behavior:
//! signal flow through ports, multi-output synchronization, feedback through
//! force-sinking inputs, rewiring and removal.

use patchcord_core::{
    FRAME_SIZE, InSpec, Inputs, Kernel, Module, ModuleConfig, OutSpec, PatchError, Rack,
    Source, SourceDesc, Taps, Unit, new_frame,
};

const SAMPLE_RATE: f32 = 48000.0;

/// Counts its own steps on every tap.
struct Counter {
    taps: usize,
    steps: f32,
}

impl Kernel for Counter {
    fn taps(&self) -> usize {
        self.taps
    }

    fn process(&mut self, _ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        self.steps += 1.0;
        for t in 0..self.taps {
            taps[t].fill(self.steps);
        }
    }
}

/// Sums its inputs into tap 0.
struct Sum;

impl Kernel for Sum {
    fn taps(&self) -> usize {
        1
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            taps[0][i] = (0..ins.len()).map(|n| ins[n][i]).sum();
        }
    }
}

/// `out = in + 0.5 * fb`, where `fb` is force-sinking. `out` and `send`
/// share the tap.
struct Echo;

impl Kernel for Echo {
    fn taps(&self) -> usize {
        1
    }

    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>) {
        for i in 0..FRAME_SIZE {
            taps[0][i] = ins[0][i] + 0.5 * ins[1][i];
        }
    }
}

fn config() -> ModuleConfig {
    ModuleConfig::new(SAMPLE_RATE)
}

fn counter() -> Module {
    Unit::build(
        "counter",
        &config(),
        vec![],
        vec![OutSpec::new("a", 0), OutSpec::new("b", 1)],
        Counter { taps: 2, steps: 0.0 },
    )
    .unwrap()
}

fn counter3() -> Module {
    Unit::build(
        "counter",
        &config(),
        vec![],
        vec![OutSpec::new("a", 0), OutSpec::new("b", 1), OutSpec::new("c", 2)],
        Counter { taps: 3, steps: 0.0 },
    )
    .unwrap()
}

fn sum() -> Module {
    Unit::build(
        "sum",
        &config(),
        vec![InSpec::new("x", 0.0), InSpec::new("y", 0.0)],
        vec![OutSpec::new("out", 0)],
        Sum,
    )
    .unwrap()
}

fn echo() -> Module {
    Unit::build(
        "echo",
        &config(),
        vec![InSpec::new("in", 0.0), InSpec::sink("fb", 0.0)],
        vec![OutSpec::new("out", 0), OutSpec::new("send", 0)],
        Echo,
    )
    .unwrap()
}

fn block(rack: &Rack) -> f32 {
    let mut frame = new_frame();
    rack.fill(&mut frame);
    assert!(frame.iter().all(|&s| s == frame[0]), "frame is not constant");
    frame[0]
}

#[test]
fn constants_reach_the_root_through_a_module() {
    let rack = Rack::new(SAMPLE_RATE);
    let s = rack.add(sum());
    rack.patch(&s, "x", Source::Value(0.25)).unwrap();
    rack.patch(&s, "y", Source::parse("0.5").unwrap()).unwrap();
    rack.listen(rack.port(&s, "out").unwrap().into()).unwrap();

    assert_eq!(block(&rack), 0.75);
    assert_eq!(
        rack.listening(),
        SourceDesc::Port {
            module: s.clone(),
            output: "out".to_string()
        }
    );
}

#[test]
fn typed_literals_resolve_at_module_rate() {
    let rack = Rack::new(SAMPLE_RATE);
    let s = rack.add(sum());
    rack.patch(&s, "x", Source::Ms(10.0)).unwrap();
    rack.listen(rack.port(&s, "out").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 480.0);
}

#[test]
fn both_outputs_pulled_advance_once_per_block() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter());
    let s = rack.add(sum());
    rack.patch(&s, "x", rack.port(&c, "a").unwrap().into()).unwrap();
    rack.patch(&s, "y", rack.port(&c, "b").unwrap().into()).unwrap();
    rack.listen(rack.port(&s, "out").unwrap().into()).unwrap();

    for n in 1..=10 {
        assert_eq!(block(&rack), 2.0 * n as f32);
    }
}

#[test]
fn one_output_pulled_still_advances_once_per_block() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter());
    let module = rack.get(&c).unwrap();
    // claimed but never pulled
    let _idle = module.output("b").unwrap();
    rack.listen(rack.port(&c, "a").unwrap().into()).unwrap();

    for n in 1..=10 {
        assert_eq!(block(&rack), n as f32);
    }
}

#[test]
fn output_pulled_first_after_a_partial_block_is_current() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter3());
    let ab = rack.add(sum());
    let only_c = rack.add(sum());
    rack.patch(&ab, "x", rack.port(&c, "a").unwrap().into()).unwrap();
    rack.patch(&ab, "y", rack.port(&c, "b").unwrap().into()).unwrap();
    rack.patch(&only_c, "x", rack.port(&c, "c").unwrap().into()).unwrap();

    rack.listen(rack.port(&ab, "out").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 2.0);

    rack.listen(rack.port(&only_c, "out").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 2.0);
    assert_eq!(block(&rack), 3.0);
}

#[test]
fn force_sink_closes_a_feedback_loop_with_one_block_latency() {
    let rack = Rack::new(SAMPLE_RATE);
    let e = rack.add(echo());
    rack.patch(&e, "in", Source::Value(1.0)).unwrap();
    let send = rack.port(&e, "send").unwrap();
    rack.patch(&e, "fb", send.into()).unwrap();
    rack.listen(rack.port(&e, "out").unwrap().into()).unwrap();

    let blocks: Vec<f32> = (0..4).map(|_| block(&rack)).collect();
    assert_eq!(blocks, vec![1.0, 1.5, 1.75, 1.875]);
}

#[test]
fn self_patch_into_normal_input_is_rejected() {
    let rack = Rack::new(SAMPLE_RATE);
    let e = rack.add(echo());
    let err = rack
        .patch(&e, "in", rack.port(&e, "send").unwrap().into())
        .unwrap_err();
    assert!(matches!(err, PatchError::SelfFeedback { .. }));
}

#[test]
fn output_is_claimed_once() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter());
    let s = rack.add(sum());
    rack.patch(&s, "x", rack.port(&c, "a").unwrap().into()).unwrap();
    let err = rack
        .patch(&s, "y", rack.port(&c, "a").unwrap().into())
        .unwrap_err();
    assert!(matches!(err, PatchError::AlreadyPatched { .. }));

    rack.unpatch(&s, "x").unwrap();
    rack.patch(&s, "y", rack.port(&c, "a").unwrap().into()).unwrap();
}

#[test]
fn remove_unpatches_every_consumer() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter());
    let s = rack.add(sum());
    rack.patch(&s, "x", rack.port(&c, "a").unwrap().into()).unwrap();
    rack.patch(&s, "y", Source::Value(3.0)).unwrap();
    rack.listen(rack.port(&s, "out").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 4.0);

    rack.remove(&c).unwrap();
    assert_eq!(block(&rack), 3.0);
    let x = rack
        .get(&s)
        .unwrap()
        .inputs()
        .into_iter()
        .find(|i| i.name == "x")
        .unwrap();
    assert_eq!(x.source, SourceDesc::Constant(0.0));
    assert_eq!(rack.modules(), vec![s]);
}

#[test]
fn removing_the_listened_module_silences_the_root() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter());
    rack.listen(rack.port(&c, "a").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 1.0);
    rack.remove(&c).unwrap();
    assert_eq!(block(&rack), 0.0);
    assert_eq!(rack.listening(), SourceDesc::Constant(0.0));
}

#[test]
fn reset_silences_downstream_until_repatched() {
    let rack = Rack::new(SAMPLE_RATE);
    let c = rack.add(counter());
    let s = rack.add(sum());
    rack.patch(&s, "x", rack.port(&c, "a").unwrap().into()).unwrap();
    rack.listen(rack.port(&s, "out").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 1.0);

    rack.reset(&c).unwrap();
    assert_eq!(block(&rack), 0.0);
    let x = rack.get(&s).unwrap().inputs()[0].source.clone();
    assert_eq!(x, SourceDesc::Constant(0.0));

    rack.patch(&s, "x", rack.port(&c, "a").unwrap().into()).unwrap();
    assert_eq!(block(&rack), 2.0);
    assert!(rack.get(&c).unwrap().outputs()[0].active);
}

#[test]
fn unknown_names_are_errors() {
    let rack = Rack::new(SAMPLE_RATE);
    let s = rack.add(sum());
    assert!(matches!(
        rack.patch("nope", "x", Source::Value(1.0)),
        Err(PatchError::UnknownModule(_))
    ));
    assert!(matches!(
        rack.patch(&s, "z", Source::Value(1.0)),
        Err(PatchError::UnknownInput { .. })
    ));
    assert!(matches!(
        rack.port(&s, "missing"),
        Err(PatchError::UnknownOutput { .. })
    ));
    assert!(matches!(
        rack.patch(&s, "x", Source::Pitch("H9".into())),
        Err(PatchError::Unresolvable(_))
    ));
}
