//! Integration tests for the module catalog.
//!
//! Wires catalog modules together in a rack and checks the patches a user
//! would build: a filtered voice, a sequenced envelope, a delay whose
//! send/return loop runs through another module.

use patchcord_core::{ConfigError, FRAME_SIZE, Module, ModuleConfig, Rack, Source, new_frame};
use patchcord_modules::{adsr, clock, delay, filter, gate_seq, mix, mult, noise, osc, reverb};

const SAMPLE_RATE: f32 = 48000.0;

fn config() -> ModuleConfig {
    ModuleConfig::new(SAMPLE_RATE)
}

fn render(rack: &Rack, blocks: usize) -> Vec<f32> {
    let mut frame = new_frame();
    let mut out = Vec::with_capacity(blocks * FRAME_SIZE);
    for _ in 0..blocks {
        rack.fill(&mut frame);
        out.extend_from_slice(&frame[..]);
    }
    out
}

#[test]
fn filtered_saw_voice() {
    let rack = Rack::new(SAMPLE_RATE);
    let osc = rack.add(osc::new(&config()).unwrap());
    let lp = rack.add(filter::new(&config()).unwrap());
    rack.patch(&osc, "pitch", Source::parse("110hz").unwrap()).unwrap();
    rack.patch(&lp, "in", rack.port(&osc, "saw").unwrap().into()).unwrap();
    rack.patch(&lp, "cutoff", Source::Hz(800.0)).unwrap();
    rack.listen(rack.port(&lp, "lp").unwrap().into()).unwrap();

    let out = render(&rack, 40);
    assert!(out.iter().all(|s| s.is_finite()));
    let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.1 && peak < 2.0, "peak {peak}");
}

#[test]
fn sequenced_envelope_opens_on_active_steps() {
    let rack = Rack::new(SAMPLE_RATE);
    let clock = rack.add(clock::new(&config()).unwrap());
    let seq = rack.add(gate_seq::new(&config().with("steps", vec![1.0, 0.0])).unwrap());
    let env = rack.add(adsr::new(&config()).unwrap());

    // a beat every 200 samples
    rack.patch(&clock, "tempo", Source::Value(1.0 / 200.0)).unwrap();
    rack.patch(&seq, "clock", rack.port(&clock, "out").unwrap().into()).unwrap();
    rack.patch(&env, "gate", rack.port(&seq, "on").unwrap().into()).unwrap();
    for (input, value) in [("attack", 10.0), ("decay", 10.0), ("release", 10.0)] {
        rack.patch(&env, input, Source::Value(value)).unwrap();
    }
    rack.patch(&env, "sustain", Source::Value(0.5)).unwrap();
    rack.listen(rack.port(&env, "out").unwrap().into()).unwrap();

    let out = render(&rack, 4);
    // first beat is active, second inactive
    assert!(out[..100].iter().any(|&s| s > 0.9));
    assert_eq!(out[150], 0.0);
    assert_eq!(out[300], 0.0);
    assert!(out[400..500].iter().any(|&s| s > 0.9));
}

#[test]
fn delay_loop_through_another_module() {
    let rack = Rack::new(SAMPLE_RATE);
    let delay = rack.add(delay::new(&config()).unwrap());
    let half = rack.add(mult::new(&config()).unwrap());

    rack.patch(&delay, "in", Source::Value(1.0)).unwrap();
    rack.patch(&delay, "time", Source::Value(64.0)).unwrap();
    rack.patch(&delay, "feedback", Source::Value(0.0)).unwrap();
    rack.patch(&delay, "mix", Source::Value(1.0)).unwrap();
    rack.patch(&half, "a", rack.port(&delay, "send").unwrap().into()).unwrap();
    rack.patch(&half, "b", Source::Value(0.5)).unwrap();
    rack.patch(&delay, "return", rack.port(&half, "out").unwrap().into()).unwrap();
    rack.listen(rack.port(&delay, "out").unwrap().into()).unwrap();

    let out = render(&rack, 2);
    assert_eq!(out[63], 0.0);
    assert_eq!(out[64], 1.0);
    // the return arrives one block late, then travels through the line
    assert_eq!(out[FRAME_SIZE + 127], 1.0);
    assert_eq!(out[FRAME_SIZE + 128], 1.5);
}

#[test]
fn mixer_sums_noise_and_reverb_stays_bounded() {
    let rack = Rack::new(SAMPLE_RATE);
    let noise = rack.add(noise::new(&config()).unwrap());
    let verb = rack.add(reverb::new(&config()).unwrap());
    let mixer = rack.add(mix::new(&config().with("size", 2.0)).unwrap());

    rack.patch(&noise, "amp", Source::Value(0.5)).unwrap();
    rack.patch(&verb, "in", rack.port(&noise, "pink").unwrap().into()).unwrap();
    rack.patch(&mixer, "in0", rack.port(&verb, "a").unwrap().into()).unwrap();
    rack.patch(&mixer, "in1", rack.port(&verb, "b").unwrap().into()).unwrap();
    rack.patch(&mixer, "master", Source::Value(0.5)).unwrap();
    rack.listen(rack.port(&mixer, "out").unwrap().into()).unwrap();

    let out = render(&rack, 200);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() < 4.0));
    assert!(out.iter().any(|&s| s != 0.0));
}

#[test]
fn module_reset_restores_default_wiring() {
    let rack = Rack::new(SAMPLE_RATE);
    let osc = rack.add(osc::new(&config()).unwrap());
    rack.patch(&osc, "amp", Source::Value(0.0)).unwrap();
    rack.listen(rack.port(&osc, "sine").unwrap().into()).unwrap();
    assert!(render(&rack, 1).iter().all(|&s| s == 0.0));

    rack.reset(&osc).unwrap();
    let amp = rack
        .get(&osc)
        .unwrap()
        .inputs()
        .into_iter()
        .find(|i| i.name == "amp")
        .unwrap();
    assert_eq!(amp.source, amp.default);

    // the reset revoked the root's port
    rack.listen(rack.port(&osc, "sine").unwrap().into()).unwrap();
    assert!(render(&rack, 1).iter().any(|&s| s != 0.0));
}

type Factory = fn(&ModuleConfig) -> Result<Module, ConfigError>;

const EXTREMES: [f32; 5] = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 1e9, -1e9];

/// Mounts a module with white noise on `feed`, patches `value` into
/// `param` and renders `output`.
fn render_with(
    factory: Factory,
    feed: Option<&str>,
    param: &str,
    value: f32,
    output: &str,
) -> Vec<f32> {
    let rack = Rack::new(SAMPLE_RATE);
    let module = rack.add(factory(&config()).unwrap());
    if let Some(feed) = feed {
        let noise = rack.add(noise::new(&config()).unwrap());
        let white = rack.port(&noise, "white").unwrap();
        rack.patch(&module, feed, white.into()).unwrap();
    }
    rack.patch(&module, param, Source::Value(value)).unwrap();
    rack.listen(rack.port(&module, output).unwrap().into()).unwrap();
    render(&rack, 8)
}

#[test]
fn extreme_parameters_still_produce_finite_blocks() {
    let cases: [(&str, Factory, Option<&str>, &str, &str); 11] = [
        ("clock", clock::new, None, "tempo", "out"),
        ("clock", clock::new, None, "pulse-width", "div4"),
        ("delay", delay::new, Some("in"), "time", "out"),
        ("delay", delay::new, Some("in"), "time", "send"),
        ("filter", filter::new, Some("in"), "cutoff", "lp"),
        ("filter", filter::new, Some("in"), "resonance", "bp"),
        ("adsr", adsr::new, Some("gate"), "attack", "out"),
        ("adsr", adsr::new, Some("gate"), "decay", "out"),
        ("adsr", adsr::new, Some("gate"), "sustain", "out"),
        ("adsr", adsr::new, Some("gate"), "release", "out"),
        ("adsr", adsr::new, Some("gate"), "ratio", "out"),
    ];
    for (name, factory, feed, param, output) in cases {
        for value in EXTREMES {
            let out = render_with(factory, feed, param, value, output);
            assert_eq!(out.len(), 8 * FRAME_SIZE);
            assert!(
                out.iter().all(|s| s.is_finite()),
                "{name}.{param} = {value} produced a non-finite sample on {output}"
            );
        }
    }
}
