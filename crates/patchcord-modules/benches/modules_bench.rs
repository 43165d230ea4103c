//! Criterion benchmarks for catalog modules.
//!
//! Each module is mounted alone in a rack with its main output on the root,
//! so the numbers include one block of graph overhead.
//!
//! Run with: `cargo bench -p patchcord-modules`
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use patchcord_core::{ConfigError, Module, ModuleConfig, Rack, Source, new_frame};
use patchcord_modules::{adsr, comb, delay, filter, noise, osc, reverb};

const SAMPLE_RATE: f32 = 48000.0;

type Factory = fn(&ModuleConfig) -> Result<Module, ConfigError>;

/// `(name, factory, signal input, output)`
const CASES: &[(&str, Factory, Option<&str>, &str)] = &[
    ("osc", osc::new, None, "saw"),
    ("adsr", adsr::new, Some("gate"), "out"),
    ("filter", filter::new, Some("in"), "lp"),
    ("delay", delay::new, Some("in"), "out"),
    ("comb", comb::new, Some("in"), "out"),
    ("reverb", reverb::new, Some("in"), "a"),
    ("noise", noise::new, None, "pink"),
];

fn bench_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules");
    let config = ModuleConfig::new(SAMPLE_RATE);

    for &(name, factory, input, output) in CASES {
        let rack = Rack::new(SAMPLE_RATE);
        let id = rack.add(factory(&config).unwrap());
        if let Some(input) = input {
            rack.patch(&id, input, Source::Value(0.5)).unwrap();
        }
        rack.listen(rack.port(&id, output).unwrap().into()).unwrap();

        group.bench_function(name, |b| {
            let mut frame = new_frame();
            b.iter(|| {
                rack.fill(&mut frame);
                black_box(&frame);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_modules);
criterion_main!(benches);
