//! Module inputs/outputs command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use patchcord_core::{InMode, ModuleConfig};
use patchcord_registry::global;
use serde::Serialize;

#[derive(Args)]
pub struct InfoArgs {
    /// Module id, as shown by `patchcord list`
    #[arg(value_name = "MODULE")]
    module: String,

    /// Config field for the inspected instance (e.g. "taps=3")
    #[arg(long, value_parser = super::common::parse_key_val, number_of_values = 1)]
    set: Vec<(String, String)>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    inputs: Vec<InputRow>,
    outputs: Vec<String>,
}

#[derive(Serialize)]
struct InputRow {
    name: String,
    default: String,
    sink: bool,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let registry = global();
    let descriptor = registry.get(&args.module).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown module: {} (see 'patchcord list')",
            args.module
        )
    })?;
    let config = super::common::load_config(None, ModuleConfig::default().sample_rate, &args.set)?;
    let module = registry.create(descriptor.id, &config)?;

    let report = Report {
        id: descriptor.id,
        name: descriptor.name,
        description: descriptor.description,
        inputs: module
            .inputs()
            .into_iter()
            .map(|input| InputRow {
                name: input.name,
                default: input.default.to_string(),
                sink: input.mode == InMode::ForceSink,
            })
            .collect(),
        outputs: module.outputs().into_iter().map(|o| o.name).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let title = format!("{} ({})", report.name, report.id);
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("{}", report.description);
    println!();

    println!("Inputs:");
    println!();
    println!("  {:14}  {:12}  {}", "Name", "Default", "Mode");
    println!("  {:14}  {:12}  {}", "----", "-------", "----");
    for input in &report.inputs {
        let mode = if input.sink { "sink" } else { "pull" };
        println!("  {:14}  {:12}  {}", input.name, input.default, mode);
    }

    println!();
    println!("Outputs:");
    println!();
    for output in &report.outputs {
        println!("  {output}");
    }

    println!();
    println!("Example usage:");
    println!();
    if let Some(first) = report.outputs.first() {
        println!(
            "  patchcord render {} out.wav --output {} --duration 2",
            report.id, first
        );
    }
    Ok(())
}
