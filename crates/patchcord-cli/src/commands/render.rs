//! Offline rendering command.
//!
//! Mounts one module in a rack, wires its inputs from literals, listens to
//! one of its outputs and writes the result to a mono WAV file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use hound::{SampleFormat, WavSpec, WavWriter};
use indicatif::{ProgressBar, ProgressStyle};
use patchcord_core::{FRAME_SIZE, Rack, Source, new_frame};
use patchcord_registry::global;

use super::common::{load_config, parse_key_val};

#[derive(Args)]
pub struct RenderArgs {
    /// Module id, as shown by `patchcord list`
    #[arg(value_name = "MODULE")]
    module: String,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Module output to render (default: the module's first output)
    #[arg(long = "port")]
    port: Option<String>,

    /// Patch an input from a literal (e.g. "pitch=C3", "time=250ms")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    patch: Vec<(String, String)>,

    /// Config field (e.g. "poles=4", "steps=0,3,7")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    set: Vec<(String, String)>,

    /// Config file (TOML table of fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Duration in seconds
    #[arg(long, default_value = "1.0")]
    duration: f32,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Unsupported bit depth: {} (use 16, 24 or 32)", args.bit_depth);
    }
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("Duration must be positive, got {}", args.duration);
    }

    let sample_rate = args.sample_rate as f32;
    let config = load_config(args.config.as_deref(), sample_rate, &args.set)?;
    let rack = Rack::new(sample_rate);
    let module = global()
        .create(&args.module, &config)
        .with_context(|| format!("creating module '{}'", args.module))?;
    let outputs = module.outputs();
    let id = rack.add(module);

    for (input, literal) in &args.patch {
        let source = Source::parse(literal)?;
        rack.patch(&id, input, source)
            .with_context(|| format!("patching {input}={literal}"))?;
    }

    let port = match &args.port {
        Some(port) => port.clone(),
        None => outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| anyhow::anyhow!("Module '{}' has no outputs", args.module))?,
    };
    rack.listen(rack.port(&id, &port)?.into())?;

    let total = (args.duration * sample_rate).round() as usize;
    println!(
        "Rendering {}.{} for {:.2}s at {} Hz...",
        args.module, port, args.duration, args.sample_rate
    );
    tracing::info!(module = %id, port = %port, samples = total, "render");

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut samples = Vec::with_capacity(total + FRAME_SIZE);
    let mut frame = new_frame();
    while samples.len() < total {
        rack.fill(&mut frame);
        samples.extend_from_slice(&frame[..]);
        pb.set_position(samples.len().min(total) as u64);
    }
    samples.truncate(total);
    pb.finish_with_message("done");

    write_wav(&args.output, &samples, args.sample_rate, args.bit_depth)?;

    println!("Wrote {}", args.output.display());
    println!("  Peak: {:.4}", peak(&samples));
    println!("  RMS:  {:.4}", rms(&samples));
    Ok(())
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, bits: u16) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: bits,
        sample_format: if bits == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;

    if bits == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits - 1)) as f32;
        for &sample in samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}
