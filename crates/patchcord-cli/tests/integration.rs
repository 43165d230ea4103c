//! Integration tests for patchcord-cli.
//!
//! Runs the built `patchcord` binary: catalog listing, module inspection and
//! offline rendering to WAV.

use std::process::Command;

/// Helper to get the path to the `patchcord` binary built by cargo.
fn patchcord_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_patchcord"))
}

// ---------------------------------------------------------------------------
// `patchcord list`
// ---------------------------------------------------------------------------

#[test]
fn cli_list_shows_every_module() {
    let output = patchcord_bin()
        .arg("list")
        .output()
        .expect("failed to run patchcord list");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available Modules"));
    for module in [
        "osc", "noise", "adsr", "ahd", "shape", "clock", "gate-seq", "step-seq", "filter",
        "delay", "tap-delay", "comb", "allpass", "reverb", "mix", "mult",
    ] {
        assert!(stdout.contains(module), "listing should contain '{module}'");
    }
}

#[test]
fn cli_list_json_is_machine_readable() {
    let output = patchcord_bin()
        .args(["list", "--json"])
        .output()
        .expect("failed to run patchcord list --json");
    assert!(output.status.success());

    let modules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let modules = modules.as_array().unwrap();
    assert_eq!(modules.len(), 16);
    assert!(modules.iter().any(|m| m["id"] == "reverb" && m["category"] == "time-based"));
}

// ---------------------------------------------------------------------------
// `patchcord info`
// ---------------------------------------------------------------------------

#[test]
fn cli_info_shows_ports() {
    let output = patchcord_bin()
        .args(["info", "delay"])
        .output()
        .expect("failed to run patchcord info delay");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Inputs"));
    assert!(stdout.contains("feedback"));
    assert!(stdout.contains("250ms"));
    assert!(stdout.contains("sink"), "return is force-sinking");
    assert!(stdout.contains("send"));
}

#[test]
fn cli_info_applies_config() {
    let output = patchcord_bin()
        .args(["info", "tap-delay", "--set", "taps=3", "--json"])
        .output()
        .expect("failed to run patchcord info tap-delay");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outputs"], serde_json::json!(["tap0", "tap1", "tap2"]));
}

#[test]
fn cli_info_unknown_module_fails() {
    let output = patchcord_bin()
        .args(["info", "theremin"])
        .output()
        .expect("failed to run patchcord");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("theremin"));
}

// ---------------------------------------------------------------------------
// `patchcord render`
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("osc.wav");

    let output = patchcord_bin()
        .args(["render", "osc"])
        .arg(&path)
        .args(["--port", "saw", "--patch", "pitch=220hz", "--patch", "amp=0.5"])
        .args(["--duration", "0.5", "--sample-rate", "44100"])
        .output()
        .expect("failed to run patchcord render");
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(reader.duration(), 22050);

    let samples: Vec<f32> = reader.into_samples::<f32>().map(Result::unwrap).collect();
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.3 && peak < 0.7, "peak {peak}");
}

#[test]
fn cli_render_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("seq.toml");
    std::fs::write(&config, "steps = [1, 1, 0, 1]\n").unwrap();
    let path = dir.path().join("seq.wav");

    let output = patchcord_bin()
        .args(["render", "gate-seq"])
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .args(["--patch", "clock=1", "--bit-depth", "16", "--duration", "0.1"])
        .output()
        .expect("failed to run patchcord render");
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 16);
    // a clock held high plays the first step forever
    let samples: Vec<i32> = reader.into_samples::<i32>().map(Result::unwrap).collect();
    assert!(samples.iter().all(|&s| s == i32::from(i16::MAX)));
}

#[test]
fn cli_render_rejects_bad_patches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.wav");

    let unknown_input = patchcord_bin()
        .args(["render", "osc"])
        .arg(&path)
        .args(["--patch", "warp=1"])
        .output()
        .expect("failed to run patchcord render");
    assert!(!unknown_input.status.success());

    let bad_config = patchcord_bin()
        .args(["render", "filter"])
        .arg(&path)
        .args(["--set", "poles=3"])
        .output()
        .expect("failed to run patchcord render");
    assert!(!bad_config.status.success());
    assert!(String::from_utf8_lossy(&bad_config.stderr).contains("poles"));
}
