//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use patchcord_core::{ConfigValue, ModuleConfig};

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        )),
    }
}

/// Reads a command-line config value: `true`/`false`, a number, a
/// comma-separated list of numbers, or else text.
pub fn parse_config_value(s: &str) -> ConfigValue {
    let trimmed = s.trim();
    match trimmed {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return ConfigValue::Number(n);
    }
    if trimmed.contains(',') {
        let items: Result<Vec<f64>, _> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::parse)
            .collect();
        if let Ok(items) = items {
            return ConfigValue::List(items);
        }
    }
    ConfigValue::Text(s.to_string())
}

/// Builds a module config from an optional TOML file plus `--set` overrides.
///
/// The file is a flat table of fields; a `sample_rate` key in it is
/// overridden by `sample_rate`.
pub fn load_config(
    file: Option<&Path>,
    sample_rate: f32,
    sets: &[(String, String)],
) -> anyhow::Result<ModuleConfig> {
    let mut config = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str::<ModuleConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ModuleConfig::default(),
    };
    config.sample_rate = sample_rate;
    for (key, value) in sets {
        config.set(key.clone(), parse_config_value(value));
    }
    Ok(config)
}
