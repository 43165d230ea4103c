//! Flat construction-time configuration handed to module factories.
//!
//! The scripting layer speaks in primitive values only: numbers, strings,
//! booleans and lists of numbers. A [`ModuleConfig`] carries those plus the
//! engine sample rate, and offers typed getters that turn shape mismatches
//! into [`ConfigError::InvalidField`].
//!
//! # Example
//!
//! ```rust
//! use patchcord_core::{ConfigValue, ModuleConfig};
//!
//! let config = ModuleConfig::new(48000.0)
//!     .with("poles", 2.0)
//!     .with("steps", vec![1.0, 0.0, 1.0, 1.0]);
//!
//! assert_eq!(config.number("filter", "poles", 1.0).unwrap(), 2.0);
//! assert_eq!(config.list("gate-seq", "steps").unwrap().unwrap().len(), 4);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default engine sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// One primitive config value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean flag.
    Bool(bool),
    /// Any number.
    Number(f64),
    /// Free text.
    Text(String),
    /// List of numbers.
    List(Vec<f64>),
}

impl ConfigValue {
    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Number(_) => "number",
            ConfigValue::Text(_) => "text",
            ConfigValue::List(_) => "list",
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Number(v)
    }
}

impl From<f32> for ConfigValue {
    fn from(v: f32) -> Self {
        ConfigValue::Number(f64::from(v))
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Text(v)
    }
}

impl From<Vec<f64>> for ConfigValue {
    fn from(v: Vec<f64>) -> Self {
        ConfigValue::List(v)
    }
}

/// Construction-time configuration for one module instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Engine sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,

    /// Module-specific fields.
    #[serde(default, flatten)]
    pub fields: BTreeMap<String, ConfigValue>,
}

fn default_sample_rate() -> f32 {
    DEFAULT_SAMPLE_RATE
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl ModuleConfig {
    /// Creates an empty config at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets a field in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw field lookup.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.fields.get(key)
    }

    /// Reads a number, falling back to `default` when absent.
    pub fn number(&self, module: &str, key: &str, default: f32) -> Result<f32, ConfigError> {
        match self.fields.get(key) {
            None => Ok(default),
            Some(ConfigValue::Number(n)) => Ok(*n as f32),
            Some(other) => Err(mismatch(module, key, "number", other)),
        }
    }

    /// Reads a non-negative integer count, falling back to `default`.
    pub fn count(&self, module: &str, key: &str, default: usize) -> Result<usize, ConfigError> {
        match self.fields.get(key) {
            None => Ok(default),
            Some(ConfigValue::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
            Some(ConfigValue::Number(n)) => Err(ConfigError::invalid_field(
                module,
                key,
                format!("expected a non-negative integer, got {n}"),
            )),
            Some(other) => Err(mismatch(module, key, "number", other)),
        }
    }

    /// Reads a boolean, falling back to `default`.
    pub fn flag(&self, module: &str, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.fields.get(key) {
            None => Ok(default),
            Some(ConfigValue::Bool(b)) => Ok(*b),
            Some(other) => Err(mismatch(module, key, "bool", other)),
        }
    }

    /// Reads text, if present.
    pub fn text(&self, module: &str, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(ConfigValue::Text(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(module, key, "text", other)),
        }
    }

    /// Reads a list of numbers, if present.
    pub fn list(&self, module: &str, key: &str) -> Result<Option<Vec<f32>>, ConfigError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(ConfigValue::List(items)) => Ok(Some(items.iter().map(|&v| v as f32).collect())),
            Some(other) => Err(mismatch(module, key, "list", other)),
        }
    }
}

fn mismatch(module: &str, key: &str, expected: &str, got: &ConfigValue) -> ConfigError {
    ConfigError::invalid_field(
        module,
        key,
        format!("expected {expected}, got {}", got.kind()),
    )
}
