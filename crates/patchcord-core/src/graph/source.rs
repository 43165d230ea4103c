//! Everything an input can be patched to, and how it becomes a processor.
//!
//! [`Source`] is the closed set of things the control layer may hand to
//! `patch`. Literal variants carry the raw quantity; the receiving module
//! converts them at its own sample rate when the patch is applied.

use core::fmt;
use core::str::FromStr;

use crate::config::ConfigValue;
use crate::error::PatchError;
use crate::value::{Bpm, Hz, Ms, Pitch, Value};

use super::frame::Processor;
use super::port::Port;

/// A patchable signal source.
pub enum Source {
    /// Plain constant.
    Value(f32),
    /// Duration in milliseconds.
    Ms(f32),
    /// Frequency in Hz.
    Hz(f32),
    /// Note name in scientific notation.
    Pitch(String),
    /// Tempo in beats per minute.
    Bpm(f32),
    /// Another module's output.
    Port(Port),
    /// Any other processor.
    Processor(Box<dyn Processor>),
}

impl Source {
    /// Parses a literal such as `0.5`, `250ms`, `440hz`, `120bpm` or `A4`.
    pub fn parse(text: &str) -> Result<Self, PatchError> {
        Literal::from_str(text).map(Source::from)
    }

    /// Opens the source and returns the processor to wire plus its
    /// description. Opening a [`Port`] claims the upstream output.
    pub fn resolve(
        self,
        sample_rate: f32,
    ) -> Result<(Box<dyn Processor>, SourceDesc), PatchError> {
        let literal = match self {
            Source::Value(v) => Literal::Value(v),
            Source::Ms(ms) => Literal::Ms(ms),
            Source::Hz(hz) => Literal::Hz(hz),
            Source::Pitch(text) => Literal::Pitch(text),
            Source::Bpm(bpm) => Literal::Bpm(bpm),
            Source::Port(port) => {
                let desc = SourceDesc::Port {
                    module: port.module().id().to_string(),
                    output: port.output().to_string(),
                };
                let reader = port.open()?;
                return Ok((Box::new(reader), desc));
            }
            Source::Processor(p) => return Ok((p, SourceDesc::External)),
        };

        let (value, desc) = literal.resolve(sample_rate)?;
        Ok((Box::new(Value(value)), desc))
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Value(_) => "value",
            Source::Ms(_) => "ms",
            Source::Hz(_) => "hz",
            Source::Pitch(_) => "pitch",
            Source::Bpm(_) => "bpm",
            Source::Port(_) => "port",
            Source::Processor(_) => "processor",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Value(v) => write!(f, "Value({v})"),
            Source::Ms(v) => write!(f, "Ms({v})"),
            Source::Hz(v) => write!(f, "Hz({v})"),
            Source::Pitch(t) => write!(f, "Pitch({t:?})"),
            Source::Bpm(v) => write!(f, "Bpm({v})"),
            Source::Port(p) => write!(f, "Port({p:?})"),
            Source::Processor(_) => f.write_str("Processor(..)"),
        }
    }
}

impl From<f32> for Source {
    fn from(v: f32) -> Self {
        Source::Value(v)
    }
}

impl From<Port> for Source {
    fn from(port: Port) -> Self {
        Source::Port(port)
    }
}

impl From<Literal> for Source {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Value(v) => Source::Value(v),
            Literal::Ms(v) => Source::Ms(v),
            Literal::Hz(v) => Source::Hz(v),
            Literal::Pitch(t) => Source::Pitch(t),
            Literal::Bpm(v) => Source::Bpm(v),
        }
    }
}

impl TryFrom<&ConfigValue> for Source {
    type Error = PatchError;

    /// Numbers become constants, booleans become `1`/`0`, text is parsed as a
    /// literal. Lists have no signal meaning.
    fn try_from(value: &ConfigValue) -> Result<Self, Self::Error> {
        match value {
            ConfigValue::Number(n) => Ok(Source::Value(*n as f32)),
            ConfigValue::Bool(b) => Ok(Source::Value(if *b { 1.0 } else { 0.0 })),
            ConfigValue::Text(t) => Source::parse(t),
            ConfigValue::List(_) => Err(PatchError::Unresolvable(
                "a list of numbers".to_string(),
            )),
        }
    }
}

/// The constant subset of [`Source`], used for input defaults.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// Plain constant.
    Value(f32),
    /// Milliseconds.
    Ms(f32),
    /// Hertz.
    Hz(f32),
    /// Note name.
    Pitch(String),
    /// Beats per minute.
    Bpm(f32),
}

impl Literal {
    /// Converts to the per-sample constant at `sample_rate`.
    pub fn resolve(&self, sample_rate: f32) -> Result<(f32, SourceDesc), PatchError> {
        let typed = |raw: String, value: Value| SourceDesc::Typed {
            raw,
            value: value.get(),
        };
        Ok(match self {
            Literal::Value(v) => (*v, SourceDesc::Constant(*v)),
            Literal::Ms(ms) => {
                let ms = Ms::new(*ms, sample_rate);
                (ms.value().get(), typed(ms.to_string(), ms.value()))
            }
            Literal::Hz(hz) => {
                let hz = Hz::new(*hz, sample_rate);
                (hz.value().get(), typed(hz.to_string(), hz.value()))
            }
            Literal::Bpm(bpm) => {
                let bpm = Bpm::new(*bpm, sample_rate);
                (bpm.value().get(), typed(bpm.to_string(), bpm.value()))
            }
            Literal::Pitch(text) => {
                let pitch = Pitch::parse(text, sample_rate)
                    .ok_or_else(|| PatchError::Unresolvable(format!("pitch '{text}'")))?;
                (pitch.value().get(), typed(pitch.to_string(), pitch.value()))
            }
        })
    }
}

impl From<f32> for Literal {
    fn from(v: f32) -> Self {
        Literal::Value(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Value(v as f32)
    }
}

impl FromStr for Literal {
    type Err = PatchError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let lower = trimmed.to_ascii_lowercase();
        let number = |s: &str| s.trim().parse::<f32>().ok();

        if let Some(v) = number(trimmed) {
            return Ok(Literal::Value(v));
        }
        if let Some(v) = lower.strip_suffix("ms").and_then(number) {
            return Ok(Literal::Ms(v));
        }
        if let Some(v) = lower.strip_suffix("hz").and_then(number) {
            return Ok(Literal::Hz(v));
        }
        if let Some(v) = lower.strip_suffix("bpm").and_then(number) {
            return Ok(Literal::Bpm(v));
        }
        if trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // validated when resolved against a sample rate
            return Ok(Literal::Pitch(trimmed.to_string()));
        }
        Err(PatchError::Unresolvable(format!("'{text}'")))
    }
}

/// Description of what an input is currently wired to.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceDesc {
    /// Plain constant.
    Constant(f32),
    /// Constant authored in a natural unit.
    Typed {
        /// As written, e.g. `10ms`.
        raw: String,
        /// Per-sample value.
        value: f32,
    },
    /// Another module's output.
    Port {
        /// Upstream module id.
        module: String,
        /// Upstream output name.
        output: String,
    },
    /// An arbitrary processor.
    External,
}

impl SourceDesc {
    /// Per-sample constant, if this is one.
    pub fn constant(&self) -> Option<f32> {
        match self {
            SourceDesc::Constant(v) | SourceDesc::Typed { value: v, .. } => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` if this is wired to `module`.
    pub fn references(&self, module: &str) -> bool {
        matches!(self, SourceDesc::Port { module: m, .. } if m == module)
    }
}

impl fmt::Display for SourceDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDesc::Constant(v) => write!(f, "{v}"),
            SourceDesc::Typed { raw, .. } => f.write_str(raw),
            SourceDesc::Port { module, output } => write!(f, "{module}.{output}"),
            SourceDesc::External => f.write_str("<processor>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::new_frame;

    const SR: f32 = 48000.0;

    #[test]
    fn parses_literals() {
        assert_eq!("0.5".parse::<Literal>().unwrap(), Literal::Value(0.5));
        assert_eq!("250ms".parse::<Literal>().unwrap(), Literal::Ms(250.0));
        assert_eq!("440Hz".parse::<Literal>().unwrap(), Literal::Hz(440.0));
        assert_eq!("120bpm".parse::<Literal>().unwrap(), Literal::Bpm(120.0));
        assert_eq!(
            "C#3".parse::<Literal>().unwrap(),
            Literal::Pitch("C#3".to_string())
        );
        assert!("".parse::<Literal>().is_err());
        assert!("-".parse::<Literal>().is_err());
    }

    #[test]
    fn resolve_converts_at_sample_rate() {
        let (value, desc) = Literal::Ms(10.0).resolve(SR).unwrap();
        assert_eq!(value, 480.0);
        assert_eq!(desc.to_string(), "10ms");
        assert_eq!(desc.constant(), Some(480.0));

        let (value, _) = Literal::Pitch("A4".to_string()).resolve(SR).unwrap();
        assert!((value - 440.0 / SR).abs() < 1e-7);
    }

    #[test]
    fn bad_pitch_is_unresolvable() {
        let err = Source::parse("H9").unwrap().resolve(SR).err().expect("expected error");
        assert_eq!(err, PatchError::Unresolvable("pitch 'H9'".to_string()));
    }

    #[test]
    fn config_values_coerce() {
        assert!(matches!(
            Source::try_from(&ConfigValue::Number(0.25)),
            Ok(Source::Value(v)) if v == 0.25
        ));
        assert!(matches!(
            Source::try_from(&ConfigValue::Bool(true)),
            Ok(Source::Value(v)) if v == 1.0
        ));
        assert!(matches!(
            Source::try_from(&ConfigValue::Text("5ms".to_string())),
            Ok(Source::Ms(v)) if v == 5.0
        ));
        assert!(Source::try_from(&ConfigValue::List(vec![1.0])).is_err());
    }

    #[test]
    fn resolved_processor_fills_constant() {
        let (mut p, desc) = Source::Hz(480.0).resolve(SR).unwrap();
        let mut frame = new_frame();
        p.process(&mut frame);
        assert!(frame.iter().all(|&s| (s - 0.01).abs() < 1e-7));
        assert_eq!(desc.to_string(), "480hz");
    }
}
