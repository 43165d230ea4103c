//! Scalar signal sources and their natural-unit constructors.
//!
//! Patch-time literals are authored in musical units (Hz, milliseconds, BPM,
//! pitch names) but the graph only ever sees the normalized per-sample
//! [`Value`]. Each typed wrapper keeps the raw quantity for display and the
//! derived value for processing.
//!
//! | Type | Raw | Per-sample value |
//! |------|-----|------------------|
//! | [`Hz`] | frequency | cycles per sample (`hz / sample_rate`) |
//! | [`Ms`] | milliseconds | samples |
//! | [`Bpm`] | beats per minute | beats per sample |
//! | [`Pitch`] | `A4`, `C#3`, `Eb-1` | as [`Hz`] |

use core::fmt;

use libm::powf;

use crate::graph::{Frame, Processor};

/// A constant that broadcasts itself into every position of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Value(pub f32);

impl Value {
    /// Creates a constant source.
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Returns the scalar.
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl Processor for Value {
    #[inline]
    fn process(&mut self, frame: &mut Frame) {
        frame.fill(self.0);
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

/// Frequency in Hertz.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hz {
    hz: f32,
    value: Value,
}

impl Hz {
    /// Converts `hz` to cycles per sample at `sample_rate`.
    pub fn new(hz: f32, sample_rate: f32) -> Self {
        Self {
            hz,
            value: Value(hz / sample_rate),
        }
    }

    /// Raw frequency in Hz.
    pub fn hz(&self) -> f32 {
        self.hz
    }

    /// Per-sample phase increment.
    pub fn value(&self) -> Value {
        self.value
    }
}

impl Processor for Hz {
    fn process(&mut self, frame: &mut Frame) {
        self.value.process(frame);
    }
}

impl fmt::Display for Hz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hz", self.hz)
    }
}

/// Duration in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ms {
    ms: f32,
    value: Value,
}

impl Ms {
    /// Converts `ms` to a sample count at `sample_rate`.
    pub fn new(ms: f32, sample_rate: f32) -> Self {
        Self {
            ms,
            value: Value(ms * sample_rate / 1000.0),
        }
    }

    /// Raw duration in milliseconds.
    pub fn ms(&self) -> f32 {
        self.ms
    }

    /// Duration in samples.
    pub fn value(&self) -> Value {
        self.value
    }
}

impl Processor for Ms {
    fn process(&mut self, frame: &mut Frame) {
        self.value.process(frame);
    }
}

impl fmt::Display for Ms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ms)
    }
}

/// Tempo in beats per minute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bpm {
    bpm: f32,
    value: Value,
}

impl Bpm {
    /// Converts `bpm` to beats per sample at `sample_rate`.
    pub fn new(bpm: f32, sample_rate: f32) -> Self {
        Self {
            bpm,
            value: Value(bpm / 60.0 / sample_rate),
        }
    }

    /// Raw tempo.
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Beats per sample.
    pub fn value(&self) -> Value {
        self.value
    }
}

impl Processor for Bpm {
    fn process(&mut self, frame: &mut Frame) {
        self.value.process(frame);
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bpm", self.bpm)
    }
}

/// A musical pitch in scientific notation (`A4` = 440 Hz).
#[derive(Clone, Debug, PartialEq)]
pub struct Pitch {
    name: String,
    midi: i32,
    hz: Hz,
}

impl Pitch {
    /// Parses a note name such as `C4`, `F#2`, `Bb3` or `A-1`.
    ///
    /// Returns `None` for anything that is not a letter `A`–`G`, an optional
    /// `#`/`b` accidental, and a signed integer octave.
    pub fn parse(name: &str, sample_rate: f32) -> Option<Self> {
        let mut chars = name.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let class = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let rest = chars.as_str();
        let (accidental, octave) = if let Some(r) = rest.strip_prefix('#') {
            (1, r)
        } else if let Some(r) = rest.strip_prefix('b') {
            (-1, r)
        } else {
            (0, rest)
        };

        let octave: i32 = octave.parse().ok()?;
        let midi = (octave + 1) * 12 + class + accidental;
        let hz = 440.0 * powf(2.0, (midi - 69) as f32 / 12.0);

        Some(Self {
            name: name.trim().to_string(),
            midi,
            hz: Hz::new(hz, sample_rate),
        })
    }

    /// The note name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIDI note number (`A4` = 69).
    pub fn midi(&self) -> i32 {
        self.midi
    }

    /// Frequency of the note.
    pub fn hz(&self) -> Hz {
        self.hz
    }

    /// Per-sample phase increment.
    pub fn value(&self) -> Value {
        self.hz.value()
    }
}

impl Processor for Pitch {
    fn process(&mut self, frame: &mut Frame) {
        self.hz.process(frame);
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
