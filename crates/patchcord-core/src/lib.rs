//! Patchcord Core - signal-graph runtime and DSP primitives
//!
//! A pull-based block engine for modular synthesis. Modules expose named
//! inputs and outputs; patching an input to another module's output makes
//! the downstream module pull that output when it needs a block. The rack
//! drives everything by filling one [`Frame`] at a time from its root.
//!
//! # Graph
//!
//! - [`Frame`] / [`Processor`] - fixed-size block and the pull contract
//! - [`Buffer`] - caching wrapper around a swappable source
//! - [`Source`] - what an input can be wired to: constants, typed
//!   quantities (`Hz`, `Ms`, `Bpm`, pitch names), ports, processors
//! - [`Io`] - per-module patching engine with output claims, multi-output
//!   synchronization and force-sinking inputs
//! - [`Unit`] / [`Kernel`] / [`Patcher`] - the module contract
//! - [`Rack`] - mounted modules and the block driver
//!
//! # DSP primitives
//!
//! - [`DelayLine`], [`TappedDelay`] - circular delay lines
//! - [`Comb`], [`Allpass`] - delay-based filters for echoes and diffusion
//! - [`OnePole`] - damping lowpass
//! - [`Svf`] - cascadable state-variable filter
//! - [`BlepOscillator`] - band-limited multi-waveform oscillator
//! - [`Adsr`], [`Ahd`], [`Shape`] - envelope state machines
//! - [`Metronome`], [`Sequencer`] - clock and step state machines
//! - [`EdgeDetector`] - the rising/falling gate rule shared by every module
//!
//! # Example
//!
//! ```rust
//! use patchcord_core::{FRAME_SIZE, Rack, Source, new_frame};
//!
//! let rack = Rack::new(48000.0);
//! rack.listen(Source::Value(0.25)).unwrap();
//!
//! let mut frame = new_frame();
//! rack.fill(&mut frame);
//! assert_eq!(frame[FRAME_SIZE - 1], 0.25);
//! ```
//!
//! # Features
//!
//! - `tracing` - emit `tracing` events for wiring changes (never from the
//!   audio path)

pub mod allpass;
pub mod blep;
pub mod comb;
pub mod config;
pub mod delay;
pub mod edge;
pub mod envelope;
pub mod error;
pub mod graph;
pub mod math;
pub mod one_pole;
pub mod sequencer;
pub mod svf;
pub mod value;

// Re-export main types at crate root
pub use allpass::Allpass;
pub use blep::{BlepOscillator, OscTaps, poly_blep};
pub use comb::{Comb, CombKind};
pub use config::{ConfigValue, DEFAULT_SAMPLE_RATE, ModuleConfig};
pub use delay::{DelayLine, TappedDelay};
pub use edge::{Edge, EdgeDetector, is_falling, is_rising};
pub use envelope::{
    Adsr, AdsrInput, AdsrStage, Ahd, AhdInput, AhdStage, EnvelopeOutput, Shape, ShapeInput,
    ShapeStage,
};
pub use error::{ConfigError, ExposeError, PatchError};
pub use graph::{
    Buffer, FRAME_SIZE, Frame, InMode, InSpec, InputInfo, Inputs, Io, Kernel, Literal, Module,
    OutSpec, OutputInfo, OutputReader, Patcher, Port, Processor, Rack, ReadTracker, Source,
    SourceDesc, Taps, Unit, new_frame, next_id,
};
pub use math::{db_to_linear, flush_denormal, lerp, ms_to_samples, semitones_to_ratio};
pub use one_pole::OnePole;
pub use sequencer::{
    Metronome, MetronomeInput, MetronomeOutput, MetronomeStage, SeqInput, SeqOutput, SeqStage,
    Sequencer,
};
pub use svf::{Svf, SvfMode, SvfTaps};
pub use value::{Bpm, Hz, Ms, Pitch, Value};
