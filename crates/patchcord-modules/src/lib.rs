//! Patchcord Modules - the module catalog
//!
//! Every module is a [`Kernel`](patchcord_core::Kernel) mounted by
//! [`Unit::build`](patchcord_core::Unit::build) and constructed through a
//! factory with the same signature:
//!
//! ```rust,ignore
//! pub fn new(config: &ModuleConfig) -> Result<Module, ConfigError>
//! ```
//!
//! # Units
//!
//! Inputs carry per-sample values, so patch literals in their natural unit
//! and let the module convert them at its sample rate:
//!
//! - pitch and cutoff inputs take `Hz` or note names (cycles per sample)
//! - time inputs take `Ms` (samples)
//! - tempo inputs take `Bpm` (beats per sample)
//! - gates and triggers are high above zero
//!
//! # Catalog
//!
//! | Module | Inputs | Outputs |
//! |--------|--------|---------|
//! | [`osc`] | pitch, detune, fm, pulse-width, sync, amp | sine, saw, pulse, triangle, sub |
//! | [`adsr`] | gate, attack, decay, sustain, release, ratio | out, end-cycle |
//! | [`ahd`] | trigger, attack, hold, decay, ratio | out, end-cycle |
//! | [`shape`] | trigger, rise, fall, cycle, ratio | out, end-cycle |
//! | [`clock`] | tempo, pulse-width, run | out, div2, div4 |
//! | [`gate_seq`] | clock, reset | on, off |
//! | [`step_seq`] | clock, reset, transpose | out, gate, end |
//! | [`filter`] | in, cutoff, resonance | lp, bp, hp |
//! | [`delay`] | in, time, feedback, mix, return | out, send |
//! | [`tap_delay`] | in, time | tap0.. |
//! | [`comb`] | in, time, gain, feedback | out |
//! | [`allpass`] | in, time, gain | out |
//! | [`reverb`] | in, size, decay, damp, mix | a, b |
//! | [`mix`] | in0.., level0.., master | out |
//! | [`mult`] | a, b | out |
//! | [`noise`] | amp | white, pink |
//!
//! # Example
//!
//! ```rust
//! use patchcord_core::{ModuleConfig, Rack, Source, new_frame};
//!
//! let config = ModuleConfig::new(48000.0);
//! let rack = Rack::new(48000.0);
//! let osc = rack.add(patchcord_modules::osc::new(&config).unwrap());
//! rack.patch(&osc, "pitch", Source::parse("A4").unwrap()).unwrap();
//! rack.listen(rack.port(&osc, "sine").unwrap().into()).unwrap();
//!
//! let mut frame = new_frame();
//! rack.fill(&mut frame);
//! assert!(frame.iter().all(|s| s.abs() <= 1.0));
//! ```

pub mod adsr;
pub mod ahd;
pub mod allpass;
pub mod clock;
pub mod comb;
pub mod delay;
pub mod filter;
pub mod gate_seq;
pub mod mix;
pub mod mult;
pub mod noise;
pub mod osc;
pub mod reverb;
pub mod shape;
pub mod step_seq;
pub mod tap_delay;

use patchcord_core::{ConfigError, ModuleConfig, ms_to_samples};

/// Reads the `max` field (milliseconds) and sizes a delay buffer from it.
pub(crate) fn max_delay(
    config: &ModuleConfig,
    kind: &str,
    default_ms: f32,
) -> Result<usize, ConfigError> {
    let max = config.number(kind, "max", default_ms)?;
    if !max.is_finite() || max <= 0.0 {
        return Err(ConfigError::invalid_field(
            kind,
            "max",
            format!("expected a positive duration in ms, got {max}"),
        ));
    }
    Ok(ms_to_samples(max, config.sample_rate))
}

/// `1.0` for high, `0.0` for low.
#[inline]
pub(crate) fn gate(high: bool) -> f32 {
    if high { 1.0 } else { 0.0 }
}
