//! Module registry and factory for patchcord.
//!
//! A table of every catalog module keyed by a stable string name, so racks
//! can be assembled from text: a config file, a command line, a script.
//!
//! # Features
//!
//! - **Discovery**: list every module with its metadata
//! - **Factory**: build a module by name from a [`ModuleConfig`]
//! - **Categories**: modules grouped by role (sound, envelope, ...)
//!
//! # Example
//!
//! ```rust
//! use patchcord_core::ModuleConfig;
//! use patchcord_registry::{ModuleCategory, global};
//!
//! let registry = global();
//!
//! for module in registry.all() {
//!     println!("{}: {}", module.id, module.description);
//! }
//!
//! let osc = registry.create("osc", &ModuleConfig::new(48000.0)).unwrap();
//! assert_eq!(osc.kind(), "osc");
//!
//! for module in registry.in_category(ModuleCategory::Envelope) {
//!     println!("envelope: {}", module.name);
//! }
//! ```

use std::sync::OnceLock;

use patchcord_core::{ConfigError, Module, ModuleConfig};
use patchcord_modules::{
    adsr, ahd, allpass, clock, comb, delay, filter, gate_seq, mix, mult, noise, osc, reverb,
    shape, step_seq, tap_delay,
};
use serde::Serialize;

/// Role of a module, for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleCategory {
    /// Oscillators and noise
    Sound,
    /// Envelope and function generators
    Envelope,
    /// Clocks and sequencers
    Sequencer,
    /// Filters
    Filter,
    /// Delays, combs, reverbs
    TimeBased,
    /// Mixers and arithmetic
    Utility,
}

impl ModuleCategory {
    /// Every category, in display order.
    pub const ALL: [ModuleCategory; 6] = [
        ModuleCategory::Sound,
        ModuleCategory::Envelope,
        ModuleCategory::Sequencer,
        ModuleCategory::Filter,
        ModuleCategory::TimeBased,
        ModuleCategory::Utility,
    ];

    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            ModuleCategory::Sound => "Sound",
            ModuleCategory::Envelope => "Envelope",
            ModuleCategory::Sequencer => "Sequencer",
            ModuleCategory::Filter => "Filter",
            ModuleCategory::TimeBased => "Time-Based",
            ModuleCategory::Utility => "Utility",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            ModuleCategory::Sound => "Oscillators and noise sources",
            ModuleCategory::Envelope => "Gate- and trigger-driven envelope generators",
            ModuleCategory::Sequencer => "Clocks, gate and step sequencers",
            ModuleCategory::Filter => "Multi-mode resonant filters",
            ModuleCategory::TimeBased => "Delays, combs, allpasses and reverbs",
            ModuleCategory::Utility => "Mixers, multipliers and other plumbing",
        }
    }
}

/// Describes a module in the registry.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleDescriptor {
    /// Stable identifier (lowercase, kebab-case).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Category for organization.
    pub category: ModuleCategory,
}

/// Factory function building a module from its config.
pub type ModuleFactory = fn(&ModuleConfig) -> Result<Module, ConfigError>;

struct RegistryEntry {
    descriptor: ModuleDescriptor,
    factory: ModuleFactory,
}

/// Registry of every available module.
pub struct ModuleRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Creates a registry with the whole catalog registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(16),
        };
        registry.register_builtin_modules();
        registry
    }

    fn register_builtin_modules(&mut self) {
        // Sound sources
        self.register(
            ModuleDescriptor {
                id: "osc",
                name: "Oscillator",
                description: "Band-limited sine, saw, pulse, triangle and sub",
                category: ModuleCategory::Sound,
            },
            osc::new,
        );
        self.register(
            ModuleDescriptor {
                id: "noise",
                name: "Noise",
                description: "White and pink noise",
                category: ModuleCategory::Sound,
            },
            noise::new,
        );

        // Envelopes
        self.register(
            ModuleDescriptor {
                id: "adsr",
                name: "ADSR",
                description: "Gate-driven attack, decay, sustain, release",
                category: ModuleCategory::Envelope,
            },
            adsr::new,
        );
        self.register(
            ModuleDescriptor {
                id: "ahd",
                name: "AHD",
                description: "Triggered attack, hold, decay",
                category: ModuleCategory::Envelope,
            },
            ahd::new,
        );
        self.register(
            ModuleDescriptor {
                id: "shape",
                name: "Shape",
                description: "Rise/fall function generator that can cycle",
                category: ModuleCategory::Envelope,
            },
            shape::new,
        );

        // Sequencers
        self.register(
            ModuleDescriptor {
                id: "clock",
                name: "Clock",
                description: "Tempo clock with divided outputs",
                category: ModuleCategory::Sequencer,
            },
            clock::new,
        );
        self.register(
            ModuleDescriptor {
                id: "gate-seq",
                name: "Gate Sequencer",
                description: "On/off pattern stepped by a clock",
                category: ModuleCategory::Sequencer,
            },
            gate_seq::new,
        );
        self.register(
            ModuleDescriptor {
                id: "step-seq",
                name: "Step Sequencer",
                description: "Semitone steps advanced by a clock",
                category: ModuleCategory::Sequencer,
            },
            step_seq::new,
        );

        // Filters
        self.register(
            ModuleDescriptor {
                id: "filter",
                name: "Filter",
                description: "Cascaded state-variable lowpass, bandpass, highpass",
                category: ModuleCategory::Filter,
            },
            filter::new,
        );

        // Time-based
        self.register(
            ModuleDescriptor {
                id: "delay",
                name: "Delay",
                description: "Feedback delay with send and return",
                category: ModuleCategory::TimeBased,
            },
            delay::new,
        );
        self.register(
            ModuleDescriptor {
                id: "tap-delay",
                name: "Tap Delay",
                description: "Series delay with an output after every stage",
                category: ModuleCategory::TimeBased,
            },
            tap_delay::new,
        );
        self.register(
            ModuleDescriptor {
                id: "comb",
                name: "Comb",
                description: "Feed-forward and feedback comb filter",
                category: ModuleCategory::TimeBased,
            },
            comb::new,
        );
        self.register(
            ModuleDescriptor {
                id: "allpass",
                name: "Allpass",
                description: "Schroeder allpass diffuser",
                category: ModuleCategory::TimeBased,
            },
            allpass::new,
        );
        self.register(
            ModuleDescriptor {
                id: "reverb",
                name: "Reverb",
                description: "Stereo comb and allpass network",
                category: ModuleCategory::TimeBased,
            },
            reverb::new,
        );

        // Utility
        self.register(
            ModuleDescriptor {
                id: "mix",
                name: "Mixer",
                description: "Weighted sum with master level",
                category: ModuleCategory::Utility,
            },
            mix::new,
        );
        self.register(
            ModuleDescriptor {
                id: "mult",
                name: "Multiplier",
                description: "Product of two signals",
                category: ModuleCategory::Utility,
            },
            mult::new,
        );
    }

    fn register(&mut self, descriptor: ModuleDescriptor, factory: ModuleFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered modules.
    pub fn all(&self) -> Vec<&ModuleDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for modules in `category`.
    pub fn in_category(&self, category: ModuleCategory) -> Vec<&ModuleDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Gets a descriptor by module id.
    pub fn get(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.entry(id).map(|e| &e.descriptor)
    }

    /// Builds a module by id.
    ///
    /// Fails with [`ConfigError::UnknownModule`] for an unregistered id, or
    /// with whatever the module's factory rejects in `config`.
    pub fn create(&self, id: &str, config: &ModuleConfig) -> Result<Module, ConfigError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| ConfigError::UnknownModule(id.to_string()))?;
        let module = (entry.factory)(config)?;
        tracing::debug!(kind = id, module = module.id(), "module created");
        Ok(module)
    }

    /// Returns the number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.id == id)
    }
}

/// The process-wide registry, built on first use and read-only afterwards.
pub fn global() -> &'static ModuleRegistry {
    static REGISTRY: OnceLock<ModuleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = ModuleRegistry::new();
        tracing::info!(modules = registry.len(), "module registry initialized");
        registry
    })
}
