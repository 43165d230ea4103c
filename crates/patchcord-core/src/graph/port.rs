//! Port declarations, output claims and the readers handed to consumers.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::frame::{Frame, Processor, new_frame};
use super::io::Core;
use super::source::{Literal, SourceDesc};
use super::unit::Module;
use crate::error::PatchError;

/// How an input participates in block production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InMode {
    /// Pulled when the owning module steps.
    #[default]
    Normal,
    /// Pulled by the rack after each block; the module sees the previous
    /// block's value. Required for feedback into the same module.
    ForceSink,
}

/// Declaration of one input.
#[derive(Clone, Debug, PartialEq)]
pub struct InSpec {
    /// Input name, unique within the module.
    pub name: String,
    /// Value restored on reset.
    pub default: Literal,
    /// Pull discipline.
    pub mode: InMode,
}

impl InSpec {
    /// A normal input with a default.
    pub fn new(name: impl Into<String>, default: impl Into<Literal>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            mode: InMode::Normal,
        }
    }

    /// A force-sinking input with a default.
    pub fn sink(name: impl Into<String>, default: impl Into<Literal>) -> Self {
        Self {
            mode: InMode::ForceSink,
            ..Self::new(name, default)
        }
    }
}

/// Declaration of one output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutSpec {
    /// Output name, unique within the module.
    pub name: String,
    /// Kernel tap this output reads.
    pub tap: usize,
    /// Survive [`reset`](super::Patcher::reset) instead of being revoked.
    pub keep_on_reset: bool,
}

impl OutSpec {
    /// An output reading `tap`.
    pub fn new(name: impl Into<String>, tap: usize) -> Self {
        Self {
            name: name.into(),
            tap,
            keep_on_reset: false,
        }
    }

    /// Marks the output as surviving resets.
    #[must_use]
    pub fn keep_on_reset(mut self) -> Self {
        self.keep_on_reset = true;
        self
    }
}

/// Claim word for one output: `generation << 1 | active`.
///
/// Claims and releases are compare-and-swap on the word, so a release from a
/// reader of an older generation never clears a newer claim.
#[derive(Debug, Default)]
pub(crate) struct OutState(AtomicU64);

impl OutState {
    pub(crate) fn claim(&self) -> Option<u64> {
        let mut word = self.0.load(Ordering::Acquire);
        loop {
            if word & 1 == 1 {
                return None;
            }
            match self.0.compare_exchange_weak(
                word,
                word | 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(word >> 1),
                Err(current) => word = current,
            }
        }
    }

    pub(crate) fn release(&self, generation: u64) {
        let _ = self.0.compare_exchange(
            (generation << 1) | 1,
            generation << 1,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Ends the current claim, if any, and moves to the next generation.
    pub(crate) fn revoke(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (word & 1 == 1).then_some(((word >> 1) + 1) << 1)
            })
            .is_ok()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire) & 1 == 1
    }

    fn is_live(&self, generation: u64) -> bool {
        self.0.load(Ordering::Acquire) == (generation << 1) | 1
    }
}

/// The single consumer handle for one module output.
///
/// Pulling it runs the owning module's shared step when needed and copies the
/// tap. Dropping it releases the output so it can be requested again. A
/// reader revoked by its module's reset yields silence.
///
/// If the owning module is already being pulled further up the same call
/// chain, the reader serves its previous frame instead of re-entering.
pub struct OutputReader {
    module: String,
    output: usize,
    tap: usize,
    generation: u64,
    core: Arc<Mutex<Core>>,
    states: Arc<[OutState]>,
    last: Box<Frame>,
}

impl OutputReader {
    pub(crate) fn new(
        module: String,
        output: usize,
        tap: usize,
        generation: u64,
        core: Arc<Mutex<Core>>,
        states: Arc<[OutState]>,
    ) -> Self {
        Self {
            module,
            output,
            tap,
            generation,
            core,
            states,
            last: new_frame(),
        }
    }

    /// Id of the module this reader belongs to.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns `false` once the owning module has revoked this reader.
    pub fn is_live(&self) -> bool {
        self.states[self.output].is_live(self.generation)
    }
}

impl Processor for OutputReader {
    fn process(&mut self, frame: &mut Frame) {
        if !OutputReader::is_live(self) {
            frame.fill(0.0);
            return;
        }
        if let Some(mut core) = self.core.try_lock() {
            core.pull(self.output, self.tap, &mut self.last);
        }
        frame.copy_from_slice(&self.last[..]);
    }

    fn is_live(&self) -> bool {
        OutputReader::is_live(self)
    }
}

impl Drop for OutputReader {
    fn drop(&mut self) {
        self.states[self.output].release(self.generation);
    }
}

impl fmt::Debug for OutputReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputReader")
            .field("module", &self.module)
            .field("output", &self.output)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// A reference to one output of one module.
///
/// Creating a port claims nothing; the output is opened when the port is
/// patched into an input.
#[derive(Clone)]
pub struct Port {
    module: Module,
    output: String,
}

impl Port {
    /// Refers to `output` on `module`.
    pub fn new(module: &Module, output: impl Into<String>) -> Self {
        Self {
            module: Arc::clone(module),
            output: output.into(),
        }
    }

    /// Upstream module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Upstream output name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Claims the output.
    pub fn open(&self) -> Result<OutputReader, PatchError> {
        self.module.output(&self.output)
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module.id(), self.output)
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.module.id() == other.module.id() && self.output == other.output
    }
}

/// Snapshot of one input for introspection.
#[derive(Clone, Debug, PartialEq)]
pub struct InputInfo {
    /// Input name.
    pub name: String,
    /// Pull discipline.
    pub mode: InMode,
    /// Current source.
    pub source: SourceDesc,
    /// Source restored on reset.
    pub default: SourceDesc,
}

/// Snapshot of one output for introspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputInfo {
    /// Output name.
    pub name: String,
    /// Whether a reader currently holds it.
    pub active: bool,
    /// Whether it survives resets.
    pub keep_on_reset: bool,
}
