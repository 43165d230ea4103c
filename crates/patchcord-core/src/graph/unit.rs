//! The module contract and the standard module built on [`Io`].
//!
//! Concrete modules only implement [`Kernel`]: given one frame per input,
//! fill one frame per tap. [`Unit`] hosts a kernel behind an [`Io`] and
//! implements [`Patcher`], the control surface the rack and the scripting
//! layer talk to.

use core::ops::{Index, IndexMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::frame::Frame;
use super::io::{Io, Slot};
use super::port::{InSpec, InputInfo, OutSpec, OutputInfo, OutputReader};
use super::source::Source;
use crate::config::ModuleConfig;
use crate::error::{ConfigError, PatchError};

/// Shared handle to a mounted module.
pub type Module = Arc<dyn Patcher>;

/// Control surface of a module.
///
/// Every method takes `&self`; modules guard their own state so handles can
/// be shared between the rack, ports and the control layer.
pub trait Patcher: Send + Sync {
    /// Instance id, unique within the process (`osc-3`).
    fn id(&self) -> &str;

    /// Module type name (`osc`).
    fn kind(&self) -> &str;

    /// Wires `input` to `source`. On error the previous wiring is kept.
    fn patch(&self, input: &str, source: Source) -> Result<(), PatchError>;

    /// Wires `input` to a zero constant.
    fn unpatch(&self, input: &str) -> Result<(), PatchError> {
        self.patch(input, Source::Value(0.0))
    }

    /// Claims output `name`.
    fn output(&self, name: &str) -> Result<OutputReader, PatchError>;

    /// Restores input defaults and revokes outputs not kept on reset.
    fn reset(&self);

    /// Current state of every input.
    fn inputs(&self) -> Vec<InputInfo>;

    /// Current state of every output.
    fn outputs(&self) -> Vec<OutputInfo>;

    /// Pulls force-sinking inputs. Called by the rack once per block.
    fn sink(&self) {}

    /// Marks the end of a block, after the sink pass. The next read of any
    /// output steps the module.
    fn end_block(&self) {}
}

/// Per-block computation of a module.
pub trait Kernel: Send {
    /// Number of tap frames this kernel fills.
    fn taps(&self) -> usize;

    /// Computes one block. `ins` is indexed in input declaration order.
    fn process(&mut self, ins: &Inputs<'_>, taps: &mut Taps<'_>);
}

/// Read-only view of a module's input frames for one step.
pub struct Inputs<'a> {
    slots: &'a [Slot],
}

impl<'a> Inputs<'a> {
    pub(crate) fn new(slots: &'a [Slot]) -> Self {
        Self { slots }
    }

    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` for a module without inputs.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Index<usize> for Inputs<'_> {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        self.slots[index].frame()
    }
}

/// Writable view of a module's tap frames for one step.
pub struct Taps<'a> {
    frames: &'a mut [Box<Frame>],
}

impl<'a> Taps<'a> {
    pub(crate) fn new(frames: &'a mut [Box<Frame>]) -> Self {
        Self { frames }
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` for a kernel without taps.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Index<usize> for Taps<'_> {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.frames[index]
    }
}

impl IndexMut<usize> for Taps<'_> {
    fn index_mut(&mut self, index: usize) -> &mut Frame {
        &mut self.frames[index]
    }
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Allocates a process-unique instance id for a module of `kind`.
pub fn next_id(kind: &str) -> String {
    format!("{kind}-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// A module made of an [`Io`] and a [`Kernel`].
#[derive(Debug)]
pub struct Unit {
    kind: String,
    io: Io,
}

impl Unit {
    /// Builds and mounts a module of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Expose`] when the port declarations are invalid.
    pub fn build(
        kind: &str,
        config: &ModuleConfig,
        ins: Vec<InSpec>,
        outs: Vec<OutSpec>,
        kernel: impl Kernel + 'static,
    ) -> Result<Module, ConfigError> {
        let mut io = Io::new(next_id(kind), config.sample_rate);
        io.expose(ins, outs, Box::new(kernel))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(module = io.id(), "module built");

        Ok(Arc::new(Self {
            kind: kind.to_string(),
            io,
        }))
    }
}

impl Patcher for Unit {
    fn id(&self) -> &str {
        self.io.id()
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn patch(&self, input: &str, source: Source) -> Result<(), PatchError> {
        self.io.patch(input, source)
    }

    fn output(&self, name: &str) -> Result<OutputReader, PatchError> {
        self.io.output(name)
    }

    fn reset(&self) {
        self.io.reset();
    }

    fn inputs(&self) -> Vec<InputInfo> {
        self.io.inputs()
    }

    fn outputs(&self) -> Vec<OutputInfo> {
        self.io.outputs()
    }

    fn sink(&self) {
        self.io.sink();
    }

    fn end_block(&self) {
        self.io.end_block();
    }
}
