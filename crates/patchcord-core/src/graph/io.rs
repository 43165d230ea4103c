//! Per-module port registry and patching engine.
//!
//! An [`Io`] owns a module's inputs and outputs. It is created empty and
//! populated exactly once by [`expose`](Io::expose); from then on every
//! control operation on the module goes through it.
//!
//! State shared with readers lives in a `Core` behind a mutex: the input
//! slots, the tap frames, the kernel and the read tracker. Output claims live
//! beside it in atomics so a reader can notice revocation without locking.
//!
//! # Patching order
//!
//! A new source is always resolved first (which claims the upstream output
//! for a port) and only then swapped in. A failed patch therefore leaves the
//! previous wiring exactly as it was. The displaced source is dropped after
//! the core lock is released, which releases whatever it held upstream.

use std::sync::Arc;

use parking_lot::Mutex;

use super::Buffer;
use super::frame::{Frame, Processor, new_frame};
use super::port::{InMode, InSpec, InputInfo, OutSpec, OutState, OutputInfo, OutputReader};
use super::source::{Source, SourceDesc};
use super::sync::ReadTracker;
use super::unit::{Inputs, Kernel, Taps};
use crate::error::{ExposeError, PatchError};
use crate::value::Value;

/// A force-sinking input's source and the frame captured by the last sink
/// pass.
pub(crate) struct SinkSlot {
    source: Mutex<(Buffer, SourceDesc)>,
    latest: Mutex<Box<Frame>>,
}

impl SinkSlot {
    fn new(default: f32, desc: SourceDesc) -> Self {
        Self {
            source: Mutex::new((Buffer::new(Box::new(Value(default))), desc)),
            latest: Mutex::new(new_frame()),
        }
    }

    fn pull(&self) {
        let mut source = self.source.lock();
        let frame = source.0.read();
        self.latest.lock().copy_from_slice(frame);
    }
}

/// One input as seen by the module's step.
pub(crate) enum Slot {
    Pulled { buffer: Buffer, desc: SourceDesc },
    Sunk { sink: Arc<SinkSlot>, frame: Box<Frame> },
}

impl Slot {
    fn refresh(&mut self) {
        match self {
            Slot::Pulled { buffer, .. } => {
                buffer.read();
            }
            Slot::Sunk { sink, frame } => frame.copy_from_slice(&sink.latest.lock()[..]),
        }
    }

    pub(crate) fn frame(&self) -> &Frame {
        match self {
            Slot::Pulled { buffer, .. } => buffer.read_cached(),
            Slot::Sunk { frame, .. } => &**frame,
        }
    }
}

/// Module state shared between the module handle and its output readers.
pub(crate) struct Core {
    ins: Vec<Slot>,
    taps: Vec<Box<Frame>>,
    kernel: Box<dyn Kernel>,
    tracker: ReadTracker,
    states: Arc<[OutState]>,
}

impl Core {
    /// Serves one read of `output`, stepping first if this read opens a new
    /// block.
    pub(crate) fn pull(&mut self, output: usize, tap: usize, frame: &mut Frame) {
        let active = self.states.iter().filter(|s| s.is_active()).count();
        if self.tracker.begin(output, active) {
            self.step();
        }
        frame.copy_from_slice(&self.taps[tap][..]);
    }

    fn step(&mut self) {
        let Core {
            ins, taps, kernel, ..
        } = self;
        for slot in ins.iter_mut() {
            slot.refresh();
        }
        kernel.process(&Inputs::new(ins.as_slice()), &mut Taps::new(taps.as_mut_slice()));
    }
}

struct InputDecl {
    name: String,
    mode: InMode,
    default: f32,
    default_desc: SourceDesc,
}

struct Exposed {
    inputs: Vec<InputDecl>,
    outputs: Vec<OutSpec>,
    states: Arc<[OutState]>,
    sinks: Vec<Arc<SinkSlot>>,
    core: Arc<Mutex<Core>>,
}

/// A module's port registry.
pub struct Io {
    id: String,
    sample_rate: f32,
    exposed: Option<Exposed>,
}

impl Io {
    /// Creates an empty registry for module `id`.
    pub fn new(id: impl Into<String>, sample_rate: f32) -> Self {
        Self {
            id: id.into(),
            sample_rate,
            exposed: None,
        }
    }

    /// Module instance id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sample rate used to resolve literal sources.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Registers the module's ports and the kernel computing its taps.
    ///
    /// Input order is the index order the kernel sees. Every output must name
    /// a tap the kernel provides.
    pub fn expose(
        &mut self,
        ins: Vec<InSpec>,
        outs: Vec<OutSpec>,
        kernel: Box<dyn Kernel>,
    ) -> Result<(), ExposeError> {
        if self.exposed.is_some() {
            return Err(ExposeError::AlreadyExposed(self.id.clone()));
        }

        let mut names: Vec<&str> = Vec::with_capacity(ins.len() + outs.len());
        for name in ins.iter().map(|i| &i.name).chain(outs.iter().map(|o| &o.name)) {
            if names.contains(&name.as_str()) {
                return Err(ExposeError::DuplicatePort {
                    module: self.id.clone(),
                    port: name.clone(),
                });
            }
            names.push(name);
        }

        let tap_count = kernel.taps();
        if let Some(out) = outs.iter().find(|o| o.tap >= tap_count) {
            return Err(ExposeError::MissingProvider {
                module: self.id.clone(),
                output: out.name.clone(),
            });
        }

        let mut inputs = Vec::with_capacity(ins.len());
        let mut slots = Vec::with_capacity(ins.len());
        let mut sinks = Vec::new();
        for spec in ins {
            let (default, default_desc) =
                spec.default
                    .resolve(self.sample_rate)
                    .map_err(|e| ExposeError::BadDefault {
                        module: self.id.clone(),
                        input: spec.name.clone(),
                        reason: e.to_string(),
                    })?;

            slots.push(match spec.mode {
                InMode::Normal => Slot::Pulled {
                    buffer: Buffer::new(Box::new(Value(default))),
                    desc: default_desc.clone(),
                },
                InMode::ForceSink => {
                    let sink = Arc::new(SinkSlot::new(default, default_desc.clone()));
                    sinks.push(Arc::clone(&sink));
                    Slot::Sunk {
                        sink,
                        frame: new_frame(),
                    }
                }
            });
            inputs.push(InputDecl {
                name: spec.name,
                mode: spec.mode,
                default,
                default_desc,
            });
        }

        let states: Arc<[OutState]> = outs.iter().map(|_| OutState::default()).collect();
        let core = Core {
            ins: slots,
            taps: (0..tap_count).map(|_| new_frame()).collect(),
            kernel,
            tracker: ReadTracker::new(outs.len()),
            states: Arc::clone(&states),
        };

        self.exposed = Some(Exposed {
            inputs,
            outputs: outs,
            states,
            sinks,
            core: Arc::new(Mutex::new(core)),
        });
        Ok(())
    }

    /// Wires `input` to `source`.
    pub fn patch(&self, input: &str, source: Source) -> Result<(), PatchError> {
        let exposed = self.exposed.as_ref().ok_or_else(|| self.unknown_input(input))?;
        let index = exposed
            .inputs
            .iter()
            .position(|i| i.name == input)
            .ok_or_else(|| self.unknown_input(input))?;
        let decl = &exposed.inputs[index];

        if let Source::Port(port) = &source {
            if decl.mode == InMode::Normal && port.module().id() == self.id {
                return Err(PatchError::SelfFeedback {
                    module: self.id.clone(),
                    input: input.to_string(),
                });
            }
            let wired = SourceDesc::Port {
                module: port.module().id().to_string(),
                output: port.output().to_string(),
            };
            // a revoked reader reports a constant here, so it is re-opened
            if self.current(exposed, index) == wired {
                return Ok(());
            }
        }

        let (processor, desc) = source.resolve(self.sample_rate)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(module = %self.id, input, source = %desc, "patch");

        let old = self.swap(exposed, index, processor, desc, false);
        drop(old);
        Ok(())
    }

    /// Claims `name` and returns its reader.
    pub fn output(&self, name: &str) -> Result<OutputReader, PatchError> {
        let unknown = || PatchError::UnknownOutput {
            module: self.id.clone(),
            output: name.to_string(),
        };
        let exposed = self.exposed.as_ref().ok_or_else(unknown)?;
        let index = exposed
            .outputs
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(unknown)?;

        let generation = exposed.states[index]
            .claim()
            .ok_or_else(|| PatchError::AlreadyPatched {
                module: self.id.clone(),
                output: name.to_string(),
            })?;

        Ok(OutputReader::new(
            self.id.clone(),
            index,
            exposed.outputs[index].tap,
            generation,
            Arc::clone(&exposed.core),
            Arc::clone(&exposed.states),
        ))
    }

    /// Restores every input's default and revokes every output not marked
    /// `keep_on_reset`. Kernel state is kept.
    pub fn reset(&self) {
        let Some(exposed) = self.exposed.as_ref() else {
            return;
        };

        let mut displaced = Vec::with_capacity(exposed.inputs.len());
        for (index, decl) in exposed.inputs.iter().enumerate() {
            displaced.push(self.swap(
                exposed,
                index,
                Box::new(Value(decl.default)),
                decl.default_desc.clone(),
                true,
            ));
        }
        exposed.core.lock().tracker.reset();

        for (state, spec) in exposed.states.iter().zip(&exposed.outputs) {
            if !spec.keep_on_reset {
                state.revoke();
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(module = %self.id, "reset");

        drop(displaced);
    }

    /// Pulls every force-sinking input once.
    pub fn sink(&self) {
        if let Some(exposed) = self.exposed.as_ref() {
            for sink in &exposed.sinks {
                sink.pull();
            }
        }
    }

    /// Forgets the reads of the finished block.
    pub fn end_block(&self) {
        if let Some(exposed) = self.exposed.as_ref() {
            exposed.core.lock().tracker.reset();
        }
    }

    /// Snapshot of every input.
    pub fn inputs(&self) -> Vec<InputInfo> {
        let Some(exposed) = self.exposed.as_ref() else {
            return Vec::new();
        };
        exposed
            .inputs
            .iter()
            .enumerate()
            .map(|(index, decl)| InputInfo {
                name: decl.name.clone(),
                mode: decl.mode,
                source: self.current(exposed, index),
                default: decl.default_desc.clone(),
            })
            .collect()
    }

    /// Snapshot of every output.
    pub fn outputs(&self) -> Vec<OutputInfo> {
        let Some(exposed) = self.exposed.as_ref() else {
            return Vec::new();
        };
        exposed
            .outputs
            .iter()
            .zip(exposed.states.iter())
            .map(|(spec, state)| OutputInfo {
                name: spec.name.clone(),
                active: state.is_active(),
                keep_on_reset: spec.keep_on_reset,
            })
            .collect()
    }

    /// What input `index` is wired to. An input still holding a reader its
    /// upstream module revoked reads silence and reports a zero constant.
    fn current(&self, exposed: &Exposed, index: usize) -> SourceDesc {
        let describe = |buffer: &Buffer, desc: &SourceDesc| {
            if buffer.is_live() {
                desc.clone()
            } else {
                SourceDesc::Constant(0.0)
            }
        };
        let core = exposed.core.lock();
        match &core.ins[index] {
            Slot::Pulled { buffer, desc } => describe(buffer, desc),
            Slot::Sunk { sink, .. } => {
                let source = sink.source.lock();
                describe(&source.0, &source.1)
            }
        }
    }

    /// Installs `processor` in input `index` and returns what it displaced.
    /// `outermost` replaces the whole wrapper chain instead of its tail.
    fn swap(
        &self,
        exposed: &Exposed,
        index: usize,
        processor: Box<dyn Processor>,
        desc: SourceDesc,
        outermost: bool,
    ) -> Box<dyn Processor> {
        let install = |buffer: &mut Buffer, slot_desc: &mut SourceDesc| {
            *slot_desc = desc;
            if outermost {
                buffer.restore(processor)
            } else {
                buffer.set_source(processor)
            }
        };

        let mut core = exposed.core.lock();
        let sink = match &mut core.ins[index] {
            Slot::Pulled {
                buffer,
                desc: slot_desc,
            } => return install(buffer, slot_desc),
            Slot::Sunk { sink, .. } => Arc::clone(sink),
        };
        drop(core);

        let mut source = sink.source.lock();
        let (buffer, slot_desc) = &mut *source;
        install(buffer, slot_desc)
    }

    fn unknown_input(&self, input: &str) -> PatchError {
        PatchError::UnknownInput {
            module: self.id.clone(),
            input: input.to_string(),
        }
    }
}

impl core::fmt::Debug for Io {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Io")
            .field("id", &self.id)
            .field("exposed", &self.exposed.is_some())
            .finish_non_exhaustive()
    }
}
