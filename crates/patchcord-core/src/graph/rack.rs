//! The block driver: mounted modules, the `listen` root and the coarse lock.
//!
//! Every control operation and every block acquire the same mutex, so wiring
//! changes land between blocks and never inside one. Inside a block the
//! per-module locks are uncontended.
//!
//! The flip side is that [`Rack::fill`] waits for whatever control operation
//! holds the lock, including its source resolution and allocation. A
//! real-time callback that must not wait calls [`Rack::try_fill`] instead and
//! gets one silent block while a control operation is in flight.
//!
//! After the sink pass every mounted module is told the block is over, so the
//! first read of the next block steps it whichever output asks first.
//!
//! # Example
//!
//! ```rust,ignore
//! let rack = Rack::new(48000.0);
//! let osc = rack.add(osc::new(&config)?);
//! rack.patch(&osc, "pitch", Source::parse("A4")?)?;
//! rack.listen(rack.port(&osc, "sine")?.into())?;
//!
//! let mut frame = new_frame();
//! rack.fill(&mut frame);
//! ```

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::Buffer;
use super::frame::Frame;
use super::port::Port;
use super::source::{Source, SourceDesc};
use super::unit::Module;
use crate::error::PatchError;
use crate::value::Value;

struct RackState {
    modules: BTreeMap<String, Module>,
    listen: Buffer,
    listen_desc: SourceDesc,
}

impl RackState {
    fn module(&self, id: &str) -> Result<&Module, PatchError> {
        self.modules
            .get(id)
            .ok_or_else(|| PatchError::UnknownModule(id.to_string()))
    }
}

impl Drop for RackState {
    fn drop(&mut self) {
        // readers hold their upstream cores; resetting breaks feedback cycles
        drop(self.listen.restore(Box::new(Value(0.0))));
        for module in self.modules.values() {
            module.reset();
        }
    }
}

/// Mounted modules plus the root input pulled once per block.
pub struct Rack {
    sample_rate: f32,
    state: Mutex<RackState>,
}

impl Rack {
    /// Creates an empty rack. `listen` starts silent.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            state: Mutex::new(RackState {
                modules: BTreeMap::new(),
                listen: Buffer::new(Box::new(Value(0.0))),
                listen_desc: SourceDesc::Constant(0.0),
            }),
        }
    }

    /// Sample rate literals patched into `listen` are resolved at.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Mounts `module` and returns its id.
    pub fn add(&self, module: Module) -> String {
        let id = module.id().to_string();

        #[cfg(feature = "tracing")]
        tracing::info!(module = %id, kind = module.kind(), "rack add");

        self.state.lock().modules.insert(id.clone(), module);
        id
    }

    /// Looks up a mounted module.
    pub fn get(&self, id: &str) -> Option<Module> {
        self.state.lock().modules.get(id).cloned()
    }

    /// Ids of every mounted module, sorted.
    pub fn modules(&self) -> Vec<String> {
        self.state.lock().modules.keys().cloned().collect()
    }

    /// Builds a port on a mounted module, checking that the output exists.
    pub fn port(&self, id: &str, output: &str) -> Result<Port, PatchError> {
        let state = self.state.lock();
        let module = state.module(id)?;
        if !module.outputs().iter().any(|o| o.name == output) {
            return Err(PatchError::UnknownOutput {
                module: id.to_string(),
                output: output.to_string(),
            });
        }
        Ok(Port::new(module, output))
    }

    /// Patches `input` on module `id`.
    pub fn patch(&self, id: &str, input: &str, source: Source) -> Result<(), PatchError> {
        let state = self.state.lock();
        state.module(id)?.patch(input, source)
    }

    /// Wires `input` on module `id` to zero.
    pub fn unpatch(&self, id: &str, input: &str) -> Result<(), PatchError> {
        let state = self.state.lock();
        state.module(id)?.unpatch(input)
    }

    /// Resets module `id`.
    pub fn reset(&self, id: &str) -> Result<(), PatchError> {
        let state = self.state.lock();
        state.module(id)?.reset();
        Ok(())
    }

    /// Wires the root to `source`.
    pub fn listen(&self, source: Source) -> Result<(), PatchError> {
        let (processor, desc) = source.resolve(self.sample_rate)?;

        #[cfg(feature = "tracing")]
        tracing::info!(source = %desc, "rack listen");

        let mut state = self.state.lock();
        let old = state.listen.set_source(processor);
        state.listen_desc = desc;
        drop(state);
        drop(old);
        Ok(())
    }

    /// What the root is wired to.
    pub fn listening(&self) -> SourceDesc {
        self.state.lock().listen_desc.clone()
    }

    /// Unmounts module `id`.
    ///
    /// The module is reset, closing every port it holds, and every input in
    /// the rack wired to it is unpatched.
    pub fn remove(&self, id: &str) -> Result<Module, PatchError> {
        let mut state = self.state.lock();
        let module = state
            .modules
            .remove(id)
            .ok_or_else(|| PatchError::UnknownModule(id.to_string()))?;

        // revoked readers stop reporting their port, so unpatch before reset
        for other in state.modules.values() {
            for input in other.inputs() {
                if input.source.references(id) {
                    other.unpatch(&input.name)?;
                }
            }
        }
        if state.listen_desc.references(id) {
            let old = state.listen.set_source(Box::new(Value(0.0)));
            state.listen_desc = SourceDesc::Constant(0.0);
            drop(old);
        }
        module.reset();

        #[cfg(feature = "tracing")]
        tracing::info!(module = %id, "rack remove");

        Ok(module)
    }

    /// Produces one block.
    ///
    /// Pulls the root, runs the sink pass over every mounted module, then
    /// closes the block on each of them.
    pub fn fill(&self, frame: &mut Frame) {
        let mut state = self.state.lock();
        Self::produce(&mut state, frame);
    }

    /// Produces one block unless a control operation holds the rack, in
    /// which case `frame` is silenced and `false` is returned.
    pub fn try_fill(&self, frame: &mut Frame) -> bool {
        match self.state.try_lock() {
            Some(mut state) => {
                Self::produce(&mut state, frame);
                true
            }
            None => {
                frame.fill(0.0);
                false
            }
        }
    }

    fn produce(state: &mut RackState, frame: &mut Frame) {
        frame.copy_from_slice(state.listen.read());
        for module in state.modules.values() {
            module.sink();
        }
        for module in state.modules.values() {
            module.end_block();
        }
    }
}

impl core::fmt::Debug for Rack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rack")
            .field("sample_rate", &self.sample_rate)
            .field("modules", &self.modules())
            .finish_non_exhaustive()
    }
}
