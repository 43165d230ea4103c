//! Pull-based signal graph for the patchcord modular engine.
//!
//! Modules expose named inputs and outputs. Patching an input to another
//! module's output hands the input a reader for that output; pulling the
//! reader runs the upstream module. A block is produced by pulling the
//! [`Rack`]'s `listen` root, which recursively pulls everything reachable
//! from it, bottoming out in constants.
//!
//! # Architecture
//!
//! - [`Processor`]: anything that fills a [`Frame`] when pulled.
//! - [`Buffer`]: one upstream processor plus its last frame. Every input is a
//!   buffer; patching swaps the source inside it.
//! - [`Io`]: a module's port registry and patching engine.
//! - [`Kernel`]: the per-block computation a module provides, writing one
//!   frame per tap.
//! - [`Unit`]: the standard [`Patcher`] hosting a kernel behind an [`Io`].
//! - [`Rack`]: mounted modules, the root and the coarse control lock.
//!
//! # Multiple outputs
//!
//! A module computes all taps in one step. Each output has at most one
//! reader, and [`ReadTracker`] decides which read opens a new block, so a
//! module advances exactly once per block however many outputs are wired
//! and in whatever order they are pulled.
//!
//! # Feedback
//!
//! A module cannot be patched into one of its own normal inputs. Cycles go
//! through force-sinking inputs ([`InMode::ForceSink`]): the rack pulls them
//! after the root, and the module reads the captured frame on its next step.
//! Such a loop carries one block of latency.
//!
//! # Rewiring
//!
//! [`Patcher::reset`] restores input defaults and revokes outputs. A revoked
//! [`OutputReader`] produces silence until its consumer is repatched.

mod buffer;
mod frame;
mod io;
mod port;
mod rack;
mod source;
mod sync;
mod unit;

pub use buffer::Buffer;
pub use frame::{FRAME_SIZE, Frame, Processor, new_frame};
pub use io::Io;
pub use port::{InMode, InSpec, InputInfo, OutSpec, OutputInfo, OutputReader, Port};
pub use rack::Rack;
pub use source::{Literal, Source, SourceDesc};
pub use sync::ReadTracker;
pub use unit::{Inputs, Kernel, Module, Patcher, Taps, Unit, next_id};
