//! Block sample type and the pull capability shared by every signal source.

/// Number of samples in one [`Frame`].
///
/// Process-wide constant: every pull in the graph produces exactly this many
/// samples.
pub const FRAME_SIZE: usize = 256;

/// One fixed-length block of samples produced by a single pull.
pub type Frame = [f32; FRAME_SIZE];

/// Allocates a zeroed frame on the heap.
///
/// Frames are large enough that modules keep them boxed; allocation happens
/// at construction time only.
pub fn new_frame() -> Box<Frame> {
    Box::new([0.0; FRAME_SIZE])
}

/// Anything that can fill a [`Frame`] when pulled.
///
/// Constants, module outputs and intermediate buffers all implement this.
/// Implementations must write every element of `frame` and must not keep a
/// reference to it after returning.
pub trait Processor: Send {
    /// Fills `frame` with the next block of samples.
    fn process(&mut self, frame: &mut Frame);

    /// Returns the wrapped [`Buffer`](super::Buffer) when this processor is a
    /// settable wrapper around another source.
    ///
    /// [`Buffer::set_source`](super::Buffer::set_source) uses this to rewire
    /// the innermost source of nested wrappers.
    fn as_buffer_mut(&mut self) -> Option<&mut super::Buffer> {
        None
    }

    /// Returns `false` once the processor can only produce silence because
    /// the output it reads was revoked.
    fn is_live(&self) -> bool {
        true
    }
}

impl Processor for Box<dyn Processor> {
    fn process(&mut self, frame: &mut Frame) {
        (**self).process(frame);
    }

    fn as_buffer_mut(&mut self) -> Option<&mut super::Buffer> {
        (**self).as_buffer_mut()
    }

    fn is_live(&self) -> bool {
        (**self).is_live()
    }
}
