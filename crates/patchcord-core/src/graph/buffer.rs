//! Single-owner caching wrapper around one upstream [`Processor`].
//!
//! A [`Buffer`] is the unit of wiring: every module input holds one, and
//! patching replaces the source inside it without the consumer noticing.

use super::frame::{Frame, Processor, new_frame};

/// Owns exactly one upstream source and the last frame it produced.
pub struct Buffer {
    source: Box<dyn Processor>,
    frame: Box<Frame>,
}

impl Buffer {
    /// Wraps `source`. The cache starts zeroed.
    pub fn new(source: Box<dyn Processor>) -> Self {
        Self {
            source,
            frame: new_frame(),
        }
    }

    /// Pulls the source into the cache and returns it.
    #[inline]
    pub fn read(&mut self) -> &Frame {
        self.source.process(&mut self.frame);
        &self.frame
    }

    /// Returns the frame produced by the most recent [`read`](Self::read)
    /// without pulling the source again.
    #[inline]
    pub fn read_cached(&self) -> &Frame {
        &self.frame
    }

    /// Replaces the innermost source and returns the displaced one.
    ///
    /// If the current source is itself a buffer, the call recurses into it so
    /// the whole wrapper chain stays in place and only its tail is rewired.
    /// Dropping the returned processor releases whatever it held upstream.
    pub fn set_source(&mut self, source: Box<dyn Processor>) -> Box<dyn Processor> {
        match self.source.as_buffer_mut() {
            Some(inner) => inner.set_source(source),
            None => std::mem::replace(&mut self.source, source),
        }
    }

    /// Replaces the outermost source, discarding any nested wrappers.
    pub fn restore(&mut self, source: Box<dyn Processor>) -> Box<dyn Processor> {
        std::mem::replace(&mut self.source, source)
    }

    /// Returns how many buffers are nested inside this one.
    pub fn depth(&mut self) -> usize {
        match self.source.as_buffer_mut() {
            Some(inner) => 1 + inner.depth(),
            None => 0,
        }
    }
}

impl Processor for Buffer {
    fn process(&mut self, frame: &mut Frame) {
        frame.copy_from_slice(self.read());
    }

    fn as_buffer_mut(&mut self) -> Option<&mut Buffer> {
        Some(self)
    }

    fn is_live(&self) -> bool {
        self.source.is_live()
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("cached", &self.frame[0])
            .finish_non_exhaustive()
    }
}
