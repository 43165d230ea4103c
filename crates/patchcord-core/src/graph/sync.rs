//! Read accounting for modules with several outputs.
//!
//! A module computes every tap in one shared step. Each active output is
//! pulled by its own consumer, at its own point in the block, so the module
//! needs to know which pull is the first of a new block. [`ReadTracker`]
//! answers that question.
//!
//! The primary rule is a counter modulo the number of active outputs: the
//! step runs when the counter is at zero. A consumed-tap mask backs it up: if
//! an output is pulled a second time before its siblings have been served, the
//! siblings were not pulled in the previous block (their consumer is wired but
//! unreachable from the root), and the module steps anyway. Without that
//! fallback an idle consumer would halve the module's rate.
//!
//! Both rules only see reads. A module mounted in a rack is also told when a
//! block ends and [`reset`](ReadTracker::reset)s its tracker, so a block
//! that pulls just some of the active outputs cannot leave the count part
//! way through for the next one.

/// Decides when a multi-output module advances its shared state.
#[derive(Debug, Clone)]
pub struct ReadTracker {
    reads: usize,
    active: usize,
    consumed: Vec<bool>,
}

impl ReadTracker {
    /// Creates a tracker for a module with `outputs` declared outputs.
    pub fn new(outputs: usize) -> Self {
        Self {
            reads: 0,
            active: 0,
            consumed: vec![false; outputs],
        }
    }

    /// Records a read of `output` while `active` outputs are open.
    ///
    /// Returns `true` when the shared step must run before the read is served.
    pub fn begin(&mut self, output: usize, active: usize) -> bool {
        let active = active.max(1);
        if active != self.active {
            self.active = active;
            self.reset();
        }

        let seen = self.consumed.get(output).copied().unwrap_or(false);
        let step = self.reads == 0 || seen;
        if step {
            self.consumed.fill(false);
            self.reads = 0;
        }

        if let Some(slot) = self.consumed.get_mut(output) {
            *slot = true;
        }
        self.reads = (self.reads + 1) % active;
        step
    }

    /// Forgets the reads of the current block.
    pub fn reset(&mut self) {
        self.reads = 0;
        self.consumed.fill(false);
    }

    /// Reads counted in the current block, modulo the active count.
    pub fn reads(&self) -> usize {
        self.reads
    }
}
