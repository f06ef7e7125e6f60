use std::sync::atomic::{AtomicU64, Ordering};

/// Load generation counter. Every refresh advances it; results carrying any
/// other value are stale.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Start a new generation and return its tag.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, tag: u64) -> bool {
        self.current() == tag
    }
}
