//! Repaint counters.
//!
//! Records what the engine actually emitted per frame so tests and the
//! debug log can check that unchanged lines are never repainted.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RenderMetrics {
    /// Frames painted from scratch (first frame, resize, invalidation).
    pub full_frames: AtomicU64,
    /// Frames that repainted only changed lines.
    pub partial_frames: AtomicU64,
    /// Frames with no changed line at all.
    pub skipped_frames: AtomicU64,
    pub lines_repainted: AtomicU64,
    pub resize_invalidations: AtomicU64,
    /// `Print` commands emitted after batching.
    pub print_commands: AtomicU64,
    pub cells_printed: AtomicU64,
    /// Duration (ns) of the most recent non-skipped frame.
    pub last_render_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMetricsSnapshot {
    pub full_frames: u64,
    pub partial_frames: u64,
    pub skipped_frames: u64,
    pub lines_repainted: u64,
    pub resize_invalidations: u64,
    pub print_commands: u64,
    pub cells_printed: u64,
    pub last_render_ns: u64,
}

impl RenderMetrics {
    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RenderMetricsSnapshot {
        RenderMetricsSnapshot {
            full_frames: self.full_frames.load(Ordering::Relaxed),
            partial_frames: self.partial_frames.load(Ordering::Relaxed),
            skipped_frames: self.skipped_frames.load(Ordering::Relaxed),
            lines_repainted: self.lines_repainted.load(Ordering::Relaxed),
            resize_invalidations: self.resize_invalidations.load(Ordering::Relaxed),
            print_commands: self.print_commands.load(Ordering::Relaxed),
            cells_printed: self.cells_printed.load(Ordering::Relaxed),
            last_render_ns: self.last_render_ns.load(Ordering::Relaxed),
        }
    }
}
