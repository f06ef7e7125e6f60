//! Frame diffing and emission.
//!
//! The engine keeps the last frame it painted. A new frame of the same size
//! repaints only the lines whose cells differ; the first frame, a size
//! change or an explicit invalidation repaints every line.

use std::io::Write;
use std::sync::atomic::Ordering;
use std::time::Instant;

use anyhow::Result;
use tracing::trace;

use crate::Frame;
use crate::batch_writer::BatchWriter;
use crate::metrics::{RenderMetrics, RenderMetricsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintKind {
    Full,
    Lines,
    Skipped,
}

#[derive(Debug, Default)]
pub struct RenderEngine {
    prev: Option<Frame>,
    metrics: RenderMetrics,
    last_repaint_lines: Vec<u16>,
    last_repaint_kind: Option<RepaintKind>,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached frame so the next render repaints everything.
    pub fn invalidate_for_resize(&mut self) {
        self.prev = None;
        RenderMetrics::add(&self.metrics.resize_invalidations, 1);
    }

    pub fn render<W: Write>(&mut self, frame: Frame, out: &mut W) -> Result<RepaintKind> {
        let started = Instant::now();
        let (kind, lines) = match &self.prev {
            Some(prev) if prev.width == frame.width && prev.height == frame.height => {
                let changed: Vec<u16> = (0..frame.height).filter(|&y| prev.line(y) != frame.line(y)).collect();
                let kind = if changed.is_empty() { RepaintKind::Skipped } else { RepaintKind::Lines };
                (kind, changed)
            }
            _ => (RepaintKind::Full, (0..frame.height).collect()),
        };

        if kind == RepaintKind::Skipped {
            RenderMetrics::add(&self.metrics.skipped_frames, 1);
        } else {
            let mut writer = BatchWriter::new();
            for &y in &lines {
                writer.paint_line(&frame, y);
            }
            let (prints, cells) = writer.flush_to(out)?;
            let m = &self.metrics;
            RenderMetrics::add(&m.print_commands, prints);
            RenderMetrics::add(&m.cells_printed, cells);
            RenderMetrics::add(&m.lines_repainted, lines.len() as u64);
            match kind {
                RepaintKind::Full => RenderMetrics::add(&m.full_frames, 1),
                _ => RenderMetrics::add(&m.partial_frames, 1),
            }
            let ns = started.elapsed().as_nanos().min(u64::MAX as u128) as u64;
            m.last_render_ns.store(ns, Ordering::Relaxed);
            trace!(target: "render", ?kind, lines = lines.len(), prints, cells, "frame");
        }

        self.last_repaint_lines = lines;
        self.last_repaint_kind = Some(kind);
        self.prev = Some(frame);
        Ok(kind)
    }

    pub fn metrics_snapshot(&self) -> RenderMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn last_repaint_lines(&self) -> &[u16] {
        &self.last_repaint_lines
    }

    pub fn last_repaint_kind(&self) -> Option<RepaintKind> {
        self.last_repaint_kind
    }
}
