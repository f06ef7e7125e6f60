//! Frame composition and terminal emission for the revision list.
//!
//! Rendering is a pure function of the engine's read-only surface (rows,
//! cursor, checked set, quick-search term, active operation) plus the
//! runtime's status context. `compose_frame` lays everything out into a
//! `Frame` of cells; `RenderEngine` diffs it against the previous frame and
//! repaints only the lines that changed.
//!
//! Cell model:
//! - Leader: width >= 1, `cluster` non-empty.
//! - Continuation: width == 0, `cluster` empty; follows its leader.
//! - Styling (`CellFlags`, `Tone`) is applied per cell; emission prints
//!   leaders only.
//!
//! Screen layout, top to bottom: list lines, overlay lines (drawn over the
//! bottom of the list while an overlay operation is active), status line.

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

pub mod batch_writer;
pub mod list;
pub mod metrics;
pub mod overlay;
pub mod render_engine;
pub mod status;
pub mod style;
pub mod writer;

pub use list::{LineMap, compose_frame};
pub use render_engine::RenderEngine;
pub use status::{StatusContext, build_status};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        const REVERSE   = 0b0000_0001; // cursor row
        const BOLD      = 0b0000_0010;
        const DIM       = 0b0000_0100;
        const UNDERLINE = 0b0000_1000; // quick-search match
    }
}

/// Foreground colour class; mapped to concrete colours at emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Plain,
    ChangeId,
    CommitId,
    Bookmark,
    Author,
    Muted,
    Marker,
    Affected,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Printable text; empty for continuation cells.
    pub cluster: String,
    /// Columns occupied; 0 marks a continuation cell.
    pub width: u8,
    pub flags: CellFlags,
    pub tone: Tone,
}

impl Cell {
    #[inline]
    pub fn leader(cluster: &str, width: u16, flags: CellFlags, tone: Tone) -> Self {
        Self {
            cluster: cluster.to_string(),
            width: width.clamp(1, u8::MAX as u16) as u8,
            flags,
            tone,
        }
    }

    #[inline]
    pub fn continuation(flags: CellFlags, tone: Tone) -> Self {
        Self {
            cluster: String::new(),
            width: 0,
            flags,
            tone,
        }
    }

    #[inline]
    pub fn is_leader(&self) -> bool {
        self.width > 0
    }

    /// Same flags and tone, so the two can share one styled print.
    #[inline]
    pub fn same_style(&self, other: &Cell) -> bool {
        self.flags == other.flags && self.tone == other.tone
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            cluster: " ".to_string(),
            width: 1,
            flags: CellFlags::empty(),
            tone: Tone::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width as usize) * (height as usize)],
        }
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Cells of row `y`; empty when out of bounds.
    pub fn line(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Place one cluster and its continuation cells. A cluster wider than
    /// the remaining columns is replaced by a blank.
    pub fn set_cluster(&mut self, x: u16, y: u16, cluster: &str, width: u16, flags: CellFlags, tone: Tone) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let w = width.max(1);
        if w > self.width - x {
            self.cells[idx] = Cell::leader(" ", 1, flags, tone);
            return;
        }
        self.cells[idx] = Cell::leader(cluster, w, flags, tone);
        for dx in 1..w {
            if let Some(c_idx) = self.index(x + dx, y) {
                self.cells[c_idx] = Cell::continuation(flags, tone);
            }
        }
    }

    /// Write `text` from column `x`, clipping at the right edge. Zero-width
    /// characters attach to the preceding cluster. Returns the column after
    /// the last cell written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, flags: CellFlags, tone: Tone) -> u16 {
        let mut col = x;
        let mut last: Option<u16> = None;
        for ch in text.chars() {
            let ch = if ch.is_control() { ' ' } else { ch };
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                if let Some(lead) = last
                    && let Some(idx) = self.index(lead, y)
                {
                    self.cells[idx].cluster.push(ch);
                }
                continue;
            }
            if col >= self.width {
                break;
            }
            let mut buf = [0u8; 4];
            self.set_cluster(col, y, ch.encode_utf8(&mut buf), w, flags, tone);
            last = Some(col);
            col = col.saturating_add(w).min(self.width);
        }
        col
    }

    /// Add flags over `[x, x + span)` of row `y`.
    pub fn apply_flags_span(&mut self, x: u16, y: u16, span: u16, flags: CellFlags) {
        let span = span.min(self.width.saturating_sub(x));
        for dx in 0..span {
            if let Some(idx) = self.index(x + dx, y) {
                self.cells[idx].flags |= flags;
            }
        }
    }

    /// Leader cells of row `y` as (cluster, width, flags, tone, start column).
    pub fn row_leaders(&self, y: u16) -> impl Iterator<Item = (&str, u16, CellFlags, Tone, u16)> + '_ {
        let mut x = 0u16;
        self.line(y).iter().filter_map(move |cell| {
            let start = x;
            x += cell.width as u16;
            cell.is_leader()
                .then(|| (cell.cluster.as_str(), cell.width as u16, cell.flags, cell.tone, start))
        })
    }

    /// Row `y` as plain text with trailing blanks removed.
    pub fn line_text(&self, y: u16) -> String {
        let text: String = self.row_leaders(y).map(|(c, ..)| c).collect();
        text.trim_end().to_string()
    }
}

/// Display width of `text` in terminal columns.
pub fn text_width(text: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(text)
}
