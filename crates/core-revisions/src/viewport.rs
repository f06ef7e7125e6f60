//! Visible window over the row list, measured in rows with per-row heights.

use core_model::Row;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub first_row: usize,
    /// Screen lines available to the list.
    pub height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            first_row: 0,
            height,
        }
    }

    /// Index of the last row at least partly on screen. Rows not loaded yet
    /// count as one line each, so the result may lie past the loaded rows.
    pub fn last_row(&self, rows: &[Row]) -> usize {
        if self.height == 0 {
            return self.first_row;
        }
        let mut used = 0;
        let mut idx = self.first_row;
        loop {
            used += rows.get(idx).map_or(1, Row::height);
            if used >= self.height {
                return idx;
            }
            idx += 1;
        }
    }

    /// Rows moved by a page motion.
    pub fn page_span(&self, rows: &[Row]) -> usize {
        self.last_row(rows)
            .saturating_sub(self.first_row)
            .saturating_sub(1)
            .max(1)
    }

    fn fits(&self, cursor: usize, rows: &[Row]) -> bool {
        let used: usize = (self.first_row..=cursor)
            .map(|idx| rows.get(idx).map_or(1, Row::height))
            .sum();
        used <= self.height
    }

    /// Scroll the minimum amount that puts `cursor` fully on screen.
    pub fn ensure_visible(&mut self, cursor: usize, rows: &[Row]) -> bool {
        let before = self.first_row;
        if cursor < self.first_row {
            self.first_row = cursor;
        } else {
            while self.first_row < cursor && !self.fits(cursor, rows) {
                self.first_row += 1;
            }
        }
        before != self.first_row
    }

    /// Move the window by `delta` rows, keeping at least one row visible.
    pub fn scroll(&mut self, delta: isize, row_count: usize) -> bool {
        let before = self.first_row;
        let max_first = row_count.saturating_sub(1);
        self.first_row = self.first_row.saturating_add_signed(delta).min(max_first);
        before != self.first_row
    }

    pub fn clamp(&mut self, row_count: usize) {
        self.first_row = self.first_row.min(row_count.saturating_sub(1));
    }
}
