//! Style spans layered over composed text.
//!
//! Text is laid out first; highlights that depend on where text landed
//! (cursor row, quick-search matches) are collected as spans and applied in
//! one pass afterwards. Spans are line-local with half-open `[start_col,
//! end_col)` visual column ranges and never split a cluster, since callers
//! derive columns from the same width table used for layout.

use crate::{CellFlags, Frame, text_width};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleAttr {
    Cursor,
    SearchMatch,
}

impl StyleAttr {
    fn flags(self) -> CellFlags {
        match self {
            StyleAttr::Cursor => CellFlags::REVERSE,
            StyleAttr::SearchMatch => CellFlags::UNDERLINE | CellFlags::BOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleSpan {
    pub line: u16,
    pub start_col: u16,
    pub end_col: u16,
    pub attr: StyleAttr,
}

impl StyleSpan {
    pub fn width(&self) -> u16 {
        self.end_col.saturating_sub(self.start_col)
    }
}

#[derive(Default, Debug)]
pub struct StyleLayer {
    pub spans: Vec<StyleSpan>,
}

impl StyleLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, span: StyleSpan) {
        if span.width() > 0 {
            self.spans.push(span);
        }
    }

    /// Full-width span for every screen line of the cursor row.
    pub fn cursor_lines(&mut self, lines: impl IntoIterator<Item = u16>, width: u16) {
        for line in lines {
            self.push(StyleSpan {
                line,
                start_col: 0,
                end_col: width,
                attr: StyleAttr::Cursor,
            });
        }
    }

    /// Underline every case-insensitive occurrence of `term` (already
    /// lowercase) inside `text`, which was drawn starting at column `x`.
    pub fn search_matches(&mut self, line: u16, x: u16, text: &str, term: &str) {
        for (start, end) in find_matches(text, term) {
            let start_col = x.saturating_add(text_width(&text[..start]) as u16);
            let end_col = x.saturating_add(text_width(&text[..end]) as u16);
            self.push(StyleSpan {
                line,
                start_col,
                end_col,
                attr: StyleAttr::SearchMatch,
            });
        }
    }

    pub fn apply(&self, frame: &mut Frame) {
        for span in &self.spans {
            frame.apply_flags_span(span.start_col, span.line, span.width(), span.attr.flags());
        }
    }
}

/// Byte ranges in `text` whose lowercase form equals `term`. Matching is
/// per character so ranges always fall on char boundaries of `text`.
fn find_matches(text: &str, term: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if term.is_empty() {
        return out;
    }
    let indices: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;
    while i < indices.len() {
        let mut lowered = String::new();
        let mut j = i;
        while j < indices.len() && lowered.len() < term.len() {
            lowered.extend(indices[j].1.to_lowercase());
            j += 1;
        }
        if lowered == term {
            let end = indices.get(j).map_or(text.len(), |(b, _)| *b);
            out.push((indices[i].0, end));
            i = j;
        } else {
            i += 1;
        }
    }
    out
}
