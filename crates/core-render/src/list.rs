//! Revision list layout.
//!
//! Rows are drawn from the viewport's first row downwards, one screen line
//! per graph line, until the list area is full. The first two columns hold
//! the checked mark. Operation markers follow the revision line's text.

use std::borrow::Cow;

use core_model::{GraphRowLine, LineFlags, Row, Segment, SegmentRole};
use core_operations::OperationKind;
use core_revisions::RevisionsModel;

use crate::overlay::paint_overlay;
use crate::status::{StatusContext, build_status, paint_status};
use crate::style::StyleLayer;
use crate::{CellFlags, Frame, Tone};

const CHECK_MARK: &str = "✓ ";
const NO_MARK: &str = "  ";

/// Runtime-owned pieces of the status line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chrome<'a> {
    pub prompt: Option<&'a str>,
    pub flash: Option<(&'a str, bool)>,
}

/// Screen line → row index, for mouse hit testing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap {
    rows: Vec<Option<usize>>,
}

impl LineMap {
    pub fn row_at(&self, y: u16) -> Option<usize> {
        self.rows.get(y as usize).copied().flatten()
    }
}

pub fn compose_frame(model: &RevisionsModel, chrome: Chrome<'_>, width: u16, height: u16) -> (Frame, LineMap) {
    let mut frame = Frame::new(width, height);
    let mut map = LineMap {
        rows: vec![None; height as usize],
    };
    if width == 0 || height == 0 {
        return (frame, map);
    }
    let list_h = height - 1;
    let rows = model.rows();
    let op = model.operation();
    let search = model.quick_search();
    let mut styles = StyleLayer::new();

    if rows.is_empty() && list_h > 0 {
        let text = if model.is_loading() { "Loading revisions…" } else { "No revisions" };
        frame.put_str(2, 0, text, CellFlags::DIM, Tone::Muted);
    }

    let mut y = 0u16;
    let mut idx = model.viewport().first_row;
    while y < list_h && idx < rows.len() {
        let row = &rows[idx];
        let is_cursor = model.cursor() == Some(idx);
        let checked = model.checked().contains(&row.commit);
        let marker = op.render_marker(&row.commit, is_cursor);
        let lines = row_lines(row);
        let marker_line = lines
            .iter()
            .position(|l| l.flags.contains(LineFlags::REVISION))
            .unwrap_or(0);
        let start_y = y;
        for (n, line) in lines.iter().enumerate() {
            if y >= list_h {
                break;
            }
            let ctx = LineCtx {
                row,
                mark: if checked && n == 0 { CHECK_MARK } else { NO_MARK },
                marker: marker.as_deref().filter(|_| n == marker_line),
                search,
            };
            draw_line(&mut frame, &mut styles, y, line, &ctx);
            map.rows[y as usize] = Some(idx);
            y += 1;
        }
        if is_cursor {
            styles.cursor_lines(start_y..y, width);
        }
        idx += 1;
    }
    styles.apply(&mut frame);

    if op.is_overlay() {
        let painted = paint_overlay(&mut frame, &op.overlay_lines(), list_h);
        for line in painted {
            map.rows[line as usize] = None;
        }
    }

    let help = op.help(model.keymap());
    let kind = op.kind();
    let status = StatusContext {
        revset: model.revset(),
        rows: rows.len(),
        has_more: model.has_more(),
        loading: model.is_loading(),
        checked: model.checked().len(),
        quick_search: search,
        operation: (kind != OperationKind::Default).then(|| kind.name()),
        prompt: chrome.prompt,
        flash: chrome.flash,
        help: help.as_deref(),
    };
    paint_status(&mut frame, list_h, &build_status(&status));
    (frame, map)
}

struct LineCtx<'a> {
    row: &'a Row,
    mark: &'static str,
    marker: Option<&'a str>,
    search: &'a str,
}

fn row_lines(row: &Row) -> Cow<'_, [GraphRowLine]> {
    if !row.lines.is_empty() {
        return Cow::Borrowed(&row.lines);
    }
    Cow::Owned(vec![GraphRowLine {
        gutter: Vec::new(),
        segments: vec![
            Segment::with_role(row.commit.change_id.clone(), SegmentRole::ChangeId),
            Segment::with_role(row.commit.description.clone(), SegmentRole::Description),
        ],
        flags: LineFlags::REVISION,
    }])
}

fn draw_line(frame: &mut Frame, styles: &mut StyleLayer, y: u16, line: &GraphRowLine, ctx: &LineCtx<'_>) {
    let mut x = frame.put_str(0, y, ctx.mark, CellFlags::BOLD, Tone::Marker);
    for seg in &line.gutter {
        x = frame.put_str(x, y, &seg.text, CellFlags::DIM, Tone::Muted);
    }
    let mut first = true;
    for seg in line.segments.iter().filter(|s| !s.text.is_empty()) {
        if !first {
            x = frame.put_str(x, y, " ", CellFlags::empty(), Tone::Plain);
        }
        first = false;
        if !ctx.search.is_empty() {
            styles.search_matches(y, x, &seg.text, ctx.search);
        }
        let (flags, tone) = segment_style(seg.role, ctx.row);
        x = frame.put_str(x, y, &seg.text, flags, tone);
    }
    if let Some(marker) = ctx.marker {
        x = frame.put_str(x, y, " ", CellFlags::empty(), Tone::Plain);
        frame.put_str(x, y, marker, CellFlags::BOLD, Tone::Marker);
    }
}

fn segment_style(role: SegmentRole, row: &Row) -> (CellFlags, Tone) {
    match role {
        SegmentRole::ChangeId => {
            let flags = if row.commit.is_working_copy { CellFlags::BOLD } else { CellFlags::empty() };
            let tone = if row.is_affected { Tone::Affected } else { Tone::ChangeId };
            (flags, tone)
        }
        SegmentRole::CommitId => (CellFlags::empty(), Tone::CommitId),
        SegmentRole::Bookmark => (CellFlags::empty(), Tone::Bookmark),
        SegmentRole::Author => (CellFlags::empty(), Tone::Author),
        SegmentRole::Description if row.is_affected => (CellFlags::empty(), Tone::Affected),
        SegmentRole::Description | SegmentRole::Text => (CellFlags::empty(), Tone::Plain),
    }
}
