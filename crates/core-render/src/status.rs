//! Status line composition.
//!
//! Two stages: `compose_status` turns the context into ordered
//! `StatusSegment`s, `format_status` renders them into left and right
//! halves. The left half describes the list (revset, row count, loading,
//! checked count, search term, operation); the right half carries either the
//! current flash message or the operation's key help. While the quick-search
//! prompt is open it replaces the whole line.

use std::fmt::Write as _;

use crate::{CellFlags, Frame, Tone, text_width};

/// Everything the status line shows, gathered by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusContext<'a> {
    pub revset: &'a str,
    pub rows: usize,
    pub has_more: bool,
    pub loading: bool,
    pub checked: usize,
    pub quick_search: &'a str,
    /// Active operation name; `None` for the default mode.
    pub operation: Option<&'static str>,
    /// Open quick-search prompt buffer.
    pub prompt: Option<&'a str>,
    /// Flash text and whether it is an error.
    pub flash: Option<(&'a str, bool)>,
    pub help: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment<'a> {
    Prompt(&'a str),
    Revset(&'a str),
    Rows { count: usize, more: bool },
    Loading,
    Checked(usize),
    Search(&'a str),
    Operation(&'static str),
    Flash { text: &'a str, error: bool },
    Help(&'a str),
}

pub fn compose_status<'a>(ctx: &StatusContext<'a>) -> Vec<StatusSegment<'a>> {
    if let Some(prompt) = ctx.prompt {
        return vec![StatusSegment::Prompt(prompt)];
    }
    let mut out = Vec::with_capacity(8);
    out.push(StatusSegment::Revset(ctx.revset));
    out.push(StatusSegment::Rows {
        count: ctx.rows,
        more: ctx.has_more,
    });
    if ctx.loading {
        out.push(StatusSegment::Loading);
    }
    if ctx.checked > 0 {
        out.push(StatusSegment::Checked(ctx.checked));
    }
    if !ctx.quick_search.is_empty() {
        out.push(StatusSegment::Search(ctx.quick_search));
    }
    if let Some(op) = ctx.operation {
        out.push(StatusSegment::Operation(op));
    }
    match (ctx.flash, ctx.help) {
        (Some((text, error)), _) => out.push(StatusSegment::Flash { text, error }),
        (None, Some(help)) => out.push(StatusSegment::Help(help)),
        (None, None) => {}
    }
    out
}

/// Rendered status halves plus the tone of the right half.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub left: String,
    pub right: String,
    pub right_tone: Tone,
}

pub fn format_status(segments: &[StatusSegment<'_>]) -> StatusLine {
    let mut line = StatusLine::default();
    let left = |part: &str, line: &mut StatusLine| {
        if !line.left.is_empty() {
            line.left.push_str(" | ");
        }
        line.left.push_str(part);
    };
    for seg in segments {
        match seg {
            StatusSegment::Prompt(buf) => {
                let _ = write!(line.left, "/{buf}_");
            }
            StatusSegment::Revset(revset) => {
                let shown = if revset.trim().is_empty() { "(default)" } else { *revset };
                left(shown, &mut line);
            }
            StatusSegment::Rows { count, more } => {
                let plus = if *more { "+" } else { "" };
                left(&format!("{count}{plus} rows"), &mut line);
            }
            StatusSegment::Loading => left("loading…", &mut line),
            StatusSegment::Checked(n) => left(&format!("{n} checked"), &mut line),
            StatusSegment::Search(term) => left(&format!("/{term}"), &mut line),
            StatusSegment::Operation(op) => left(&format!("[{op}]"), &mut line),
            StatusSegment::Flash { text, error } => {
                line.right = first_line(text).to_string();
                line.right_tone = if *error { Tone::Error } else { Tone::Info };
            }
            StatusSegment::Help(help) => {
                line.right = help.to_string();
                line.right_tone = Tone::Muted;
            }
        }
    }
    line
}

pub fn build_status(ctx: &StatusContext<'_>) -> StatusLine {
    format_status(&compose_status(ctx))
}

/// Paint the status line into row `y`. The right half is right-aligned and
/// wins over the left half when both do not fit.
pub fn paint_status(frame: &mut Frame, y: u16, status: &StatusLine) {
    let w = frame.width;
    let right_w = (text_width(&status.right) as u16).min(w);
    let right_x = w - right_w;
    let left_limit = if right_w == 0 { w } else { right_x.saturating_sub(1) };
    let mut x = 0;
    let mut buf = [0u8; 4];
    for ch in status.left.chars() {
        let ch = ch.encode_utf8(&mut buf);
        if x + text_width(ch) as u16 > left_limit {
            break;
        }
        x = frame.put_str(x, y, ch, CellFlags::BOLD, Tone::Plain);
    }
    if right_w > 0 {
        frame.put_str(right_x, y, &status.right, CellFlags::empty(), status.right_tone);
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
