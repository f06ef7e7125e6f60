//! Operation overlay drawn over the bottom of the list area, directly above
//! the status line, under a one-line rule. Lines that do not fit are
//! dropped from the end; at least one list line stays visible.

use crate::{CellFlags, Frame, Tone};

const RULE: char = '─';

/// Paint `lines` into the list area of height `list_h`. Returns the screen
/// rows covered, rule included.
pub fn paint_overlay(frame: &mut Frame, lines: &[String], list_h: u16) -> Vec<u16> {
    if lines.is_empty() || list_h < 3 {
        return Vec::new();
    }
    let room = list_h as usize - 2;
    let shown = &lines[..lines.len().min(room)];
    let first_row = list_h - 1 - shown.len() as u16;
    let w = frame.width;

    let mut covered = Vec::with_capacity(shown.len() + 1);
    clear_row(frame, first_row);
    let rule: String = std::iter::repeat_n(RULE, w as usize).collect();
    frame.put_str(0, first_row, &rule, CellFlags::DIM, Tone::Muted);
    covered.push(first_row);

    for (i, line) in shown.iter().enumerate() {
        let y = first_row + 1 + i as u16;
        clear_row(frame, y);
        let (flags, tone) = if i == 0 {
            (CellFlags::BOLD, Tone::Plain)
        } else if line.starts_with('>') {
            (CellFlags::REVERSE, Tone::Plain)
        } else {
            (CellFlags::empty(), Tone::Plain)
        };
        frame.put_str(1, y, line, flags, tone);
        covered.push(y);
    }
    covered
}

fn clear_row(frame: &mut Frame, y: u16) {
    let w = frame.width;
    for x in 0..w {
        frame.set_cluster(x, y, " ", 1, CellFlags::empty(), Tone::Plain);
    }
}
