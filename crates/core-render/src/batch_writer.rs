//! Batching writer.
//!
//! Consecutive cells sharing flags and tone are merged into a single
//! `Print`, with one `Style` command at each style change. Any `MoveTo` or
//! `ClearLine` ends the current run and forces the next print to restate
//! its style.
//!
//! Metrics:
//! * `print_commands`: `Print` commands issued after batching.
//! * `cells_printed`: leader cells written. `print_commands <= cells_printed`
//!   always holds.

use std::io::Write;
use std::mem;

use anyhow::Result;

use crate::writer::{Command, emit};
use crate::{CellFlags, Frame, Tone};

#[derive(Debug, Default)]
pub struct BatchWriter {
    cmds: Vec<Command>,
    pending: String,
    style: Option<(CellFlags, Tone)>,
    pub print_commands: u64,
    pub cells_printed: u64,
}

impl BatchWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.cmds.push(Command::Print(mem::take(&mut self.pending)));
        self.print_commands += 1;
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.flush_pending();
        self.style = None;
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub fn clear_line(&mut self, y: u16) {
        self.flush_pending();
        self.style = None;
        self.cmds.push(Command::ClearLine(y));
    }

    pub fn print_cell(&mut self, cluster: &str, flags: CellFlags, tone: Tone) {
        if cluster.is_empty() {
            return;
        }
        if self.style != Some((flags, tone)) {
            self.flush_pending();
            self.cmds.push(Command::Style(flags, tone));
            self.style = Some((flags, tone));
        }
        self.pending.push_str(cluster);
        self.cells_printed += 1;
    }

    /// Repaint row `y` of `frame` from column 0.
    pub fn paint_line(&mut self, frame: &Frame, y: u16) {
        self.move_to(0, y);
        self.clear_line(y);
        let leaders: Vec<_> = frame.row_leaders(y).collect();
        // Trailing default blanks are covered by the clear.
        let end = leaders
            .iter()
            .rposition(|(c, _, flags, tone, _)| *c != " " || !flags.is_empty() || *tone != Tone::Plain)
            .map_or(0, |i| i + 1);
        for (cluster, _, flags, tone, _) in &leaders[..end] {
            self.print_cell(cluster, *flags, *tone);
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn finish(mut self) -> (Vec<Command>, u64, u64) {
        self.flush_pending();
        (self.cmds, self.print_commands, self.cells_printed)
    }

    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<(u64, u64)> {
        let (cmds, prints, cells) = self.finish();
        emit(out, cmds)?;
        Ok((prints, cells))
    }
}
