//! Terminal command list and its crossterm emission.
//!
//! Commands keep their order and are queued onto the output in one pass;
//! the output is flushed once at the end. Positions are absolute with a
//! (0, 0) origin and the caller keeps them in bounds.

use std::io::Write;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::{CellFlags, Tone};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    /// Clear the line the cursor is on; preceded by a `MoveTo`.
    ClearLine(u16),
    Style(CellFlags, Tone),
    Print(String),
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Plain => Color::Reset,
        Tone::ChangeId => Color::Magenta,
        Tone::CommitId => Color::Blue,
        Tone::Bookmark => Color::Green,
        Tone::Author => Color::Yellow,
        Tone::Muted => Color::DarkGrey,
        Tone::Marker => Color::Cyan,
        Tone::Affected => Color::Green,
        Tone::Info => Color::Cyan,
        Tone::Error => Color::Red,
    }
}

pub fn emit<W: Write>(out: &mut W, cmds: Vec<Command>) -> Result<()> {
    for cmd in cmds {
        match cmd {
            Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
            Command::ClearLine(_) => queue!(out, Clear(ClearType::CurrentLine))?,
            Command::Style(flags, tone) => {
                queue!(out, SetAttribute(Attribute::Reset))?;
                if flags.contains(CellFlags::REVERSE) {
                    queue!(out, SetAttribute(Attribute::Reverse))?;
                }
                if flags.contains(CellFlags::BOLD) {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if flags.contains(CellFlags::DIM) {
                    queue!(out, SetAttribute(Attribute::Dim))?;
                }
                if flags.contains(CellFlags::UNDERLINE) {
                    queue!(out, SetAttribute(Attribute::Underlined))?;
                }
                queue!(out, SetForegroundColor(tone_color(tone)))?;
            }
            Command::Print(s) => queue!(out, Print(s))?,
        }
    }
    queue!(out, SetAttribute(Attribute::Reset))?;
    out.flush()?;
    Ok(())
}
