//! Terminal backend abstraction and crossterm implementation.
//!
//! Entering switches to the alternate screen in raw mode with the cursor
//! hidden; mouse capture and focus reporting are enabled when requested.
//! Leaving undoes exactly what was enabled.

use anyhow::Result;
use crossterm::{
    cursor::Hide,
    cursor::Show,
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::stdout;
use tracing::debug;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Current size as (columns, rows).
    fn size(&self) -> Result<(u16, u16)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalOptions {
    pub mouse: bool,
    pub focus_events: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            mouse: true,
            focus_events: true,
        }
    }
}

pub struct CrosstermBackend {
    options: TerminalOptions,
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new(TerminalOptions::default())
    }
}

impl CrosstermBackend {
    pub fn new(options: TerminalOptions) -> Self {
        Self {
            options,
            entered: false,
        }
    }

    pub fn options(&self) -> TerminalOptions {
        self.options
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            let mut out = stdout();
            execute!(out, EnterAlternateScreen, Hide)?;
            if self.options.mouse {
                execute!(out, EnableMouseCapture)?;
            }
            if self.options.focus_events {
                execute!(out, EnableFocusChange)?;
            }
            self.entered = true;
            debug!(target: "runtime.terminal", mouse = self.options.mouse, "terminal_entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            let mut out = stdout();
            if self.options.focus_events {
                execute!(out, DisableFocusChange)?;
            }
            if self.options.mouse {
                execute!(out, DisableMouseCapture)?;
            }
            execute!(out, LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
            debug!(target: "runtime.terminal", "terminal_left");
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> TerminalGuard<'a> {
    pub fn backend(&mut self) -> &mut CrosstermBackend {
        self.backend
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}
