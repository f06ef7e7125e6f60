//! Runtime-owned status pieces: the flash message and the quick-search
//! prompt. Neither belongs to the engine.

use std::time::{Duration, Instant};

use core_events::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub text: String,
    pub error: bool,
    pub expires_at: Instant,
}

/// At most one flash at a time; a new one replaces the old.
#[derive(Debug, Default)]
pub struct FlashSlot {
    current: Option<Flash>,
}

impl FlashSlot {
    pub fn set(&mut self, text: impl Into<String>, error: bool, ttl: Duration) {
        self.current = Some(Flash {
            text: text.into(),
            error,
            expires_at: Instant::now() + ttl,
        });
    }

    /// Clear an expired flash; returns true when one was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|f| now >= f.expires_at) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn get(&self) -> Option<(&str, bool)> {
        self.current.as_ref().map(|f| (f.text.as_str(), f.error))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Still editing.
    Pending,
    Submit(String),
    Cancel,
}

/// Single-line quick-search prompt.
#[derive(Debug, Default)]
pub struct Prompt {
    buffer: Option<String>,
}

impl Prompt {
    pub fn open(&mut self) {
        self.buffer = Some(String::new());
    }

    pub fn is_open(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.buffer.as_deref()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptOutcome {
        let Some(buffer) = self.buffer.as_mut() else {
            return PromptOutcome::Cancel;
        };
        match key.code {
            KeyCode::Enter => {
                let term = std::mem::take(buffer);
                self.buffer = None;
                PromptOutcome::Submit(term)
            }
            KeyCode::Esc => {
                self.buffer = None;
                PromptOutcome::Cancel
            }
            KeyCode::Backspace => {
                buffer.pop();
                PromptOutcome::Pending
            }
            KeyCode::Char(c) if !key.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
                buffer.push(c);
                PromptOutcome::Pending
            }
            _ => PromptOutcome::Pending,
        }
    }
}
