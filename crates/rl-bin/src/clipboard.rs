//! System clipboard backed by `arboard`.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use core_revisions::{Clipboard, MemoryClipboard};
use tracing::{debug, warn};

pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("system clipboard unavailable")?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| anyhow!("clipboard lock poisoned"))?;
        inner
            .set_text(text.to_string())
            .context("failed to write clipboard")?;
        debug!(target: "runtime.clipboard", bytes = text.len(), "clipboard_written");
        Ok(())
    }
}

/// The system clipboard, or an in-process one when none is reachable
/// (headless sessions, missing display server).
pub fn open_clipboard() -> Arc<dyn Clipboard> {
    match SystemClipboard::new() {
        Ok(clipboard) => Arc::new(clipboard),
        Err(err) => {
            warn!(target: "runtime.clipboard", error = %err, "clipboard_fallback_memory");
            Arc::new(MemoryClipboard::default())
        }
    }
}
