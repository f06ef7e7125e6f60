//! Operations: transient modes that temporarily own input on top of the
//! revision list.
//!
//! An operation advertises its capabilities through the `Operation` trait
//! rather than through its concrete type:
//! - `is_editing` / `is_overlay`: receives every key before the engine looks at
//!   navigation.
//! - `is_focused`: receives keys the engine does not treat as navigation.
//! - `tracks_selected_revision`: is told the cursor commit after every update.
//! - `render_marker`: decorates rows it affects.
//!
//! Operations never touch the row store. They report what they want through
//! `OpOutcome`, and the engine turns that into commands, flashes, or a reset of
//! the slot.

use std::fmt;

use core_actions::{CommandTask, Intent};
use core_events::KeyEvent;
use core_keymap::KeyMap;
use core_model::Commit;

mod abandon;
mod describe;
mod details;
mod rebase;
mod squash;

pub use abandon::Abandon;
pub use describe::InlineDescribe;
pub use details::{ChangedFile, Details, parse_diff_summary};
pub use rebase::Rebase;
pub use squash::Squash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Default,
    Details,
    InlineDescribe,
    Abandon,
    Rebase,
    Squash,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Default => "default",
            OperationKind::Details => "details",
            OperationKind::InlineDescribe => "describe",
            OperationKind::Abandon => "abandon",
            OperationKind::Rebase => "rebase",
            OperationKind::Squash => "squash",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an operation asks of the engine after seeing input.
#[derive(Debug, Clone, PartialEq)]
pub enum OpOutcome {
    /// Not consumed.
    Ignored,
    Handled,
    /// Return the slot to the default mode.
    Close,
    Run(CommandTask),
    /// Consumed, with an error to show the user.
    Flash(String),
}

pub trait Operation: Send {
    fn kind(&self) -> OperationKind;

    fn is_focused(&self) -> bool {
        false
    }

    fn is_editing(&self) -> bool {
        false
    }

    fn is_overlay(&self) -> bool {
        false
    }

    fn tracks_selected_revision(&self) -> bool {
        false
    }

    fn handle_key(&mut self, _key: &KeyEvent, _keymap: &KeyMap) -> OpOutcome {
        OpOutcome::Ignored
    }

    fn handle_intent(&mut self, _intent: &Intent) -> OpOutcome {
        OpOutcome::Ignored
    }

    fn set_selected_revision(&mut self, _commit: &Commit) {}

    /// Marker drawn after the revision line of `commit`.
    fn render_marker(&self, _commit: &Commit, _is_cursor: bool) -> Option<String> {
        None
    }

    /// Lines drawn over the list while `is_overlay` holds.
    fn overlay_lines(&self) -> Vec<String> {
        Vec::new()
    }

    /// One-line key help for the status bar.
    fn help(&self, _keymap: &KeyMap) -> Option<String> {
        None
    }
}

/// Plain navigation mode.
#[derive(Debug, Default)]
pub struct DefaultOperation;

impl Operation for DefaultOperation {
    fn kind(&self) -> OperationKind {
        OperationKind::Default
    }
}

/// Holds exactly one operation; the default mode when nothing else is active.
pub struct OperationSlot {
    active: Box<dyn Operation>,
}

impl Default for OperationSlot {
    fn default() -> Self {
        Self {
            active: Box::new(DefaultOperation),
        }
    }
}

impl fmt::Debug for OperationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSlot")
            .field("kind", &self.kind())
            .finish()
    }
}

impl OperationSlot {
    pub fn get(&self) -> &dyn Operation {
        self.active.as_ref()
    }

    pub fn get_mut(&mut self) -> &mut dyn Operation {
        self.active.as_mut()
    }

    pub fn kind(&self) -> OperationKind {
        self.active.kind()
    }

    pub fn is_default(&self) -> bool {
        self.kind() == OperationKind::Default
    }

    pub fn replace(&mut self, op: Box<dyn Operation>) {
        tracing::debug!(target: "revisions.dispatch", from = %self.kind(), to = %op.kind(), "operation_replaced");
        self.active = op;
    }

    pub fn reset(&mut self) {
        if !self.is_default() {
            self.replace(Box::new(DefaultOperation));
        }
    }

    /// Editing and overlay operations swallow every key.
    pub fn captures_all_input(&self) -> bool {
        self.active.is_editing() || self.active.is_overlay()
    }
}
