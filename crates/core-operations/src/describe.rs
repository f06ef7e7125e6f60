use core_actions::{CommandTask, FollowUp, Intent};
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_jj::JjCommand;
use core_keymap::KeyMap;
use core_model::Commit;

use crate::{OpOutcome, Operation, OperationKind};

/// Single-line description editor for the cursor revision.
#[derive(Debug)]
pub struct InlineDescribe {
    commit: Commit,
    buffer: String,
}

impl InlineDescribe {
    /// Prefilled with the revision's current description.
    pub fn new(commit: Commit) -> Self {
        let buffer = commit.description.clone();
        Self { commit, buffer }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    fn apply(&self) -> OpOutcome {
        let command = JjCommand::describe(self.commit.change_id(), self.buffer.trim());
        OpOutcome::Run(
            CommandTask::new(command)
                .then(FollowUp::Refresh {
                    keep_selections: false,
                })
                .then(FollowUp::CloseOperation),
        )
    }
}

impl Operation for InlineDescribe {
    fn kind(&self) -> OperationKind {
        OperationKind::InlineDescribe
    }

    fn is_focused(&self) -> bool {
        true
    }

    fn is_editing(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: &KeyEvent, _keymap: &KeyMap) -> OpOutcome {
        match key.code {
            KeyCode::Esc => return OpOutcome::Close,
            KeyCode::Enter => return self.apply(),
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Char('u') if key.mods.contains(KeyModifiers::CTRL) => self.buffer.clear(),
            KeyCode::Char(c) if !key.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
                self.buffer.push(c);
            }
            _ => {}
        }
        OpOutcome::Handled
    }

    fn handle_intent(&mut self, intent: &Intent) -> OpOutcome {
        match intent {
            Intent::Apply => self.apply(),
            _ => OpOutcome::Ignored,
        }
    }

    fn render_marker(&self, commit: &Commit, _is_cursor: bool) -> Option<String> {
        commit
            .same_revision(&self.commit)
            .then(|| format!("<< describe: {}_ >>", self.buffer))
    }

    fn help(&self, _keymap: &KeyMap) -> Option<String> {
        Some("enter save  esc cancel  ctrl+u clear".to_string())
    }
}
