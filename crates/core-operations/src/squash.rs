use core_actions::{CommandTask, FollowUp, Intent};
use core_events::KeyEvent;
use core_jj::JjCommand;
use core_keymap::{KeyAction, KeyMap};
use core_model::{Commit, SelectedRevisions};

use crate::{OpOutcome, Operation, OperationKind};

/// Squashes the selection into the revision under the cursor.
#[derive(Debug)]
pub struct Squash {
    from: SelectedRevisions,
    into: Option<Commit>,
}

impl Squash {
    pub fn new(from: SelectedRevisions) -> Self {
        Self { from, into: None }
    }

    fn apply(&self) -> OpOutcome {
        let Some(into) = &self.into else {
            return OpOutcome::Flash("no squash destination selected".to_string());
        };
        if self.from.contains(into) {
            return OpOutcome::Flash("cannot squash a revision into itself".to_string());
        }
        OpOutcome::Run(
            CommandTask::new(JjCommand::squash(&self.from, into.change_id()))
                .then(FollowUp::Refresh {
                    keep_selections: false,
                })
                .then(FollowUp::CloseOperation),
        )
    }
}

impl Operation for Squash {
    fn kind(&self) -> OperationKind {
        OperationKind::Squash
    }

    fn is_focused(&self) -> bool {
        true
    }

    fn tracks_selected_revision(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: &KeyEvent, keymap: &KeyMap) -> OpOutcome {
        match keymap.resolve(key, &[KeyAction::Apply, KeyAction::Cancel]) {
            Some(KeyAction::Apply) => self.apply(),
            Some(_) => OpOutcome::Close,
            None => OpOutcome::Ignored,
        }
    }

    fn handle_intent(&mut self, intent: &Intent) -> OpOutcome {
        match intent {
            Intent::Apply => self.apply(),
            _ => OpOutcome::Ignored,
        }
    }

    fn set_selected_revision(&mut self, commit: &Commit) {
        self.into = Some(commit.clone());
    }

    fn render_marker(&self, commit: &Commit, _is_cursor: bool) -> Option<String> {
        if self.from.contains(commit) {
            return Some("<< from >>".to_string());
        }
        self.into
            .as_ref()
            .filter(|into| into.same_revision(commit))
            .map(|_| "<< into >>".to_string())
    }

    fn help(&self, keymap: &KeyMap) -> Option<String> {
        Some(format!(
            "squash {} revision(s)  {} apply  {} cancel",
            self.from.len(),
            keymap.describe(KeyAction::Apply),
            keymap.describe(KeyAction::Cancel)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squashes_into_tracked_revision() {
        let from = Commit::new("aaaa", "1");
        let parent = Commit::new("pppp", "2");
        let mut op = Squash::new(SelectedRevisions::single(from.clone()));
        op.set_selected_revision(&parent);
        assert_eq!(op.render_marker(&from, false).as_deref(), Some("<< from >>"));
        assert_eq!(op.render_marker(&parent, true).as_deref(), Some("<< into >>"));

        let OpOutcome::Run(task) = op.handle_intent(&Intent::Apply) else {
            panic!("expected squash command");
        };
        assert_eq!(task.command, JjCommand::squash(&SelectedRevisions::single(from), "pppp"));
    }

    #[test]
    fn refuses_to_squash_into_source() {
        let from = Commit::new("aaaa", "1");
        let mut op = Squash::new(SelectedRevisions::single(from.clone()));
        op.set_selected_revision(&from);
        assert!(matches!(op.handle_intent(&Intent::Apply), OpOutcome::Flash(_)));
    }
}
