use core_actions::{CommandTask, FollowUp, Intent};
use core_events::KeyEvent;
use core_jj::JjCommand;
use core_keymap::{KeyAction, KeyMap};
use core_model::{Commit, SelectedRevisions};

use crate::{OpOutcome, Operation, OperationKind};

/// Confirmation mode for abandoning the effective selection.
#[derive(Debug)]
pub struct Abandon {
    selected: SelectedRevisions,
}

impl Abandon {
    pub fn new(selected: SelectedRevisions) -> Self {
        Self { selected }
    }

    fn apply(&self) -> OpOutcome {
        OpOutcome::Run(
            CommandTask::new(JjCommand::abandon(&self.selected))
                .then(FollowUp::Refresh {
                    keep_selections: false,
                })
                .then(FollowUp::CloseOperation),
        )
    }
}

impl Operation for Abandon {
    fn kind(&self) -> OperationKind {
        OperationKind::Abandon
    }

    fn is_focused(&self) -> bool {
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

    fn render_marker(&self, commit: &Commit, _is_cursor: bool) -> Option<String> {
        self.selected
            .contains(commit)
            .then(|| "<< abandon >>".to_string())
    }

    fn help(&self, keymap: &KeyMap) -> Option<String> {
        Some(format!(
            "{} abandon {} revision(s)  {} cancel",
            keymap.describe(KeyAction::Apply),
            self.selected.len(),
            keymap.describe(KeyAction::Cancel)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyCode;

    #[test]
    fn marks_selection_and_runs_on_apply() {
        let a = Commit::new("aaaa", "1");
        let b = Commit::new("bbbb", "2");
        let mut op = Abandon::new(SelectedRevisions::from_commits([a.clone()]));
        assert_eq!(op.render_marker(&a, false).as_deref(), Some("<< abandon >>"));
        assert_eq!(op.render_marker(&b, true), None);

        let keymap = KeyMap::default();
        let OpOutcome::Run(task) = op.handle_key(&KeyEvent::plain(KeyCode::Enter), &keymap) else {
            panic!("apply should run abandon");
        };
        assert_eq!(task.command.args()[0], "abandon");
        assert_eq!(
            op.handle_key(&KeyEvent::char('j'), &keymap),
            OpOutcome::Ignored
        );
    }
}
