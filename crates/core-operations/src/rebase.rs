use core_actions::{CommandTask, FollowUp, Intent};
use core_events::KeyEvent;
use core_jj::{JjCommand, RebaseSource, RebaseTarget};
use core_keymap::{KeyAction, KeyMap};
use core_model::{Commit, SelectedRevisions};

use crate::{OpOutcome, Operation, OperationKind};

const SWITCHES: &[KeyAction] = &[
    KeyAction::Apply,
    KeyAction::Cancel,
    KeyAction::RebaseRevision,
    KeyAction::RebaseDescendants,
    KeyAction::RebaseBranch,
    KeyAction::RebaseOnto,
    KeyAction::RebaseAfter,
    KeyAction::RebaseBefore,
];

/// Moves the selection relative to the revision under the cursor.
#[derive(Debug)]
pub struct Rebase {
    from: SelectedRevisions,
    to: Option<Commit>,
    source: RebaseSource,
    target: RebaseTarget,
}

impl Rebase {
    pub fn new(from: SelectedRevisions, source: RebaseSource, target: RebaseTarget) -> Self {
        Self {
            from,
            to: None,
            source,
            target,
        }
    }

    pub fn source(&self) -> RebaseSource {
        self.source
    }

    pub fn target(&self) -> RebaseTarget {
        self.target
    }

    fn apply(&self) -> OpOutcome {
        let Some(to) = &self.to else {
            return OpOutcome::Flash("no rebase target selected".to_string());
        };
        if self.from.contains(to) {
            return OpOutcome::Flash("cannot rebase a revision onto itself".to_string());
        }
        let command = JjCommand::rebase(&self.from, to.change_id(), self.source, self.target);
        OpOutcome::Run(
            CommandTask::new(command)
                .then(FollowUp::Refresh {
                    keep_selections: false,
                })
                .then(FollowUp::CloseOperation),
        )
    }
}

impl Operation for Rebase {
    fn kind(&self) -> OperationKind {
        OperationKind::Rebase
    }

    fn is_focused(&self) -> bool {
        true
    }

    fn tracks_selected_revision(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: &KeyEvent, keymap: &KeyMap) -> OpOutcome {
        let Some(action) = keymap.resolve(key, SWITCHES) else {
            return OpOutcome::Ignored;
        };
        match action {
            KeyAction::Apply => return self.apply(),
            KeyAction::Cancel => return OpOutcome::Close,
            KeyAction::RebaseRevision => self.source = RebaseSource::Revision,
            KeyAction::RebaseDescendants => self.source = RebaseSource::Descendants,
            KeyAction::RebaseBranch => self.source = RebaseSource::Branch,
            KeyAction::RebaseOnto => self.target = RebaseTarget::Destination,
            KeyAction::RebaseAfter => self.target = RebaseTarget::After,
            KeyAction::RebaseBefore => self.target = RebaseTarget::Before,
            _ => return OpOutcome::Ignored,
        }
        OpOutcome::Handled
    }

    fn handle_intent(&mut self, intent: &Intent) -> OpOutcome {
        match intent {
            Intent::Apply => self.apply(),
            Intent::SetRebaseSource(source) => {
                self.source = *source;
                OpOutcome::Handled
            }
            Intent::SetRebaseTarget(target) => {
                self.target = *target;
                OpOutcome::Handled
            }
            _ => OpOutcome::Ignored,
        }
    }

    fn set_selected_revision(&mut self, commit: &Commit) {
        self.to = Some(commit.clone());
    }

    fn render_marker(&self, commit: &Commit, _is_cursor: bool) -> Option<String> {
        if self.from.contains(commit) {
            return Some("<< move >>".to_string());
        }
        self.to
            .as_ref()
            .filter(|to| to.same_revision(commit))
            .map(|_| format!("<< {} >>", self.target.label()))
    }

    fn help(&self, keymap: &KeyMap) -> Option<String> {
        Some(format!(
            "rebase {}: {}/{}/{} source  {}/{}/{} target  {} apply",
            self.source.label(),
            keymap.describe(KeyAction::RebaseRevision),
            keymap.describe(KeyAction::RebaseDescendants),
            keymap.describe(KeyAction::RebaseBranch),
            keymap.describe(KeyAction::RebaseOnto),
            keymap.describe(KeyAction::RebaseAfter),
            keymap.describe(KeyAction::RebaseBefore),
            keymap.describe(KeyAction::Apply),
        ))
    }
}
