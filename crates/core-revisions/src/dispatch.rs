//! Key routing and intent handling.
//!
//! Keys go to exactly one consumer. An editing or overlay operation sees
//! every key; otherwise navigation keys move the cursor, a focused operation
//! gets the rest, and only then does the default key table apply.

use std::sync::Arc;

use core_actions::{
    CommandTask, FollowUp, Intent, Navigate, translate_default_key, translate_navigation_key,
};
use core_events::KeyEvent;
use core_jj::JjCommand;
use core_model::{Commit, SelectedRevisions};
use core_operations::{
    Abandon, Details, InlineDescribe, OpOutcome, Rebase, Squash, parse_diff_summary,
};
use tracing::debug;

use crate::resolve::WORKING_COPY;
use crate::search::quick_search;
use crate::{Msg, Notice, RevisionsModel, Task};

const SHORT_SHA_LEN: usize = 8;
const SHORT_CHANGE_ID_LEN: usize = 12;

fn flash_error(text: impl Into<String>) -> Vec<Task> {
    vec![Task::Notice(Notice::error(text))]
}

impl RevisionsModel {
    pub(crate) fn handle_key(&mut self, key: &KeyEvent) -> Vec<Task> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        if self.op.captures_all_input() {
            return self.forward_key(key);
        }
        if let Some(intent) = translate_navigation_key(&self.keymap, key) {
            return self.handle_intent(intent);
        }
        if self.op.get().is_focused() {
            return self.forward_key(key);
        }
        match translate_default_key(&self.keymap, key, !self.quick_search.is_empty()) {
            Some(intent) => self.handle_intent(intent),
            None => Vec::new(),
        }
    }

    fn forward_key(&mut self, key: &KeyEvent) -> Vec<Task> {
        let outcome = self.op.get_mut().handle_key(key, &self.keymap);
        self.apply_outcome(outcome)
    }

    fn apply_outcome(&mut self, outcome: OpOutcome) -> Vec<Task> {
        match outcome {
            OpOutcome::Ignored | OpOutcome::Handled => Vec::new(),
            OpOutcome::Close => {
                self.op.reset();
                Vec::new()
            }
            OpOutcome::Run(task) => vec![Task::Command(task)],
            OpOutcome::Flash(text) => flash_error(text),
        }
    }

    pub(crate) fn handle_intent(&mut self, intent: Intent) -> Vec<Task> {
        debug!(
            target: "revisions.dispatch",
            intent = intent.label(),
            op = %self.op.kind(),
            "intent"
        );
        match intent {
            Intent::Navigate(nav) => self.navigate(nav),
            Intent::ToggleSelect => match self.selected_commit().cloned() {
                Some(commit) => {
                    self.checked.toggle(commit);
                    self.navigate(Navigate::by(1))
                }
                None => Vec::new(),
            },
            Intent::Cancel => {
                self.checked.clear();
                self.op.reset();
                Vec::new()
            }
            Intent::Refresh {
                keep_selections,
                selected_revision,
            } => self.refresh(keep_selections, selected_revision),
            Intent::QuickSearchCycle { reverse } => {
                let start = self.cursor as isize + if reverse { -1 } else { 1 };
                if let Some(index) = quick_search(&self.rows, &self.quick_search, start, reverse) {
                    self.move_cursor(index, true);
                }
                Vec::new()
            }
            Intent::QuickSearchClear => {
                self.quick_search.clear();
                Vec::new()
            }
            Intent::CopyCommitSha => self.copy_commit_sha(),
            Intent::CopyChangeId => self.copy_change_id(),
            Intent::OpenDetails => self.open_details(),
            Intent::StartInlineDescribe { selected } => {
                if let Some(commit) = self.commit_or_cursor(selected) {
                    self.op.replace(Box::new(InlineDescribe::new(commit)));
                }
                Vec::new()
            }
            Intent::StartNew { selected, no_edit } => self.start_new(selected, no_edit),
            Intent::StartEdit {
                selected,
                ignore_immutable,
            } => match self.commit_or_cursor(selected) {
                Some(commit) => vec![Task::Command(CommandTask::refreshing(JjCommand::edit(
                    commit.change_id(),
                    ignore_immutable,
                )))],
                None => Vec::new(),
            },
            Intent::StartAbsorb { selected } => match self.commit_or_cursor(selected) {
                Some(commit) => vec![Task::Command(CommandTask::refreshing(JjCommand::absorb(
                    commit.change_id(),
                )))],
                None => Vec::new(),
            },
            Intent::StartAbandon { selected } => {
                if let Some(selected) = self.effective_selection(selected) {
                    self.op.replace(Box::new(Abandon::new(selected)));
                }
                Vec::new()
            }
            Intent::StartRebase {
                selected,
                source,
                target,
            } => {
                if let Some(selected) = self.effective_selection(selected) {
                    self.op.replace(Box::new(Rebase::new(selected, source, target)));
                }
                Vec::new()
            }
            Intent::StartSquash { selected } => self.start_squash(selected),
            Intent::Quit => vec![Task::Notice(Notice::Quit)],
            other @ (Intent::Apply | Intent::SetRebaseSource(_) | Intent::SetRebaseTarget(_)) => {
                let outcome = self.op.get_mut().handle_intent(&other);
                self.apply_outcome(outcome)
            }
        }
    }

    /// Explicit selection, else checked rows, else the cursor. `None` when
    /// all three are empty.
    fn effective_selection(&self, explicit: SelectedRevisions) -> Option<SelectedRevisions> {
        let selected = if explicit.is_empty() {
            self.current_selection()
        } else {
            explicit
        };
        (!selected.is_empty()).then_some(selected)
    }

    fn commit_or_cursor(&self, explicit: Option<Commit>) -> Option<Commit> {
        explicit.or_else(|| self.selected_commit().cloned())
    }

    fn start_new(&mut self, selected: SelectedRevisions, no_edit: bool) -> Vec<Task> {
        let Some(selected) = self.effective_selection(selected) else {
            return Vec::new();
        };
        let follow_up = if no_edit {
            FollowUp::SelectLatestChild {
                base: selected
                    .last()
                    .map(|c| c.change_id().to_string())
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| WORKING_COPY.to_string()),
            }
        } else {
            FollowUp::RefreshAndSelect(WORKING_COPY.to_string())
        };
        vec![Task::Command(
            CommandTask::new(JjCommand::new_change(&selected, no_edit)).then(follow_up),
        )]
    }

    /// Squash into the parent of the selection, so the cursor starts there.
    fn start_squash(&mut self, selected: SelectedRevisions) -> Vec<Task> {
        let Some(selected) = self.effective_selection(selected) else {
            return Vec::new();
        };
        match self.lookup(&JjCommand::parent(&selected)) {
            Some(index) => self.move_cursor(index, true),
            None if self.cursor + 1 < self.rows.len() => self.move_cursor(self.cursor + 1, true),
            None => {}
        }
        self.op.replace(Box::new(Squash::new(selected)));
        Vec::new()
    }

    fn open_details(&mut self) -> Vec<Task> {
        let Some(commit) = self.selected_commit().cloned() else {
            return Vec::new();
        };
        match self.backend.runner.run(&JjCommand::diff_summary(commit.change_id())) {
            Ok(output) => {
                let files = parse_diff_summary(&output);
                self.op.replace(Box::new(Details::new(commit, files)));
                Vec::new()
            }
            Err(err) => flash_error(err.to_string()),
        }
    }

    pub(crate) fn start_quick_search(&mut self, term: &str) -> Vec<Task> {
        self.quick_search = term.to_lowercase();
        if let Some(index) = quick_search(&self.rows, &self.quick_search, 0, false) {
            self.move_cursor(index, true);
        }
        self.op.reset();
        Vec::new()
    }

    fn copy_commit_sha(&self) -> Vec<Task> {
        let Some(commit) = self
            .selected_commit()
            .filter(|c| !c.commit_id.trim().is_empty())
        else {
            return flash_error("no revision selected");
        };
        match self.resolve_full_id(&JjCommand::full_commit_id(commit.commit_id.trim())) {
            Ok(Some(sha)) => self.write_clipboard(truncate(&sha, SHORT_SHA_LEN), "Copied commit SHA"),
            Ok(None) => flash_error("could not resolve commit sha"),
            Err(err) => flash_error(err),
        }
    }

    fn copy_change_id(&self) -> Vec<Task> {
        let Some(commit) = self.selected_commit().filter(|c| !c.change_id().is_empty()) else {
            return flash_error("no revision selected");
        };
        match self.resolve_full_id(&JjCommand::full_change_id(commit.change_id())) {
            Ok(Some(id)) => {
                self.write_clipboard(truncate(&id, SHORT_CHANGE_ID_LEN), "Copied change id")
            }
            Ok(None) => flash_error("could not resolve change id"),
            Err(err) => flash_error(err),
        }
    }

    fn resolve_full_id(&self, command: &JjCommand) -> Result<Option<String>, String> {
        let output = self
            .backend
            .runner
            .run(command)
            .map_err(|err| err.to_string())?;
        let id = output.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    fn write_clipboard(&self, text: String, label: &'static str) -> Vec<Task> {
        let clipboard = Arc::clone(&self.backend.clipboard);
        vec![Task::background(move || {
            let notice = match clipboard.set_text(&text) {
                Ok(()) => Notice::info(format!("{label}: {text}")),
                Err(err) => Notice::error(err.to_string()),
            };
            Msg::Notify(notice)
        })]
    }
}

fn truncate(id: &str, len: usize) -> String {
    id.chars().take(len).collect()
}
