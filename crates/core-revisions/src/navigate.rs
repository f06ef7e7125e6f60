use core_actions::{Navigate, NavigateTarget};
use core_jj::JjCommand;
use core_revset::{AUTO_EXPAND_STEP, expand_for_more_history};
use tracing::{debug, info};

use crate::resolve::{WORKING_COPY, select_revision};
use crate::{Notice, RevisionsModel, Task};

impl RevisionsModel {
    pub(crate) fn navigate(&mut self, nav: Navigate) -> Vec<Task> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        let ensure_view = nav.ensure_view();

        if nav.has_explicit_id() {
            let found = [nav.change_id.as_deref(), nav.fallback_id.as_deref()]
                .into_iter()
                .flatten()
                .find_map(|id| select_revision(&self.rows, id));
            if let Some(index) = found {
                self.move_cursor(index, ensure_view);
            }
            return Vec::new();
        }

        if let Some(target) = nav.target {
            if let Some(index) = self.resolve_target(target) {
                self.move_cursor(index, ensure_view);
            }
            return Vec::new();
        }

        let step = if nav.is_page {
            let span = self.viewport.page_span(&self.rows) as isize;
            if nav.step() < 0 { -span } else { span }
        } else {
            nav.step()
        };
        let last = self.rows.len() - 1;
        let next = self.cursor as isize + step;
        if next > last as isize {
            if nav.allow_stream() && self.has_more {
                return self.request_more(self.generation.current());
            }
            if nav.allow_stream()
                && let Some(task) = self.maybe_expand()
            {
                return vec![task];
            }
            self.move_cursor(last, ensure_view);
        } else {
            self.move_cursor(next.max(0) as usize, ensure_view);
        }
        Vec::new()
    }

    fn resolve_target(&self, target: NavigateTarget) -> Option<usize> {
        match target {
            NavigateTarget::Parent => self.lookup(&JjCommand::parent(&self.current_selection())),
            NavigateTarget::Child => {
                let commit = self.selected_commit()?;
                self.lookup(&JjCommand::first_child(commit))
            }
            NavigateTarget::WorkingCopy => select_revision(&self.rows, WORKING_COPY),
            NavigateTarget::Top => Some(0),
            NavigateTarget::Bottom => Some(self.rows.len() - 1),
        }
    }

    /// Run a single-id query and resolve its first line against the rows.
    pub(crate) fn lookup(&self, command: &JjCommand) -> Option<usize> {
        let output = match self.backend.runner.run(command) {
            Ok(output) => output,
            Err(err) => {
                debug!(target: "revisions.resolve", %command, %err, "lookup_failed");
                return None;
            }
        };
        let id = output.lines().map(str::trim).find(|l| !l.is_empty())?;
        select_revision(&self.rows, id)
    }

    pub(crate) fn move_cursor(&mut self, index: usize, ensure_view: bool) {
        self.cursor = index.min(self.rows.len().saturating_sub(1));
        if ensure_view {
            self.viewport.ensure_visible(self.cursor, &self.rows);
        }
    }

    /// A wider revset reaching below the oldest loaded row, or `None` when
    /// loading, when nothing is loaded, or when the revset cannot grow.
    pub(crate) fn maybe_expand(&self) -> Option<Task> {
        if self.loading || self.rows.is_empty() {
            return None;
        }
        let base = self
            .rows
            .iter()
            .rev()
            .map(|row| row.commit.change_id())
            .find(|id| !id.is_empty())
            .unwrap_or("");
        let next = expand_for_more_history(&self.revset, base, AUTO_EXPAND_STEP)?;
        if next == self.revset {
            return None;
        }
        info!(target: "revisions.load", from = %self.revset, to = %next, "revset_expanded");
        Some(Task::Notice(Notice::UpdateRevset(next)))
    }

    /// Scroll the viewport without moving the cursor. Reaching the bottom
    /// pulls more rows or widens the revset.
    pub(crate) fn scroll(&mut self, delta: isize) -> Vec<Task> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        self.viewport.scroll(delta, self.rows.len());
        if delta <= 0 || self.viewport.last_row(&self.rows) < self.rows.len() - 1 {
            return Vec::new();
        }
        if self.has_more {
            return self.request_more(self.generation.current());
        }
        self.maybe_expand().into_iter().collect()
    }

    pub(crate) fn click(&mut self, index: usize) -> Vec<Task> {
        let op = self.op.get();
        if op.is_editing() || op.is_overlay() {
            return Vec::new();
        }
        if index < self.rows.len() {
            self.cursor = index;
        }
        Vec::new()
    }
}
