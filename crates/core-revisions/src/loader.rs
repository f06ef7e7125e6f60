//! Generation-tagged loading: streaming pagination, single-shot loads and
//! row replacement.

use std::mem;
use std::sync::Arc;

use core_graph::{Batch, GraphStream, LoadError};
use core_jj::JjCommand;
use core_model::Row;
use tracing::{debug, info, trace, warn};

use crate::highlight::highlight_changes;
use crate::resolve::restore_cursor;
use crate::{LastCommand, Msg, Notice, RevisionsModel, Task};

impl RevisionsModel {
    /// Start a new load generation. Results of every earlier generation are
    /// discarded from here on; an idle stream from one is closed now, one
    /// that is mid-pull is closed when it is handed back.
    pub(crate) fn refresh(&mut self, keep_selections: bool, selected_revision: Option<String>) -> Vec<Task> {
        if !keep_selections {
            self.checked.clear();
        }
        self.loading = true;
        let tag = self.generation.advance();
        let revset = self.revset.clone();
        let source = Arc::clone(&self.backend.source);
        info!(
            target: "revisions.load",
            tag,
            %revset,
            batching = self.settings.log_batching,
            keep_selections,
            "refresh"
        );

        if !self.settings.log_batching {
            let limit = self.settings.limit;
            return vec![Task::background(move || match source.load_all(&revset, limit) {
                Ok(rows) => Msg::RowsLoaded {
                    tag,
                    rows,
                    selected_revision,
                },
                Err(error) => Msg::LoadFailed { tag, error },
            })];
        }

        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
        self.has_more = false;
        vec![Task::background(move || Msg::StreamOpened {
            tag,
            selected_revision,
            result: source.open(&revset),
        })]
    }

    pub(crate) fn on_stream_opened(
        &mut self,
        tag: u64,
        selected_revision: Option<String>,
        result: Result<Box<dyn GraphStream>, LoadError>,
    ) -> Vec<Task> {
        if !self.generation.is_current(tag) {
            trace!(target: "revisions.load", tag, current = self.generation.current(), "stale_stream_opened");
            if let Ok(mut stream) = result {
                stream.close();
            }
            return Vec::new();
        }
        let stream = match result {
            Ok(stream) => stream,
            Err(error) => return self.fail_load(tag, error),
        };
        self.stream = Some(stream);
        self.has_more = true;
        self.staging.clear();
        self.published = false;
        self.revision_to_select = selected_revision
            .or_else(|| self.selected_commit().map(|c| c.change_id().to_string()));
        debug!(target: "revisions.load", tag, hint = ?self.revision_to_select, "stream_opened");
        self.request_more(tag)
    }

    /// Pull the next batch. No-op while a pull is outstanding, without an open
    /// stream, once the stream is exhausted, or for a stale tag.
    pub(crate) fn request_more(&mut self, tag: u64) -> Vec<Task> {
        if self.in_flight == Some(tag) || !self.has_more || !self.generation.is_current(tag) {
            trace!(target: "revisions.load", tag, in_flight = ?self.in_flight, has_more = self.has_more, "request_more_skipped");
            return Vec::new();
        }
        let Some(mut stream) = self.stream.take() else {
            return Vec::new();
        };
        self.in_flight = Some(tag);
        trace!(target: "revisions.load", tag, "request_more");
        vec![Task::background(move || {
            let batch = stream.request_more();
            Msg::BatchLoaded { tag, batch, stream }
        })]
    }

    pub(crate) fn on_batch_loaded(
        &mut self,
        tag: u64,
        batch: Batch,
        mut stream: Box<dyn GraphStream>,
    ) -> Vec<Task> {
        if self.in_flight == Some(tag) {
            self.in_flight = None;
        }
        if !self.generation.is_current(tag) {
            debug!(target: "revisions.load", tag, current = self.generation.current(), "stale_batch_dropped");
            stream.close();
            return Vec::new();
        }

        let Batch { rows, has_more } = batch;
        let received = rows.len();
        self.has_more = has_more;
        let accumulated = if self.published {
            self.append_rows(tag, rows);
            self.rows.len()
        } else {
            self.staging.extend(rows);
            self.staging.len()
        };
        debug!(target: "revisions.load", tag, received, accumulated, has_more, "batch_loaded");

        if has_more {
            self.stream = Some(stream);
            // Enough rows to restore the cursor and fill the screen.
            let needed = (self.cursor + 1).max(self.viewport.last_row(&self.rows) + 1);
            if accumulated < needed {
                return self.request_more(tag);
            }
        } else {
            stream.close();
        }
        self.finalize()
    }

    fn finalize(&mut self) -> Vec<Task> {
        self.loading = false;
        if self.published {
            return vec![Task::Notice(Notice::RevisionsUpdated)];
        }
        let previous = self.selected_commit().map(|c| c.change_id().to_string());
        self.rows = mem::take(&mut self.staging);
        self.published = true;
        let hint = self.revision_to_select.take();
        self.cursor = restore_cursor(&self.rows, hint.as_deref(), previous.as_deref());
        self.after_rows_replaced()
    }

    pub(crate) fn on_rows_loaded(
        &mut self,
        tag: u64,
        rows: Vec<Row>,
        selected_revision: Option<String>,
    ) -> Vec<Task> {
        if !self.generation.is_current(tag) {
            debug!(target: "revisions.load", tag, "stale_rows_dropped");
            return Vec::new();
        }
        self.loading = false;
        self.update_graph_rows(rows, selected_revision.as_deref())
    }

    /// Replace the row set and re-resolve the cursor.
    pub fn update_graph_rows(&mut self, rows: Vec<Row>, selected_revision: Option<&str>) -> Vec<Task> {
        let previous = self.selected_commit().map(|c| c.change_id().to_string());
        self.rows = rows;
        self.staging.clear();
        self.published = true;
        self.cursor = restore_cursor(&self.rows, selected_revision, previous.as_deref());
        self.after_rows_replaced()
    }

    fn after_rows_replaced(&mut self) -> Vec<Task> {
        self.viewport.clamp(self.rows.len());
        if !self.rows.is_empty() {
            self.viewport.ensure_visible(self.cursor, &self.rows);
        }
        let affected = self.highlight_from(0);
        info!(
            target: "revisions.load",
            tag = self.generation.current(),
            rows = self.rows.len(),
            cursor = self.cursor,
            affected,
            "rows_updated"
        );
        if self.rows.is_empty() {
            Vec::new()
        } else {
            vec![Task::Notice(Notice::RevisionsUpdated)]
        }
    }

    /// Later pages of a published generation go straight into the list.
    fn append_rows(&mut self, tag: u64, rows: Vec<Row>) {
        let start = self.rows.len();
        self.rows.extend(rows);
        let affected = self.highlight_from(start);
        debug!(target: "revisions.load", tag, start, rows = self.rows.len(), affected, "rows_appended");
    }

    /// Mark rows from `start` on that the last successful command touched.
    fn highlight_from(&mut self, start: usize) -> usize {
        match &self.last_command {
            Some(LastCommand { output, failed }) if !failed && !output.is_empty() => {
                highlight_changes(&mut self.rows[start..], output)
            }
            _ => 0,
        }
    }

    pub(crate) fn on_load_failed(&mut self, tag: u64, error: LoadError) -> Vec<Task> {
        if !self.generation.is_current(tag) {
            debug!(target: "revisions.load", tag, "stale_failure_dropped");
            return Vec::new();
        }
        self.fail_load(tag, error)
    }

    /// Rows stay as they were; only the loading state is cleared.
    fn fail_load(&mut self, tag: u64, error: LoadError) -> Vec<Task> {
        self.loading = false;
        warn!(target: "revisions.load", tag, %error, "load_failed");
        vec![Task::Notice(Notice::error(error.diagnostic()))]
    }

    pub(crate) fn on_command_completed(&mut self, output: String, error: Option<String>) -> Vec<Task> {
        let failed = error.is_some();
        self.last_command = Some(LastCommand { output, failed });
        match error {
            Some(error) => vec![Task::Notice(Notice::error(error))],
            None => Vec::new(),
        }
    }

    pub(crate) fn poll_op_log(&self) -> Vec<Task> {
        let runner = Arc::clone(&self.backend.runner);
        vec![Task::background(move || {
            let id = runner
                .run(&JjCommand::op_log_id())
                .map(|out| out.trim().to_string())
                .ok()
                .filter(|id| !id.is_empty());
            Msg::OpLogChecked(id)
        })]
    }

    /// Refresh, keeping checked revisions, whenever the operation log moved.
    pub(crate) fn on_op_log_checked(&mut self, id: Option<String>) -> Vec<Task> {
        let Some(id) = id else {
            return Vec::new();
        };
        if self.op_log_id.as_deref() == Some(id.as_str()) {
            return Vec::new();
        }
        debug!(target: "revisions.load", previous = ?self.op_log_id, current = %id, "op_log_changed");
        self.op_log_id = Some(id);
        self.refresh(true, None)
    }
}
