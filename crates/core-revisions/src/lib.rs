//! Revision list engine.
//!
//! `RevisionsModel` owns the materialized rows, the cursor, the checked
//! selection and the active operation. It is driven exclusively through
//! `update`, which mutates state synchronously and returns `Task`s for the
//! runtime to execute; results come back later as further `Msg`s.
//!
//! Loads are tagged with a `Generation`. Every refresh advances it, and any
//! completion bearing an older tag is discarded, so overlapping or reordered
//! loads can never overwrite newer rows. A streaming load pulls batches into
//! a staging buffer until enough rows exist to restore the cursor and fill
//! the viewport, then swaps them in.
//!
//! Module map:
//! - `loader`: refresh, streaming and single-shot loads, row replacement.
//! - `navigate`: cursor motion, pagination on demand, revset expansion.
//! - `dispatch`: key routing, intents, operation outcomes.
//! - `resolve`, `search`, `highlight`, `viewport`: pure helpers.

use std::sync::Arc;

use core_graph::{GraphSource, GraphStream};
use core_jj::CommandRunner;
use core_keymap::KeyMap;
use core_model::{Commit, Row, SelectedRevisions};
use core_operations::{Operation, OperationSlot};
use tracing::trace;

pub mod clipboard;
mod dispatch;
pub mod exec;
pub mod generation;
pub mod highlight;
mod loader;
pub mod msg;
mod navigate;
pub mod resolve;
pub mod search;
pub mod viewport;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use exec::run_command_task;
pub use generation::Generation;
pub use msg::{BackgroundJob, Msg, Notice, Task};
pub use resolve::{WORKING_COPY, select_revision};
pub use viewport::Viewport;

/// Load behaviour taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Stream rows in batches instead of one single-shot load.
    pub log_batching: bool,
    /// Row limit for single-shot loads; 0 is unlimited.
    pub limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_batching: true,
            limit: 0,
        }
    }
}

/// Collaborators the engine talks to. All of them are shared with
/// background tasks.
#[derive(Clone)]
pub struct Backend {
    pub runner: Arc<dyn CommandRunner>,
    pub source: Arc<dyn GraphSource>,
    pub clipboard: Arc<dyn Clipboard>,
}

/// Outcome of the last mutating command, kept for change highlighting.
#[derive(Debug, Clone, Default)]
struct LastCommand {
    output: String,
    failed: bool,
}

pub struct RevisionsModel {
    rows: Vec<Row>,
    /// Rows accumulated by the current stream before they are published.
    staging: Vec<Row>,
    cursor: usize,
    generation: Generation,
    stream: Option<Box<dyn GraphStream>>,
    has_more: bool,
    /// Tag of the outstanding batch request, if any.
    in_flight: Option<u64>,
    revision_to_select: Option<String>,
    /// Whether the current generation's first finalize already happened.
    published: bool,
    loading: bool,
    checked: SelectedRevisions,
    op: OperationSlot,
    quick_search: String,
    revset: String,
    keymap: KeyMap,
    viewport: Viewport,
    last_command: Option<LastCommand>,
    op_log_id: Option<String>,
    settings: Settings,
    backend: Backend,
}

impl RevisionsModel {
    pub fn new(backend: Backend, settings: Settings, keymap: KeyMap, revset: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            staging: Vec::new(),
            cursor: 0,
            generation: Generation::default(),
            stream: None,
            has_more: false,
            in_flight: None,
            revision_to_select: None,
            published: false,
            loading: false,
            checked: SelectedRevisions::new(),
            op: OperationSlot::default(),
            quick_search: String::new(),
            revset: revset.into(),
            keymap,
            viewport: Viewport::default(),
            last_command: None,
            op_log_id: None,
            settings,
            backend,
        }
    }

    /// Initial load selecting the working copy.
    pub fn init(&mut self) -> Vec<Task> {
        self.refresh(false, Some(WORKING_COPY.to_string()))
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Task> {
        trace!(target: "revisions.dispatch", ?msg, "update");
        let tasks = match msg {
            Msg::Key(key) => self.handle_key(&key),
            Msg::Intent(intent) => self.handle_intent(intent),
            Msg::ItemClicked(index) => self.click(index),
            Msg::ViewportScroll(delta) => self.scroll(delta),
            Msg::Refresh {
                keep_selections,
                selected_revision,
            } => self.refresh(keep_selections, selected_revision),
            Msg::AutoRefresh => self.poll_op_log(),
            Msg::OpLogChecked(id) => self.on_op_log_checked(id),
            Msg::QuickSearch(term) => self.start_quick_search(&term),
            Msg::CloseOperation => {
                self.op.reset();
                Vec::new()
            }
            Msg::CommandCompleted { output, error } => self.on_command_completed(output, error),
            Msg::StreamOpened {
                tag,
                selected_revision,
                result,
            } => self.on_stream_opened(tag, selected_revision, result),
            Msg::BatchLoaded { tag, batch, stream } => self.on_batch_loaded(tag, batch, stream),
            Msg::RowsLoaded {
                tag,
                rows,
                selected_revision,
            } => self.on_rows_loaded(tag, rows, selected_revision),
            Msg::LoadFailed { tag, error } => self.on_load_failed(tag, error),
            Msg::UpdateRevset(revset) => {
                self.revset = revset;
                self.refresh(true, None)
            }
            Msg::Notify(notice) => vec![Task::Notice(notice)],
        };
        self.sync_operation_selection();
        tasks
    }

    fn sync_operation_selection(&mut self) {
        if !self.op.get().tracks_selected_revision() {
            return;
        }
        if let Some(commit) = self.selected_commit().cloned() {
            self.op.get_mut().set_selected_revision(&commit);
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// `None` while no rows are loaded.
    pub fn cursor(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.cursor)
    }

    /// Move the cursor; out-of-range indices are ignored.
    pub fn set_cursor(&mut self, index: usize) {
        if index < self.rows.len() {
            self.cursor = index;
        }
    }

    pub fn selected_commit(&self) -> Option<&Commit> {
        self.rows.get(self.cursor).map(|row| &row.commit)
    }

    pub fn checked(&self) -> &SelectedRevisions {
        &self.checked
    }

    pub fn toggle_checked(&mut self, commit: Commit) -> bool {
        self.checked.toggle(commit)
    }

    /// Operands for multi-revision operations: checked rows in row order,
    /// else the cursor revision.
    pub fn current_selection(&self) -> SelectedRevisions {
        let checked = SelectedRevisions::from_commits(
            self.rows
                .iter()
                .filter(|row| self.checked.contains(&row.commit))
                .map(|row| row.commit.clone()),
        );
        if !checked.is_empty() {
            return checked;
        }
        self.selected_commit()
            .cloned()
            .map(SelectedRevisions::single)
            .unwrap_or_default()
    }

    pub fn operation(&self) -> &dyn Operation {
        self.op.get()
    }

    pub fn quick_search(&self) -> &str {
        &self.quick_search
    }

    pub fn revset(&self) -> &str {
        &self.revset
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Screen lines available to the list.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport.height = height;
        if !self.rows.is_empty() {
            self.viewport.ensure_visible(self.cursor, &self.rows);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn generation(&self) -> u64 {
        self.generation.current()
    }
}
