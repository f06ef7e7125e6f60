use std::fmt;

use core_actions::{CommandTask, Intent};
use core_events::KeyEvent;
use core_graph::{Batch, GraphStream, LoadError};
use core_model::Row;

/// Everything the engine reacts to. Results of background work carry the
/// generation tag they were issued under.
pub enum Msg {
    Key(KeyEvent),
    Intent(Intent),
    /// Mouse click on the row at this index.
    ItemClicked(usize),
    /// Wheel scroll by this many rows.
    ViewportScroll(isize),
    Refresh {
        keep_selections: bool,
        selected_revision: Option<String>,
    },
    /// Periodic poll of the operation log.
    AutoRefresh,
    OpLogChecked(Option<String>),
    /// New quick-search term; empty clears.
    QuickSearch(String),
    CloseOperation,
    CommandCompleted {
        output: String,
        error: Option<String>,
    },
    StreamOpened {
        tag: u64,
        selected_revision: Option<String>,
        result: Result<Box<dyn GraphStream>, LoadError>,
    },
    /// A pulled batch, with the stream handed back to its owner.
    BatchLoaded {
        tag: u64,
        batch: Batch,
        stream: Box<dyn GraphStream>,
    },
    RowsLoaded {
        tag: u64,
        rows: Vec<Row>,
        selected_revision: Option<String>,
    },
    LoadFailed {
        tag: u64,
        error: LoadError,
    },
    UpdateRevset(String),
    Notify(Notice),
}

impl fmt::Debug for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Msg::Key(key) => write!(f, "Key({key})"),
            Msg::Intent(intent) => write!(f, "Intent({})", intent.label()),
            Msg::ItemClicked(idx) => write!(f, "ItemClicked({idx})"),
            Msg::ViewportScroll(delta) => write!(f, "ViewportScroll({delta})"),
            Msg::Refresh {
                keep_selections,
                selected_revision,
            } => f
                .debug_struct("Refresh")
                .field("keep_selections", keep_selections)
                .field("selected_revision", selected_revision)
                .finish(),
            Msg::AutoRefresh => f.write_str("AutoRefresh"),
            Msg::OpLogChecked(id) => write!(f, "OpLogChecked({id:?})"),
            Msg::QuickSearch(term) => write!(f, "QuickSearch({term:?})"),
            Msg::CloseOperation => f.write_str("CloseOperation"),
            Msg::CommandCompleted { output, error } => f
                .debug_struct("CommandCompleted")
                .field("output_len", &output.len())
                .field("error", error)
                .finish(),
            Msg::StreamOpened { tag, result, .. } => f
                .debug_struct("StreamOpened")
                .field("tag", tag)
                .field("ok", &result.is_ok())
                .finish(),
            Msg::BatchLoaded { tag, batch, .. } => f
                .debug_struct("BatchLoaded")
                .field("tag", tag)
                .field("rows", &batch.rows.len())
                .field("has_more", &batch.has_more)
                .finish(),
            Msg::RowsLoaded { tag, rows, .. } => f
                .debug_struct("RowsLoaded")
                .field("tag", tag)
                .field("rows", &rows.len())
                .finish(),
            Msg::LoadFailed { tag, error } => f
                .debug_struct("LoadFailed")
                .field("tag", tag)
                .field("error", &error.to_string())
                .finish(),
            Msg::UpdateRevset(revset) => write!(f, "UpdateRevset({revset:?})"),
            Msg::Notify(notice) => write!(f, "Notify({notice:?})"),
        }
    }
}

/// Outward signals handled by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Flash { text: String, error: bool },
    /// The engine wants a different revset; the runtime feeds it back as
    /// `Msg::UpdateRevset`.
    UpdateRevset(String),
    /// A load finished with at least one row.
    RevisionsUpdated,
    Quit,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice::Flash {
            text: text.into(),
            error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice::Flash {
            text: text.into(),
            error: true,
        }
    }
}

pub type BackgroundJob = Box<dyn FnOnce() -> Msg + Send + 'static>;

/// Work produced by `update`. The engine never blocks on any of it.
pub enum Task {
    /// Runs off the loop and yields one message.
    Background(BackgroundJob),
    /// A mutating command with follow-ups; see `run_command_task`.
    Command(CommandTask),
    Notice(Notice),
}

impl Task {
    pub fn background<F>(job: F) -> Self
    where
        F: FnOnce() -> Msg + Send + 'static,
    {
        Task::Background(Box::new(job))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Background(_) => f.write_str("Background(..)"),
            Task::Command(task) => write!(f, "Command({})", task.command),
            Task::Notice(notice) => write!(f, "Notice({notice:?})"),
        }
    }
}
