//! Graph-producing collaborator.
//!
//! A `GraphSource` opens a `GraphStream` for a revset; the stream hands out
//! parsed rows in batches until it reports `has_more == false`. Streams are
//! pulled from background tasks, so both traits are `Send` and a stream is
//! owned by exactly one party at a time.
//!
//! Open is the only fallible step: an empty result or backend error is
//! reported there, and a stream that opened successfully ends cleanly.

use std::io;

use core_jj::RunError;
use core_model::Row;
use thiserror::Error;

pub mod parser;
pub mod process;

pub use parser::{LOG_TEMPLATE, RowParser, parse_rows};
pub use process::JjGraphSource;

/// Rows pulled per `request_more` unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub rows: Vec<Row>,
    pub has_more: bool,
}

pub trait GraphStream: Send {
    /// Pull the next batch. After `has_more == false` every further call
    /// returns an empty exhausted batch.
    fn request_more(&mut self) -> Batch;
    /// Release the underlying producer. Idempotent.
    fn close(&mut self);
}

pub trait GraphSource: Send + Sync {
    fn open(&self, revset: &str) -> Result<Box<dyn GraphStream>, LoadError>;
    /// Single-shot load of at most `limit` rows (0 = unlimited).
    fn load_all(&self, revset: &str, limit: usize) -> Result<Vec<Row>, LoadError>;
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No revisions found for revset `{revset}`")]
    NoRevisions { revset: String },
    #[error(transparent)]
    Command(#[from] RunError),
    #[error("failed to read graph output: {0}")]
    Io(#[from] io::Error),
}

impl LoadError {
    /// Text shown to the user: the message plus any captured backend output.
    pub fn diagnostic(&self) -> String {
        match self {
            LoadError::Command(err) => {
                let output = err.output();
                if output.is_empty() || err.to_string().contains(output.as_str()) {
                    err.to_string()
                } else {
                    format!("{err}\n{output}")
                }
            }
            other => other.to_string(),
        }
    }
}
