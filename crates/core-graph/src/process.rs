use std::io::{self, BufReader, Read};
use std::process::{Child, ChildStderr, ChildStdout};
use std::thread::{self, JoinHandle};

use core_jj::{CommandRunner, JjCommand, ProcessRunner, RunError};
use core_model::Row;
use tracing::{debug, warn};

use crate::parser::{LOG_TEMPLATE, RowParser, parse_rows};
use crate::{Batch, DEFAULT_BATCH_SIZE, GraphSource, GraphStream, LoadError};

/// Stderr kept for diagnostics; anything beyond is read and discarded.
const STDERR_KEEP: u64 = 64 * 1024;

/// Graph source backed by `jj log`.
#[derive(Debug, Clone)]
pub struct JjGraphSource {
    runner: ProcessRunner,
    batch_size: usize,
}

impl JjGraphSource {
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            runner,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl GraphSource for JjGraphSource {
    fn open(&self, revset: &str) -> Result<Box<dyn GraphStream>, LoadError> {
        let command = JjCommand::log(revset, 0, LOG_TEMPLATE);
        let mut child = self.runner.spawn(&command)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("log stdout was not captured"))?;
        let mut stderr = StderrDrain::spawn(child.stderr.take());
        let mut parser = RowParser::new(BufReader::new(stdout));

        // The first row decides whether the revset is usable at all.
        let first = match parser.next_row() {
            Ok(first) => first,
            Err(err) => {
                reap(&mut child);
                return Err(err.into());
            }
        };
        if let Some(row) = first {
            debug!(target: "graph.stream", %revset, "stream_opened");
            return Ok(Box::new(JjGraphStream {
                child: Some(child),
                stderr,
                parser,
                lookahead: Some(row),
                batch_size: self.batch_size,
                done: false,
            }));
        }

        let status = child.wait()?;
        let stderr = stderr.finish();
        if !status.success() {
            return Err(LoadError::Command(RunError::Failed {
                command: command.to_string(),
                status: status.to_string(),
                stdout: String::new(),
                stderr,
            }));
        }
        Err(LoadError::NoRevisions {
            revset: revset.to_string(),
        })
    }

    fn load_all(&self, revset: &str, limit: usize) -> Result<Vec<Row>, LoadError> {
        let output = self.runner.run(&JjCommand::log(revset, limit, LOG_TEMPLATE))?;
        let rows = parse_rows(output.as_bytes())?;
        debug!(target: "graph.load", %revset, rows = rows.len(), "load_all");
        Ok(rows)
    }
}

/// A running `jj log` whose stdout is parsed on demand.
pub struct JjGraphStream {
    child: Option<Child>,
    stderr: StderrDrain,
    parser: RowParser<BufReader<ChildStdout>>,
    lookahead: Option<Row>,
    batch_size: usize,
    done: bool,
}

impl GraphStream for JjGraphStream {
    fn request_more(&mut self) -> Batch {
        if self.done {
            return Batch::default();
        }
        let mut rows = Vec::with_capacity(self.batch_size);
        rows.extend(self.lookahead.take());
        while rows.len() < self.batch_size {
            match self.parser.next_row() {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(err) => {
                    warn!(target: "graph.stream", %err, "stream_read_failed");
                    self.done = true;
                    break;
                }
            }
        }
        if self.done
            && let Some(mut child) = self.child.take()
        {
            reap(&mut child);
            let stderr = self.stderr.finish();
            if !stderr.trim().is_empty() {
                debug!(target: "graph.stream", stderr_len = stderr.len(), "stream_stderr");
            }
        }
        debug!(target: "graph.stream", rows = rows.len(), has_more = !self.done, "batch");
        Batch {
            rows,
            has_more: !self.done,
        }
    }

    fn close(&mut self) {
        self.done = true;
        self.lookahead = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            reap(&mut child);
            // Descendants may still hold the pipe; the reader finishes on its own.
            self.stderr.detach();
            debug!(target: "graph.stream", "stream_closed");
        }
    }
}

impl Drop for JjGraphStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reads a child's stderr to the end on its own thread. The child must never
/// block on a full stderr pipe while stdout is being parsed.
struct StderrDrain(Option<JoinHandle<String>>);

impl StderrDrain {
    fn spawn(pipe: Option<ChildStderr>) -> Self {
        Self(pipe.map(|mut pipe| {
            thread::spawn(move || {
                let mut kept = Vec::new();
                let _ = (&mut pipe).take(STDERR_KEEP).read_to_end(&mut kept);
                let _ = io::copy(&mut pipe, &mut io::sink());
                String::from_utf8_lossy(&kept).into_owned()
            })
        }))
    }

    /// Wait for the child's stderr to close and return what was kept.
    fn finish(&mut self) -> String {
        match self.0.take().map(JoinHandle::join) {
            Some(Ok(text)) => text,
            Some(Err(_)) => {
                warn!(target: "graph.stream", "stderr_reader_panicked");
                String::new()
            }
            None => String::new(),
        }
    }

    fn detach(&mut self) {
        self.0.take();
    }
}

fn reap(child: &mut Child) {
    if let Err(err) = child.wait() {
        warn!(target: "graph.stream", %err, "child_wait_failed");
    }
}
