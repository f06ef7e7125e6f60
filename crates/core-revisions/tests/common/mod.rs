#![allow(dead_code)] // Shared across integration tests; each binary uses a subset.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use core_events::{KeyCode, KeyEvent};
use core_graph::{Batch, GraphSource, GraphStream, LoadError};
use core_jj::{CommandRunner, JjCommand, RunError};
use core_keymap::KeyMap;
use core_model::{Commit, GraphRowLine, LineFlags, Row, Segment, SegmentRole};
use core_revisions::{
    Backend, MemoryClipboard, Msg, Notice, RevisionsModel, Settings, Task, run_command_task,
};

/// Change id of row `i`. Fixed width so no id is a prefix of another.
pub fn change_id(i: usize) -> String {
    format!("r{i:03}")
}

pub fn commit_id(i: usize) -> String {
    format!("{i:08x}")
}

pub fn row_with(commit: Commit, description: &str) -> Row {
    let line = GraphRowLine {
        gutter: vec![Segment::new(if commit.is_working_copy { "@  " } else { "○  " })],
        segments: vec![
            Segment::with_role(commit.change_id.clone(), SegmentRole::ChangeId),
            Segment::with_role(commit.commit_id.clone(), SegmentRole::CommitId),
            Segment::with_role(description, SegmentRole::Description),
        ],
        flags: LineFlags::REVISION,
    };
    Row::new(commit.with_description(description), vec![line])
}

/// `count` single-line rows; `working_copy` marks one of them.
pub fn rows(count: usize, working_copy: Option<usize>) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let mut commit = Commit::new(change_id(i), commit_id(i));
            if working_copy == Some(i) {
                commit = commit.working_copy();
            }
            row_with(commit, &format!("change number {i}"))
        })
        .collect()
}

/// Runner answering from a table of canned outputs. Unknown commands fail.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<JjCommand, Result<String, String>>>,
    calls: Mutex<Vec<JjCommand>>,
}

impl ScriptedRunner {
    pub fn on(&self, command: JjCommand, output: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(command, Ok(output.to_string()));
        self
    }

    pub fn fail(&self, command: JjCommand, stderr: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(command, Err(stderr.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<JjCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, command: &JjCommand) -> bool {
        self.calls.lock().unwrap().contains(command)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &JjCommand) -> Result<String, RunError> {
        self.calls.lock().unwrap().push(command.clone());
        let response = self.responses.lock().unwrap().get(command).cloned();
        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(stderr)) => Err(RunError::Failed {
                command: command.to_string(),
                status: "exit status: 1".into(),
                stdout: String::new(),
                stderr,
            }),
            None => Err(RunError::Failed {
                command: command.to_string(),
                status: "exit status: 1".into(),
                stdout: String::new(),
                stderr: "unexpected command".into(),
            }),
        }
    }
}

/// Graph source serving fixed rows per revset, falling back to a default set.
pub struct ScriptedSource {
    default_rows: Mutex<Vec<Row>>,
    by_revset: Mutex<HashMap<String, Vec<Row>>>,
    batch_size: usize,
    opened: Mutex<Vec<String>>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(rows: Vec<Row>, batch_size: usize) -> Self {
        Self {
            default_rows: Mutex::new(rows),
            by_revset: Mutex::new(HashMap::new()),
            batch_size,
            opened: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_rows(&self, rows: Vec<Row>) {
        *self.default_rows.lock().unwrap() = rows;
    }

    pub fn set_revset_rows(&self, revset: &str, rows: Vec<Row>) {
        self.by_revset
            .lock()
            .unwrap()
            .insert(revset.to_string(), rows);
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn rows_for(&self, revset: &str) -> Vec<Row> {
        self.by_revset
            .lock()
            .unwrap()
            .get(revset)
            .cloned()
            .unwrap_or_else(|| self.default_rows.lock().unwrap().clone())
    }

    pub fn stream(&self, rows: Vec<Row>) -> Box<dyn GraphStream> {
        Box::new(ScriptedStream {
            rows: rows.into(),
            batch_size: self.batch_size,
            closed: Arc::clone(&self.closed),
            done: false,
        })
    }
}

impl GraphSource for ScriptedSource {
    fn open(&self, revset: &str) -> Result<Box<dyn GraphStream>, LoadError> {
        self.opened.lock().unwrap().push(revset.to_string());
        let rows = self.rows_for(revset);
        if rows.is_empty() {
            return Err(LoadError::NoRevisions {
                revset: revset.to_string(),
            });
        }
        Ok(self.stream(rows))
    }

    fn load_all(&self, revset: &str, limit: usize) -> Result<Vec<Row>, LoadError> {
        self.opened.lock().unwrap().push(revset.to_string());
        let mut rows = self.rows_for(revset);
        if limit > 0 {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

pub struct ScriptedStream {
    rows: VecDeque<Row>,
    batch_size: usize,
    closed: Arc<AtomicUsize>,
    done: bool,
}

impl GraphStream for ScriptedStream {
    fn request_more(&mut self) -> Batch {
        let take = self.batch_size.min(self.rows.len());
        let rows: Vec<Row> = self.rows.drain(..take).collect();
        Batch {
            rows,
            has_more: !self.rows.is_empty(),
        }
    }

    fn close(&mut self) {
        if !self.done {
            self.done = true;
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct Harness {
    pub model: RevisionsModel,
    pub runner: Arc<ScriptedRunner>,
    pub source: Arc<ScriptedSource>,
    pub clipboard: Arc<MemoryClipboard>,
}

impl Harness {
    pub fn new(rows: Vec<Row>, batch_size: usize) -> Self {
        Self::with_settings(rows, batch_size, Settings::default(), "")
    }

    pub fn with_settings(rows: Vec<Row>, batch_size: usize, settings: Settings, revset: &str) -> Self {
        let runner = Arc::new(ScriptedRunner::default());
        let source = Arc::new(ScriptedSource::new(rows, batch_size));
        let clipboard = Arc::new(MemoryClipboard::default());
        let backend = Backend {
            runner: runner.clone(),
            source: source.clone(),
            clipboard: clipboard.clone(),
        };
        let model = RevisionsModel::new(backend, settings, KeyMap::default(), revset);
        Self {
            model,
            runner,
            source,
            clipboard,
        }
    }

    /// Initial load with a viewport of `height` lines, run to completion.
    pub fn loaded(rows: Vec<Row>, batch_size: usize, height: usize) -> Self {
        let mut h = Self::new(rows, batch_size);
        h.model.set_viewport_height(height);
        let tasks = h.model.init();
        h.drain(tasks);
        h
    }

    pub fn send(&mut self, msg: Msg) -> Vec<Notice> {
        let tasks = self.model.update(msg);
        self.drain(tasks)
    }

    pub fn key(&mut self, key: KeyEvent) -> Vec<Notice> {
        self.send(Msg::Key(key))
    }

    pub fn chars(&mut self, text: &str) -> Vec<Notice> {
        text.chars().flat_map(|c| self.key(KeyEvent::char(c))).collect()
    }

    pub fn press(&mut self, code: KeyCode) -> Vec<Notice> {
        self.key(KeyEvent::plain(code))
    }

    /// Run tasks synchronously in FIFO order, feeding results back, the way
    /// the runtime does with real background tasks.
    pub fn drain(&mut self, tasks: Vec<Task>) -> Vec<Notice> {
        let mut queue: VecDeque<Task> = tasks.into();
        let mut notices = Vec::new();
        let mut steps = 0;
        while let Some(task) = queue.pop_front() {
            steps += 1;
            assert!(steps < 10_000, "task loop did not settle");
            match task {
                Task::Background(job) => queue.extend(self.model.update(job())),
                Task::Command(command) => {
                    for msg in run_command_task(self.runner.as_ref(), command) {
                        queue.extend(self.model.update(msg));
                    }
                }
                Task::Notice(notice) => {
                    if let Notice::UpdateRevset(revset) = &notice {
                        queue.extend(self.model.update(Msg::UpdateRevset(revset.clone())));
                    }
                    notices.push(notice);
                }
            }
        }
        notices
    }

    pub fn cursor(&self) -> Option<usize> {
        self.model.cursor()
    }

    pub fn cursor_id(&self) -> String {
        self.model
            .selected_commit()
            .map(|c| c.change_id().to_string())
            .unwrap_or_default()
    }
}

pub fn flashes(notices: &[Notice]) -> Vec<(String, bool)> {
    notices
        .iter()
        .filter_map(|n| match n {
            Notice::Flash { text, error } => Some((text.clone(), *error)),
            _ => None,
        })
        .collect()
}

/// Take the single background job out of `tasks`.
pub fn single_job(mut tasks: Vec<Task>) -> core_revisions::BackgroundJob {
    assert_eq!(tasks.len(), 1, "expected one task, got {tasks:?}");
    match tasks.remove(0) {
        Task::Background(job) => job,
        other => panic!("expected background task, got {other:?}"),
    }
}
