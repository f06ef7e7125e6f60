//! Runs engine tasks off the event loop.
//!
//! Background jobs and command tasks go to the blocking pool; their
//! resulting messages come back through an unbounded channel so a slow
//! loop never stalls a finished job. Notices are returned to the caller.

use std::sync::Arc;

use core_jj::CommandRunner;
use core_revisions::{Msg, Notice, Task, run_command_task};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    tx: UnboundedSender<Msg>,
}

impl Executor {
    pub fn new(runner: Arc<dyn CommandRunner>, tx: UnboundedSender<Msg>) -> Self {
        Self { runner, tx }
    }

    /// Start every background task; hand the notices back in order.
    pub fn spawn_all(&self, tasks: Vec<Task>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for task in tasks {
            match task {
                Task::Background(job) => {
                    let tx = self.tx.clone();
                    tokio::task::spawn_blocking(move || {
                        if tx.send(job()).is_err() {
                            trace!(target: "runtime.executor", "result_dropped_loop_closed");
                        }
                    });
                }
                Task::Command(command) => {
                    let tx = self.tx.clone();
                    let runner = Arc::clone(&self.runner);
                    trace!(target: "runtime.executor", command = %command.command, "command_spawned");
                    tokio::task::spawn_blocking(move || {
                        for msg in run_command_task(runner.as_ref(), command) {
                            if tx.send(msg).is_err() {
                                warn!(target: "runtime.executor", "command_result_dropped");
                                break;
                            }
                        }
                    });
                }
                Task::Notice(notice) => notices.push(notice),
            }
        }
        notices
    }
}
