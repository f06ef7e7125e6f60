//! Execution of `CommandTask`s off the event loop.

use core_actions::{CommandTask, FollowUp};
use core_jj::{CommandRunner, JjCommand, RunError};
use tracing::{debug, info, warn};

use crate::msg::Msg;
use crate::resolve::WORKING_COPY;

/// Run the command and then its follow-ups in order, stopping at the first
/// failure. The returned messages must be delivered in order.
pub fn run_command_task(runner: &dyn CommandRunner, task: CommandTask) -> Vec<Msg> {
    let CommandTask {
        command,
        follow_ups,
    } = task;
    info!(target: "revisions.exec", %command, follow_ups = follow_ups.len(), "command_start");

    let mut msgs = Vec::with_capacity(follow_ups.len() + 1);
    match runner.run(&command) {
        Ok(output) => msgs.push(Msg::CommandCompleted {
            output,
            error: None,
        }),
        Err(err) => {
            msgs.push(failed(&command, err));
            return msgs;
        }
    }

    for follow_up in follow_ups {
        debug!(target: "revisions.exec", ?follow_up, "follow_up");
        match follow_up {
            FollowUp::Run(next) => match runner.run(&next) {
                Ok(output) => msgs.push(Msg::CommandCompleted {
                    output,
                    error: None,
                }),
                Err(err) => {
                    msgs.push(failed(&next, err));
                    return msgs;
                }
            },
            FollowUp::Refresh { keep_selections } => msgs.push(Msg::Refresh {
                keep_selections,
                selected_revision: None,
            }),
            FollowUp::RefreshAndSelect(revision) => msgs.push(Msg::Refresh {
                keep_selections: false,
                selected_revision: Some(revision),
            }),
            FollowUp::SelectLatestChild { base } => {
                let lookup = JjCommand::ids_from_revset(&format!("latest(children({base}), 1)"));
                match runner.run(&lookup) {
                    Ok(output) => {
                        let child = output
                            .lines()
                            .map(str::trim)
                            .find(|line| !line.is_empty())
                            .unwrap_or(WORKING_COPY);
                        msgs.push(Msg::Refresh {
                            keep_selections: false,
                            selected_revision: Some(child.to_string()),
                        });
                    }
                    Err(err) => {
                        msgs.push(failed(&lookup, err));
                        return msgs;
                    }
                }
            }
            FollowUp::CloseOperation => msgs.push(Msg::CloseOperation),
        }
    }
    msgs
}

fn failed(command: &JjCommand, err: RunError) -> Msg {
    warn!(target: "revisions.exec", %command, %err, "command_failed");
    Msg::CommandCompleted {
        output: err.output(),
        error: Some(err.to_string()),
    }
}
