use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::{debug, trace};

use crate::{JjCommand, RunError};

/// Executes backend commands synchronously. Implementations must be cheap
/// to share across the background task pool.
pub trait CommandRunner: Send + Sync {
    /// Run to completion and return stdout on success.
    fn run(&self, command: &JjCommand) -> Result<String, RunError>;
}

/// Runs commands as child processes of the configured `jj` binary.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    workdir: PathBuf,
    removed_env: Vec<OsString>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
            removed_env: Vec::new(),
        }
    }

    /// Strip an environment variable from every spawned child.
    pub fn without_env(mut self, key: impl Into<OsString>) -> Self {
        self.removed_env.push(key.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn removed_env(&self) -> &[OsString] {
        &self.removed_env
    }

    fn command(&self, command: &JjCommand) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(command.args()).current_dir(&self.workdir);
        for key in &self.removed_env {
            cmd.env_remove(key);
        }
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> RunError {
        RunError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }

    /// Spawn with stdout/stderr piped for incremental reading.
    pub fn spawn(&self, command: &JjCommand) -> Result<Child, RunError> {
        debug!(target: "jj.command", command = %command, "spawn_streaming");
        self.command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &JjCommand) -> Result<String, RunError> {
        debug!(
            target: "jj.command",
            command = %command,
            mutating = command.is_mutating(),
            "run"
        );
        let output = self
            .command(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            debug!(target: "jj.command", status = %output.status, "run_failed");
            return Err(RunError::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
                stdout,
                stderr,
            });
        }
        trace!(target: "jj.command", stdout_len = stdout.len(), "run_ok");
        // Mutating commands report their effects on stderr.
        if command.is_mutating() && !stderr.is_empty() {
            return Ok(stdout + &stderr);
        }
        Ok(stdout)
    }
}
