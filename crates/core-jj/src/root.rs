//! Repository root discovery.
//!
//! Terminal multiplexers that export `VMUX`/`VMUX_TERMINAL_ID` can make `jj`
//! resolve paths against the wrong session; when the first attempt fails and
//! either variable is set, the lookup is retried once with both removed. The
//! returned runner keeps whichever environment made the lookup succeed.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{CommandRunner, JjCommand, ProcessRunner, RunError};

pub const MULTIPLEXER_VARS: [&str; 2] = ["VMUX", "VMUX_TERMINAL_ID"];

/// A resolved workspace and the runner every later command should use.
#[derive(Debug, Clone)]
pub struct RepoRoot {
    pub path: PathBuf,
    pub runner: ProcessRunner,
    /// Whether the multiplexer variables had to be removed.
    pub stripped_env: bool,
}

/// Resolve the workspace root containing `dir`.
pub fn repo_root(program: &Path, dir: &Path) -> Result<RepoRoot, RunError> {
    let multiplexed = MULTIPLEXER_VARS
        .iter()
        .any(|key| std::env::var_os(key).is_some());
    let (path, stripped_env) = resolve_root(multiplexed, |strip| {
        runner_for(program, dir, strip).run(&JjCommand::root())
    })
    .map_err(|err| match err {
        RunError::Failed { .. } => RunError::NotARepository(dir.to_path_buf()),
        other => other,
    })?;
    Ok(RepoRoot {
        runner: runner_for(program, &path, stripped_env),
        path,
        stripped_env,
    })
}

fn runner_for(program: &Path, dir: &Path, strip: bool) -> ProcessRunner {
    let runner = ProcessRunner::new(program, dir);
    if !strip {
        return runner;
    }
    MULTIPLEXER_VARS
        .iter()
        .fold(runner, |runner, key| runner.without_env(*key))
}

/// Returns the root and whether it took the stripped retry to find it.
fn resolve_root<F>(multiplexed: bool, mut lookup: F) -> Result<(PathBuf, bool), RunError>
where
    F: FnMut(bool) -> Result<String, RunError>,
{
    let (output, stripped) = match lookup(false) {
        Ok(output) => (output, false),
        Err(err) if multiplexed => {
            warn!(target: "jj.root", %err, "root_lookup_failed_retrying_without_multiplexer_env");
            (lookup(true)?, true)
        }
        Err(err) => return Err(err),
    };
    let root = PathBuf::from(output.trim());
    info!(target: "jj.root", root = %root.display(), stripped, "repo_root");
    Ok((root, stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> RunError {
        RunError::Failed {
            command: "jj root".into(),
            status: "1".into(),
            stdout: String::new(),
            stderr: "There is no jj repo".into(),
        }
    }

    #[test]
    fn retries_without_multiplexer_env() {
        let mut calls = Vec::new();
        let root = resolve_root(true, |strip| {
            calls.push(strip);
            if strip {
                Ok("/work/repo\n".into())
            } else {
                Err(failed())
            }
        })
        .unwrap();
        assert_eq!(root, (PathBuf::from("/work/repo"), true));
        assert_eq!(calls, vec![false, true]);
    }

    #[test]
    fn no_retry_outside_multiplexer() {
        let mut calls = 0;
        let err = resolve_root(false, |_| {
            calls += 1;
            Err(failed())
        })
        .unwrap_err();
        assert!(matches!(err, RunError::Failed { .. }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn first_success_wins() {
        let mut calls = 0;
        let root = resolve_root(true, |_| {
            calls += 1;
            Ok("/r".into())
        })
        .unwrap();
        assert_eq!(root, (PathBuf::from("/r"), false));
        assert_eq!(calls, 1);
    }

    #[test]
    fn stripped_runner_removes_every_multiplexer_var() {
        let runner = runner_for(Path::new("jj"), Path::new("/work/repo"), true);
        assert_eq!(runner.removed_env(), ["VMUX", "VMUX_TERMINAL_ID"]);
        assert_eq!(runner.workdir(), Path::new("/work/repo"));
        assert!(runner_for(Path::new("jj"), Path::new("/r"), false).removed_env().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn runner_keeps_stripped_env_for_later_commands() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("jj");
        std::fs::write(
            &script,
            "#!/bin/sh\nif [ \"$1\" = root ]; then pwd; else echo \"${VMUX-unset}\"; fi\n",
        )
        .unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let (path, stripped) = resolve_root(true, |strip| {
            runner_for(&script, dir.path(), strip).run(&JjCommand::root())
        })
        .unwrap();
        assert!(!stripped);
        let runner = runner_for(&script, &path, true);
        let out = runner.run(&JjCommand::new(["log"])).unwrap();
        assert_eq!(out.trim(), "unset");
    }
}
