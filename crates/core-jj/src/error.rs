use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` failed ({status}): {}", .stderr.trim())]
    Failed {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },
    #[error("{} is not inside a jj repository", .0.display())]
    NotARepository(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RunError {
    /// Captured process output worth showing next to the error message.
    pub fn output(&self) -> String {
        match self {
            RunError::Failed { stdout, stderr, .. } => {
                let mut out = stdout.trim_end().to_string();
                if !stderr.trim().is_empty() {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(stderr.trim_end());
                }
                out
            }
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_display_uses_trimmed_stderr() {
        let err = RunError::Failed {
            command: "jj abandon x".into(),
            status: "exit status: 1".into(),
            stdout: String::new(),
            stderr: "Error: Revision x doesn't exist\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "`jj abandon x` failed (exit status: 1): Error: Revision x doesn't exist"
        );
        assert_eq!(err.output(), "Error: Revision x doesn't exist");
    }

    #[test]
    fn output_joins_stdout_and_stderr() {
        let err = RunError::Failed {
            command: "jj".into(),
            status: "1".into(),
            stdout: "partial\n".into(),
            stderr: "boom\n".into(),
        };
        assert_eq!(err.output(), "partial\nboom");
        assert_eq!(
            RunError::NotARepository(PathBuf::from("/tmp")).output(),
            ""
        );
    }
}
