//! External command execution with a bounded deadline.
//!
//! Every call into the snapshot subsystem goes through here: one short-lived
//! subprocess per operation, killed if it outlives the configured timeout so
//! a wedged storage stack cannot wedge the pass.

use crate::error::{AutosnapError, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Runs one external command per call, capturing stdout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl CommandRunner {
    /// Create a runner for the given binary with a per-call deadline.
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Run the binary with `args`, returning its stdout as UTF-8.
    ///
    /// Non-zero exit yields [`AutosnapError::CommandFailed`]; exceeding the
    /// deadline yields [`AutosnapError::CommandTimeout`] and kills the
    /// child.
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let rendered = self.render(args);

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| AutosnapError::CommandTimeout {
            command: rendered.clone(),
            timeout: self.timeout,
        })??;

        if !output.status.success() {
            return Err(AutosnapError::CommandFailed {
                command: rendered,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn render(&self, args: &[&str]) -> String {
        let mut rendered = self.binary.display().to_string();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let runner = CommandRunner::new(PathBuf::from("echo"), Duration::from_secs(5));
        let output = runner.run(&["hello", "world"]).await.unwrap();
        assert_eq!(output.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_command_failed() {
        let runner = CommandRunner::new(PathBuf::from("sh"), Duration::from_secs(5));
        let err = runner.run(&["-c", "echo oops >&2; exit 3"]).await.unwrap_err();

        match err {
            AutosnapError::CommandFailed { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deadline_enforced() {
        let runner = CommandRunner::new(PathBuf::from("sleep"), Duration::from_millis(50));
        let err = runner.run(&["5"]).await.unwrap_err();
        assert!(matches!(err, AutosnapError::CommandTimeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let runner = CommandRunner::new(
            PathBuf::from("/nonexistent/autosnap-test-binary"),
            Duration::from_secs(5),
        );
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, AutosnapError::Io(_)));
    }
}
