use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec, IoMode};
use crate::error::{FundingError, Result};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;

/// Production runner that spawns the command as a child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).stdin(Stdio::null()).kill_on_drop(true);

        let launch_err = |source| FundingError::Launch {
            program: spec.program.clone(),
            source,
        };

        match spec.io {
            IoMode::Capture => {
                let output = cmd.output().await.map_err(launch_err)?;
                Ok(CommandOutput {
                    status: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            IoMode::Inherit => {
                let status = cmd
                    .stdout(io::stderr())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(launch_err)?;
                Ok(CommandOutput {
                    status: status.code().unwrap_or(-1),
                    ..CommandOutput::default()
                })
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_status() {
        let spec = CommandSpec::new("sh").args(["-c", "echo 42; echo oops >&2; exit 3"]);
        let output = ProcessRunner::new().run(&spec).await.unwrap();
        assert_eq!(output.status, 3);
        assert_eq!(output.stdout.trim(), "42");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_inherit_mode_reports_status_only() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "exit 0"])
            .io(IoMode::Inherit);
        let output = ProcessRunner::new().run(&spec).await.unwrap();
        assert!(output.is_success());
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let spec = CommandSpec::new("definitely-not-a-real-binary-7f3a");
        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, FundingError::Launch { .. }));
        assert!(!err.is_fatal());
    }
}
