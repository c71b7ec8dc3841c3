//! Running synthesized install commands

use async_trait::async_trait;
use camino::Utf8PathBuf;
use peercheck_core::error::PeerCheckError;
use peercheck_core::types::CommandLine;
use tokio::process::Command;
use tracing::debug;

use crate::ResolverResult;

/// Exit status of one install command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes package-manager commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion; a non-zero exit is a status, not an error
    async fn run(&self, command: &CommandLine) -> ResolverResult<CommandStatus>;
}

/// Runs commands through the platform shell with inherited stdio
#[derive(Debug, Clone)]
pub struct ShellRunner {
    cwd: Utf8PathBuf,
}

impl ShellRunner {
    pub fn new(cwd: impl Into<Utf8PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn shell_command(line: &str) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.args(["/C", line]);
            command
        } else {
            let mut command = Command::new("sh");
            command.args(["-c", line]);
            command
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &CommandLine) -> ResolverResult<CommandStatus> {
        let line = command.to_string();
        debug!("Spawning `{}` in {}", line, self.cwd);

        let status = Self::shell_command(&line)
            .current_dir(&self.cwd)
            .status()
            .await
            .map_err(|e| PeerCheckError::io(format!("Failed to run `{}`", line), e))?;

        Ok(CommandStatus { code: status.code() })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> (tempfile::TempDir, ShellRunner) {
        let temp_dir = tempfile::tempdir().unwrap();
        let cwd = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, ShellRunner::new(cwd))
    }

    #[tokio::test]
    async fn test_successful_command() {
        let (_temp_dir, runner) = runner();
        let status = runner.run(&CommandLine::new("true", Vec::new())).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_failing_command_is_a_status() {
        let (_temp_dir, runner) = runner();
        let status = runner
            .run(&CommandLine::new("exit", vec!["3".to_string()]))
            .await
            .unwrap();
        assert_eq!(status.code, Some(3));
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let (temp_dir, runner) = runner();
        let status = runner
            .run(&CommandLine::new("touch", vec!["marker".to_string()]))
            .await
            .unwrap();
        assert!(status.success());
        assert!(temp_dir.path().join("marker").exists());
    }
}
