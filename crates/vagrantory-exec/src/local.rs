//! Local command execution using `tokio::process`

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandRunner;

/// Default program invoked by [`LocalExecutor`]
pub const DEFAULT_PROGRAM: &str = "vagrant";

/// Local command executor
///
/// Spawns the configured program directly (no shell) with the working
/// directory set on the child process only.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    program: String,
}

impl LocalExecutor {
    /// Create an executor for the `vagrant` binary on `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Create an executor for an alternative program
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program this executor runs
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self), fields(program = %self.program), level = "debug")]
    async fn execute(&self, args: &[&str], working_dir: &Path) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(?args, dir = %working_dir.display(), "executing command");

        let child = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            ?args,
            status = status,
            duration = ?duration,
            "command completed"
        );

        let result = CommandResult {
            status,
            stdout,
            stderr,
            duration,
        };

        // stderr alone never fails the call
        if result.has_stderr() {
            warn!(?args, stderr = %result.stderr.trim(), "command wrote to stderr");
        }
        if !result.success() {
            error!(?args, status = status, "command exited with non-zero status");
        }

        Ok(result)
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for LocalExecutor {
    async fn run(&self, args: &[&str], working_dir: &Path) -> Result<CommandResult, ExecError> {
        self.execute(args, working_dir).await
    }

    async fn run_with_timeout(
        &self,
        args: &[&str],
        working_dir: &Path,
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        match timeout(timeout_duration, self.execute(args, working_dir)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    ?args,
                    timeout = ?timeout_duration,
                    elapsed = ?start.elapsed(),
                    "command timed out"
                );
                Err(ExecError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    fn executor_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh() -> LocalExecutor {
        LocalExecutor::with_program("sh")
    }

    #[tokio::test]
    async fn test_run_success() {
        let dir = tempfile::tempdir().unwrap();
        let result = sh().run(&["-c", "echo hello"], dir.path()).await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_failure_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = sh().run(&["-c", "exit 42"], dir.path()).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.status, 42);
    }

    #[tokio::test]
    async fn test_run_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let result = sh()
            .run(&["-c", "echo out; echo warning >&2"], dir.path())
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "warning");
    }

    #[tokio::test]
    async fn test_runs_in_working_dir_without_changing_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        let result = sh().run(&["-c", "pwd -P"], dir.path()).await.unwrap();

        let reported = std::path::PathBuf::from(result.stdout.trim());
        assert_eq!(reported, dir.path().canonicalize().unwrap());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let executor = LocalExecutor::with_program("vagrantory-no-such-binary");
        let result = executor.run(&["status"], dir.path()).await;

        assert!(matches!(result, Err(ExecError::Spawn { .. })));
        assert!(result.unwrap_err().is_spawn_failure());
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let result = sh()
            .run_with_timeout(&["-c", "sleep 5"], dir.path(), Duration::from_millis(100))
            .await;

        assert!(matches!(result, Err(ExecError::Timeout { .. })));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(LocalExecutor::default().program(), "vagrant");
    }
}
