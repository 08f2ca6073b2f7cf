//! Result types for command execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit status code (0 for success, -1 when killed by a signal)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Build a successful result with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration: Duration::ZERO,
        }
    }

    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Check if the tool wrote anything to stderr
    #[must_use]
    pub fn has_stderr(&self) -> bool {
        !self.stderr.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_result() {
        let result = CommandResult::ok("1,default,state,running\n");
        assert!(result.success());
        assert!(!result.has_stderr());
    }

    #[test]
    fn test_whitespace_stderr_is_empty() {
        let mut result = CommandResult::ok("");
        result.stderr = " \n".to_string();
        assert!(!result.has_stderr());
    }
}
