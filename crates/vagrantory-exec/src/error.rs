//! Error types for vagrantory-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while invoking the external tool
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// The program could not be started (missing binary, permission denied)
    #[error("failed to spawn {program}: {reason}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying OS error
        reason: String,
    },

    /// I/O error while waiting for the process
    #[error("I/O error: {0}")]
    Io(String),

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },
}

impl ExecError {
    /// Check if the tool is missing or not executable
    #[must_use]
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, ExecError::Spawn { .. })
    }
}
