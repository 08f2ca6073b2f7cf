//! Error types for vagrantory-inventory

use thiserror::Error;
use vagrantory_exec::ExecError;

/// Errors that can occur while building the inventory
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// The vagrant binary could not be started
    #[error("failed to invoke vagrant: {0}")]
    ToolInvocation(String),

    /// vagrant ran but reported a failure
    #[error("vagrant command failed (status {status}): {stderr}")]
    Execution {
        /// Exit status code
        status: i32,
        /// stderr output
        stderr: String,
    },

    /// Missing or invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Cache read or write failure
    #[error("cache error: {0}")]
    Cache(String),

    /// Variable set on a host or group the inventory does not know
    #[error("unknown host or group: {0}")]
    UnknownEntity(String),

    /// Failed to serialize or deserialize inventory data
    #[error("parse error: {0}")]
    Parse(String),
}

impl InventoryError {
    /// Check if the error was raised before anything was fetched
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, InventoryError::Config(_))
    }

    /// Check if vagrant itself is missing or failing
    #[must_use]
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            InventoryError::ToolInvocation(_) | InventoryError::Execution { .. }
        )
    }
}

impl From<ExecError> for InventoryError {
    fn from(err: ExecError) -> Self {
        InventoryError::ToolInvocation(err.to_string())
    }
}
