//! Command runner trait

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs the external tool with a fixed argument list
///
/// `working_dir` scopes the invocation; implementations must not change the
/// working directory of the calling process.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str], working_dir: &Path) -> Result<CommandResult, ExecError>;

    async fn run_with_timeout(
        &self,
        args: &[&str],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    fn executor_type(&self) -> &'static str;
}
