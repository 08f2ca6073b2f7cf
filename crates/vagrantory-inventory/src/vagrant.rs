//! Vagrant CLI client for guest discovery and port lookup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};
use vagrantory_exec::CommandRunner;

use crate::error::InventoryError;
use crate::machine_readable::{parse_forwarded_port, parse_guests};
use crate::types::GuestStatus;

/// Vagrant client scoped to one project directory
///
/// Every command runs with the project directory as its working directory;
/// the calling process's working directory is left alone.
pub struct VagrantClient {
    /// Runner for the vagrant binary
    runner: Arc<dyn CommandRunner>,
    /// Directory containing the project's Vagrantfile
    project_dir: PathBuf,
}

impl VagrantClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `runner` - Command runner for the vagrant binary
    /// * `project_dir` - Resolved project directory
    pub fn new(runner: Arc<dyn CommandRunner>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            project_dir: project_dir.into(),
        }
    }

    /// Project directory commands run in
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// List guests with their lifecycle state
    ///
    /// # Errors
    /// Returns an error if vagrant cannot be started, or if it exits with a
    /// non-zero status and reports an error on stderr.
    #[instrument(skip(self), fields(project = %self.project_dir.display()))]
    pub async fn list_machines(&self) -> Result<Vec<GuestStatus>, InventoryError> {
        let result = self
            .runner
            .run(&["status", "--machine-readable"], &self.project_dir)
            .await?;

        if !result.success() && result.has_stderr() {
            return Err(InventoryError::Execution {
                status: result.status,
                stderr: result.stderr.trim().to_string(),
            });
        }

        let guests = parse_guests(&result.stdout);
        debug!(count = guests.len(), "discovered guests");

        Ok(guests)
    }

    /// List guest identifiers in the order vagrant reports them
    ///
    /// # Errors
    /// See [`VagrantClient::list_machines`].
    pub async fn list_guests(&self) -> Result<Vec<String>, InventoryError> {
        Ok(self
            .list_machines()
            .await?
            .into_iter()
            .map(|guest| guest.name)
            .collect())
    }

    /// Resolve the host port forwarded to `internal_port` on `guest`
    ///
    /// vagrant exits non-zero for guests that are not running; that is
    /// reported as `None`, not as an error.
    ///
    /// # Errors
    /// Returns an error only if vagrant cannot be started.
    #[instrument(skip(self), fields(project = %self.project_dir.display()))]
    pub async fn resolve_port(
        &self,
        guest: &str,
        internal_port: u16,
    ) -> Result<Option<u16>, InventoryError> {
        let result = self
            .runner
            .run(&["port", guest, "--machine-readable"], &self.project_dir)
            .await?;

        let port = parse_forwarded_port(&result.stdout, internal_port);
        debug!(status = result.status, ?port, "resolved port");

        Ok(port)
    }
}
