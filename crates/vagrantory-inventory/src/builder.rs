//! Inventory building: fetch or cache read, then population

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, instrument, warn};
use vagrantory_exec::{CommandRunner, LocalExecutor};

use crate::PLUGIN_NAME;
use crate::cache::{CacheStore, cache_key, open_cache};
use crate::config::SourceConfig;
use crate::error::InventoryError;
use crate::sink::InventorySink;
use crate::types::{GuestRecord, Snapshot};
use crate::vagrant::VagrantClient;

/// Group holding every discovered guest
pub const VAGRANT_GROUP: &str = "vagrant_machines";
/// Guests with a forwarded SSH port
pub const RUNNING_GROUP: &str = "running";
/// Guests without a forwarded SSH port
pub const NOT_RUNNING_GROUP: &str = "not_running";

/// Where a snapshot comes from for one parse cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Read the cache, falling back to a fetch on a miss
    UseCache,
    /// Fetch and overwrite the cache entry
    RefreshAndStore,
    /// Fetch, leave the cache alone
    FetchWithoutCache,
}

impl CacheMode {
    /// Pick the mode from the user's cache option and the caller's refresh request
    #[must_use]
    pub fn select(cache_enabled: bool, refresh: bool) -> Self {
        match (cache_enabled, refresh) {
            (false, _) => CacheMode::FetchWithoutCache,
            (true, false) => CacheMode::UseCache,
            (true, true) => CacheMode::RefreshAndStore,
        }
    }
}

/// Builds the inventory for one `vagrant.yml` source
pub struct InventoryBuilder {
    config: SourceConfig,
    client: VagrantClient,
    cache: Box<dyn CacheStore>,
    cache_key: String,
}

impl InventoryBuilder {
    /// Create a builder with an explicit runner and cache store
    ///
    /// # Arguments
    /// * `config` - Parsed source configuration
    /// * `config_path` - Path of the source file, used for the project path and cache key
    /// * `runner` - Runner for the vagrant binary
    /// * `cache` - Cache store consulted when caching is enabled
    pub fn new(
        config: SourceConfig,
        config_path: &Path,
        runner: Arc<dyn CommandRunner>,
        cache: Box<dyn CacheStore>,
    ) -> Self {
        let project_dir = config.resolve_project_path(config_path);
        Self {
            client: VagrantClient::new(runner, project_dir),
            cache_key: cache_key(PLUGIN_NAME, config_path),
            config,
            cache,
        }
    }

    /// Create a builder using the local vagrant binary and the configured cache backend
    #[must_use]
    pub fn from_config(config: SourceConfig, config_path: &Path) -> Self {
        let runner = Arc::new(LocalExecutor::with_program(config.vagrant_binary.clone()));
        let cache = open_cache(&config);
        Self::new(config, config_path, runner, cache)
    }

    /// Key this source is cached under
    #[must_use]
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Resolved project directory
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        self.client.project_dir()
    }

    /// Obtain a snapshot and populate `sink` with it
    ///
    /// Nothing is written to `sink` if the snapshot cannot be obtained.
    ///
    /// # Errors
    /// Returns an error if vagrant cannot be invoked or discovery fails.
    pub async fn parse(
        &self,
        sink: &mut dyn InventorySink,
        refresh: bool,
    ) -> Result<Snapshot, InventoryError> {
        let snapshot = self.load(refresh).await?;
        populate(sink, &snapshot)?;
        Ok(snapshot)
    }

    /// Obtain a snapshot from the cache or vagrant, as the cache mode dictates
    ///
    /// # Errors
    /// Returns an error if a fetch is needed and fails.
    #[instrument(skip(self), fields(key = %self.cache_key))]
    pub async fn load(&self, refresh: bool) -> Result<Snapshot, InventoryError> {
        let mode = CacheMode::select(self.config.cache, refresh);
        debug!(?mode, backend = self.cache.backend(), "selected cache mode");

        match mode {
            CacheMode::FetchWithoutCache => self.fetch().await,
            CacheMode::RefreshAndStore => self.fetch_and_store().await,
            CacheMode::UseCache => match self.cache.get(&self.cache_key).await {
                Ok(Some(snapshot)) => {
                    debug!(guests = snapshot.len(), "using cached inventory");
                    Ok(snapshot)
                }
                Ok(None) => {
                    info!("inventory not found in cache");
                    self.fetch_and_store().await
                }
                Err(e) => {
                    warn!(error = %e, "failed to read cache");
                    self.fetch_and_store().await
                }
            },
        }
    }

    async fn fetch_and_store(&self) -> Result<Snapshot, InventoryError> {
        let snapshot = self.fetch().await?;
        if let Err(e) = self.cache.set(&self.cache_key, &snapshot).await {
            warn!(error = %e, "failed to update cache");
        }
        Ok(snapshot)
    }

    /// Query vagrant for guests and their forwarded SSH ports
    ///
    /// # Errors
    /// Returns an error if any vagrant invocation fails; no partial snapshot
    /// is returned.
    #[instrument(skip(self), fields(project = %self.client.project_dir().display()))]
    pub async fn fetch(&self) -> Result<Snapshot, InventoryError> {
        let mut snapshot = Snapshot::new();

        for guest in self.client.list_guests().await? {
            let record = match self.client.resolve_port(&guest, self.config.ssh_port).await? {
                Some(port) => GuestRecord::with_port(port),
                None => GuestRecord::default(),
            };
            snapshot.insert(guest, record);
        }

        info!(guests = snapshot.len(), "fetched vagrant inventory");
        Ok(snapshot)
    }
}

/// Write `snapshot` into `sink`
///
/// Every guest joins `vagrant_machines` and exactly one of `running` /
/// `not_running`; running guests also get `ansible_port`.
///
/// # Errors
/// Returns an error only if the sink rejects a variable.
pub fn populate(sink: &mut dyn InventorySink, snapshot: &Snapshot) -> Result<(), InventoryError> {
    let vagrant = sink.add_group(VAGRANT_GROUP);
    sink.set_variable(&vagrant, "ansible_host", json!("127.0.0.1"))?;
    sink.set_variable(&vagrant, "ansible_user", json!("vagrant"))?;

    let not_running = sink.add_group(NOT_RUNNING_GROUP);
    let running = sink.add_group(RUNNING_GROUP);

    for (name, record) in snapshot.iter() {
        let host = sink.add_host(name, Some(vagrant.as_str()));
        match record.ssh_port {
            Some(port) => {
                sink.add_host(&host, Some(running.as_str()));
                sink.set_variable(&host, "ansible_port", json!(port))?;
            }
            None => {
                sink.add_host(&host, Some(not_running.as_str()));
            }
        }
    }

    Ok(())
}
