//! Inventory cache stores

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::config::{CachePlugin, SourceConfig};
use crate::error::InventoryError;
use crate::types::Snapshot;

/// Key-value store for inventory snapshots
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the snapshot stored under `key`, `None` on a miss
    async fn get(&self, key: &str) -> Result<Option<Snapshot>, InventoryError>;

    /// Store `snapshot` under `key`, replacing any previous entry
    async fn set(&self, key: &str, snapshot: &Snapshot) -> Result<(), InventoryError>;

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Snapshot>, InventoryError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, snapshot: &Snapshot) -> Result<(), InventoryError> {
        (**self).set(key, snapshot).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Derive the cache key for an inventory source file
///
/// Shape: `<plugin>_<5 hex of plugin digest>s_<5 hex of path digest>`.
#[must_use]
pub fn cache_key(plugin: &str, config_path: &Path) -> String {
    let short_digest = |bytes: &[u8]| {
        let hash = Sha256::digest(bytes);
        hex::encode(hash)[..5].to_string()
    };
    let path = config_path.to_string_lossy();
    format!(
        "{plugin}_{}s_{}",
        short_digest(plugin.as_bytes()),
        short_digest(path.as_bytes())
    )
}

/// Build the cache backend selected in `config`
#[must_use]
pub fn open_cache(config: &SourceConfig) -> Box<dyn CacheStore> {
    match config.cache_plugin {
        CachePlugin::Memory => Box::new(MemoryCache::new()),
        CachePlugin::JsonFile => Box::new(JsonFileCache::new(
            config.cache_dir(),
            config.cache_prefix.clone(),
            config.cache_timeout,
        )),
    }
}

/// Process-local cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Snapshot>>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Snapshot>, InventoryError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, snapshot: &Snapshot) -> Result<(), InventoryError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// On-disk cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CachedSnapshot {
    /// When the entry was written
    cached_at: DateTime<Utc>,
    /// Cached inventory
    data: Snapshot,
}

/// File-backed cache, one JSON document per key
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    /// Directory holding cache files
    dir: PathBuf,
    /// File name prefix
    prefix: String,
    /// Entry lifetime in seconds, 0 disables expiry
    timeout_secs: u64,
}

impl JsonFileCache {
    /// Create a cache rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            timeout_secs,
        }
    }

    /// File backing `key`
    #[must_use]
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{key}", self.prefix))
    }

    fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
        if self.timeout_secs == 0 {
            return false;
        }
        let ttl = i64::try_from(self.timeout_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Utc::now() - cached_at > ttl
    }
}

#[async_trait]
impl CacheStore for JsonFileCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Snapshot>, InventoryError> {
        let path = self.entry_path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InventoryError::Cache(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        let entry: CachedSnapshot = serde_json::from_str(&content)
            .map_err(|e| InventoryError::Cache(format!("corrupt entry {}: {e}", path.display())))?;

        if self.is_expired(entry.cached_at) {
            debug!(cached_at = %entry.cached_at, "cache entry expired");
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    #[instrument(skip(self, snapshot))]
    async fn set(&self, key: &str, snapshot: &Snapshot) -> Result<(), InventoryError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            InventoryError::Cache(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        let entry = CachedSnapshot {
            cached_at: Utc::now(),
            data: snapshot.clone(),
        };
        let json =
            serde_json::to_string(&entry).map_err(|e| InventoryError::Parse(e.to_string()))?;

        let path = self.entry_path(key);
        tokio::fs::write(&path, json).await.map_err(|e| {
            InventoryError::Cache(format!("cannot write {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "cache entry written");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "jsonfile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuestRecord;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("default", GuestRecord::with_port(2222));
        snapshot.insert("db", GuestRecord::default());
        snapshot
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key("vagrant", Path::new("/etc/inv/vagrant.yml"));
        let b = cache_key("vagrant", Path::new("/etc/inv/vagrant.yml"));
        let c = cache_key("vagrant", Path::new("/etc/inv/lab.vagrant.yml"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("vagrant_"));
        // vagrant_ + 5 + s_ + 5
        assert_eq!(a.len(), 8 + 5 + 2 + 5);
    }

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", &sample()).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(sample()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_json_file_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path().join("nested"), "inv_", 3600);

        assert_eq!(cache.get("k").await.unwrap(), None);
        cache.set("k", &sample()).await.unwrap();

        assert!(dir.path().join("nested/inv_k").exists());
        assert_eq!(cache.get("k").await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_json_file_cache_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path(), "inv_", 60);
        let stale = CachedSnapshot {
            cached_at: Utc::now() - Duration::seconds(120),
            data: sample(),
        };
        std::fs::write(
            cache.entry_path("k"),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);

        let forever = JsonFileCache::new(dir.path(), "inv_", 0);
        assert_eq!(forever.get("k").await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_json_file_cache_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path(), "", 0);
        std::fs::write(cache.entry_path("k"), "not json").unwrap();

        assert!(matches!(
            cache.get("k").await,
            Err(InventoryError::Cache(_))
        ));
    }

    #[test]
    fn test_open_cache_backend() {
        let mut config = SourceConfig::new("/srv/vm");
        assert_eq!(open_cache(&config).backend(), "memory");

        config.cache_plugin = CachePlugin::JsonFile;
        assert_eq!(open_cache(&config).backend(), "jsonfile");
    }
}
