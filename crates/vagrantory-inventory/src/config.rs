//! Inventory source configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::PLUGIN_NAME;
use crate::error::InventoryError;

/// File name suffixes accepted as inventory sources
const ACCEPTED_SUFFIXES: [&str; 2] = ["vagrant.yml", "vagrant.yaml"];

/// Contents of a `vagrant.yml` inventory source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Token identifying this source, must be `vagrant`
    pub plugin: String,
    /// Directory where vagrant commands run, relative to the config file if not absolute
    pub project_path: PathBuf,
    /// Guest port SSH listens on
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    /// vagrant binary to invoke
    #[serde(default = "default_vagrant_binary")]
    pub vagrant_binary: String,
    /// Enable the inventory cache
    #[serde(default)]
    pub cache: bool,
    /// Cache backend
    #[serde(default)]
    pub cache_plugin: CachePlugin,
    /// Cache entry lifetime in seconds (0 never expires)
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout: u64,
    /// Directory for file-backed caches
    pub cache_connection: Option<PathBuf>,
    /// Prefix for cache file names
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,
}

/// Available cache backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePlugin {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// One JSON document per key on disk
    #[serde(rename = "jsonfile")]
    JsonFile,
}

fn default_ssh_port() -> u16 {
    22
}

fn default_vagrant_binary() -> String {
    "vagrant".to_string()
}

fn default_cache_timeout() -> u64 {
    3600
}

fn default_cache_prefix() -> String {
    "ansible_inventory_".to_string()
}

/// Check whether `path` names a file this source accepts
#[must_use]
pub fn verify_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| ACCEPTED_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

impl SourceConfig {
    /// Minimal configuration for a project directory
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            plugin: PLUGIN_NAME.to_string(),
            project_path: project_path.into(),
            ssh_port: default_ssh_port(),
            vagrant_binary: default_vagrant_binary(),
            cache: false,
            cache_plugin: CachePlugin::default(),
            cache_timeout: default_cache_timeout(),
            cache_connection: None,
            cache_prefix: default_cache_prefix(),
        }
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns [`InventoryError::Config`] if the file cannot be read, is not
    /// valid YAML, misses a required option or names another plugin.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InventoryError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    /// See [`SourceConfig::load`].
    pub fn from_yaml(content: &str) -> Result<Self, InventoryError> {
        let config: SourceConfig =
            serde_yaml::from_str(content).map_err(|e| InventoryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate option values
    ///
    /// # Errors
    /// Returns [`InventoryError::Config`] describing the first invalid option.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.plugin != PLUGIN_NAME {
            return Err(InventoryError::Config(format!(
                "plugin must be '{PLUGIN_NAME}', got '{}'",
                self.plugin
            )));
        }
        if self.project_path.as_os_str().is_empty() {
            return Err(InventoryError::Config(
                "project_path must not be empty".to_string(),
            ));
        }
        if self.ssh_port == 0 {
            return Err(InventoryError::Config("ssh_port must be positive".to_string()));
        }
        Ok(())
    }

    /// Resolve the project directory against the config file's location
    #[must_use]
    pub fn resolve_project_path(&self, config_path: &Path) -> PathBuf {
        if self.project_path.is_absolute() {
            return self.project_path.clone();
        }
        config_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.project_path)
    }

    /// Directory used by the `jsonfile` cache
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_connection.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("vagrantory")
        })
    }
}
