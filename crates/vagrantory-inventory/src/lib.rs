//! vagrantory-inventory: Vagrant dynamic inventory
//!
//! Discovers the guests of a Vagrant project, resolves their forwarded SSH
//! ports and maps the result onto an inventory sink, optionally through a
//! cache store.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod machine_readable;
pub mod sink;
pub mod types;
pub mod vagrant;

pub use builder::{CacheMode, InventoryBuilder, populate};
pub use cache::{CacheStore, JsonFileCache, MemoryCache, cache_key, open_cache};
pub use config::{CachePlugin, SourceConfig, verify_file};
pub use error::InventoryError;
pub use sink::{Inventory, InventorySink};
pub use types::{GuestRecord, GuestStatus, Snapshot};
pub use vagrant::VagrantClient;

/// Name this inventory source answers to in the `plugin` option
pub const PLUGIN_NAME: &str = "vagrant";
