//! Configuration for rosterdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a rosterdb engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the record file. Compaction writes a sibling file next to it:
    ///   {data_path}          (live slots)
    ///   {data_path}.compact  (only while purge / insert-with-id runs)
    pub data_path: PathBuf,

    /// Create the record file when it does not exist yet
    pub create_if_missing: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How a mutation makes its slot write durable before returning
    pub sync_strategy: SyncStrategy,
}

/// Slot write durability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every mutation (safest, slowest)
    EveryWrite,

    /// flush to the OS and let the page cache write back
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./roster.db"),
            create_if_missing: true,
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the scratch file used while the store is rebuilt
    pub fn compact_path(&self) -> PathBuf {
        let mut name = self.data_path.clone().into_os_string();
        name.push(".compact");
        PathBuf::from(name)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the record file path
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_path = path.into();
        self
    }

    /// Allow or forbid creating a missing record file
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
