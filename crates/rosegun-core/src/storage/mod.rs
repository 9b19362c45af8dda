mod config;
pub mod database;
pub mod keys;
pub mod save;

pub use config::{Config, NoticeConfig, TimerConfig, WakeLockConfig};
pub use database::{Database, SessionRecord, Stats};
pub use save::SaveFile;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ConfigError, StoreError};

/// A durable string key/value store.
///
/// The controller is the only writer; writes are last-writer-wins.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store for tests and embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `ROSEGUN_DATA_DIR` wins when set. Otherwise `~/.config/rosegun`, or
/// `~/.config/rosegun-dev` when `ROSEGUN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ROSEGUN_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ROSEGUN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("rosegun-dev")
            } else {
                base_dir.join("rosegun")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
