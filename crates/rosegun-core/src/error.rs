//! Core error types for rosegun-core.
//!
//! The timer, ledger and navigation controller never fail: they degrade to a
//! safe default and log. These errors exist for the boundaries where a caller
//! can do something about a failure (opening the store, loading config,
//! building a catalog).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for fallible core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The key/value store or session history failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Loading or saving `config.toml` failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Content or input rejected before use
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The SQLite file could not be opened
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Another process holds the database
    #[error("Store is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// The value does not parse as the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required collection has no entries
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Stay-awake hint errors. Always non-fatal; callers log and carry on.
#[derive(Error, Debug)]
pub enum WakeLockError {
    /// The host offers no way to suppress display sleep
    #[error("Stay-awake hint unavailable: {0}")]
    Unavailable(String),

    /// The hint was held but could not be released cleanly
    #[error("Failed to release stay-awake hint: {0}")]
    ReleaseFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_wraps_into_core_error() {
        let err: CoreError = StoreError::Locked.into();
        assert_eq!(err.to_string(), "Store error: Store is locked");
    }

    #[test]
    fn sqlite_failure_maps_to_query_failed() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::QueryFailed(_)));
    }
}
