//! Core error types for tomato-core.
//!
//! Every failure in the core has a defined recovery path: creation and
//! transition errors are rejected with the set left untouched, persistence
//! errors are logged and dropped by the gateway. Nothing here is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomato-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad creation parameters, unknown ids, or a transition the item's
    /// state does not allow.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Attempt to complete an item that is not the current one.
    #[error("Out of order: item {requested} requested, current item is {expected}")]
    OutOfOrder { expected: u32, requested: u32 },

    /// Serialization or storage failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another connection
    #[error("Store is locked")]
    Locked,

    /// Value under `key` could not be encoded or decoded
    #[error("Malformed value under '{key}': {message}")]
    Malformed { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl CoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    PersistenceError::Locked
                } else {
                    PersistenceError::QueryFailed(err.to_string())
                }
            }
            _ => PersistenceError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Persistence(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
