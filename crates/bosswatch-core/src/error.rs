//! Core error types for bosswatch-core.
//!
//! Caller mistakes (unknown entity, channel out of range) are surfaced
//! immediately. Persistence failures are recoverable: the tracker logs them,
//! notifies subscribers and keeps running on in-memory state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bosswatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Entity name is not part of the configured set
    #[error("Unknown entity: '{0}'")]
    UnknownEntity(String),

    /// Channel index outside `[0, channel_count)`
    #[error("Channel {channel} out of range (channel count: {channel_count})")]
    ChannelOutOfRange { channel: usize, channel_count: usize },

    /// Snapshot store errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot store errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The state file exists but does not hold a valid snapshot
    #[error("State file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The state file exists but could not be read
    #[error("Failed to read state file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or committing the new snapshot failed; the previous record is intact
    #[error("Failed to write state file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the single-writer lock on the state file
    #[error("State file {path} is locked by another running bosswatch process")]
    Locked { path: PathBuf },

    /// The lock file could not be opened or locked
    #[error("Failed to lock state file {path}: {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No usable data directory
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
