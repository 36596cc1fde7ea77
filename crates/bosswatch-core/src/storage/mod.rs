mod config;
mod lock;
pub mod snapshot;

pub use config::{Config, TimerSection, TrackerSection};
pub use lock::StateLock;
pub use snapshot::{PersistedSnapshot, SnapshotStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/bosswatch[-dev]/` based on BOSSWATCH_ENV.
///
/// Set BOSSWATCH_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BOSSWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("bosswatch-dev")
    } else {
        base_dir.join("bosswatch")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
