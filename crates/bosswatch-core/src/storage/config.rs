//! TOML-based tracker configuration.
//!
//! Holds the fixed facts the engine is built from:
//! - The tracked entities (bosses) and how many channels each runs on
//! - The full respawn duration and the alert threshold
//! - The tick interval and where the timer snapshot lives
//!
//! Configuration is stored at `~/.config/bosswatch/config.toml` and is
//! read once at startup; a running tracker never sees later edits.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Which entities are tracked, and on how many channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSection {
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,
}

/// Countdown timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSection {
    /// Full respawn cycle used when no override is given.
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u32,
    /// Remaining time at which the one-shot alert fires.
    #[serde(default = "default_alert_threshold_secs")]
    pub alert_threshold_secs: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/bosswatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file override. Defaults to `timers.json` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub tracker: TrackerSection,
    #[serde(default)]
    pub timer: TimerSection,
}

// Default functions
fn default_entities() -> Vec<String> {
    vec!["Subora".into(), "Ultumuno".into(), "Nazrudin".into()]
}
fn default_channel_count() -> usize {
    8
}
fn default_duration_secs() -> u32 {
    3600
}
fn default_alert_threshold_secs() -> u32 {
    300
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            entities: default_entities(),
            channel_count: default_channel_count(),
        }
    }
}

impl Default for TimerSection {
    fn default() -> Self {
        Self {
            default_duration_secs: default_duration_secs(),
            alert_threshold_secs: default_alert_threshold_secs(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_file: None,
            tracker: TrackerSection::default(),
            timer: TimerSection::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                // Unset optional fields are absent from the JSON form.
                let existing = match obj.get(part) {
                    Some(v) => v.clone(),
                    None if part == "state_file" => serde_json::Value::Null,
                    None => return Err(unknown()),
                };

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    serde_json::Value::Array(_) => {
                        // Lists accept JSON (`["A","B"]`) or comma separated names.
                        match serde_json::from_str::<serde_json::Value>(value) {
                            Ok(v @ serde_json::Value::Array(_)) => v,
                            _ => serde_json::Value::Array(
                                value
                                    .split(',')
                                    .map(|s| serde_json::Value::String(s.trim().to_string()))
                                    .collect(),
                            ),
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or is
    /// invalid, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load and validate a config file at an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid. Nothing is written to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject configurations the engine cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.tracker.entities.is_empty() {
            return Err(invalid("tracker.entities", "at least one entity is required"));
        }
        let mut seen = HashSet::new();
        for name in &self.tracker.entities {
            if name.trim().is_empty() {
                return Err(invalid("tracker.entities", "entity names must not be blank"));
            }
            if !seen.insert(name.as_str()) {
                return Err(invalid(
                    "tracker.entities",
                    &format!("duplicate entity '{name}'"),
                ));
            }
        }
        if self.tracker.channel_count == 0 {
            return Err(invalid("tracker.channel_count", "must be at least 1"));
        }
        if self.timer.default_duration_secs == 0 {
            return Err(invalid("timer.default_duration_secs", "must be at least 1"));
        }
        if self.timer.tick_interval_ms == 0 {
            return Err(invalid("timer.tick_interval_ms", "must be at least 1"));
        }
        Ok(())
    }

    /// Where the timer snapshot is stored.
    pub fn state_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("timers.json")),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms)
    }
}
