//! Durable snapshot of every slot's remaining time.
//!
//! The file is a JSON object mapping entity name to an array of remaining
//! seconds indexed by channel:
//!
//! ```json
//! { "Nazrudin": [120, 0, 0, 0, 0, 0, 0, 0], "Subora": [0, 0, 0, 3599, 0, 0, 0, 0] }
//! ```
//!
//! Each save writes a temporary file next to the target and renames it into
//! place, so a crash mid-write leaves the previous snapshot readable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Remaining seconds per entity, indexed by channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedSnapshot {
    pub remaining: BTreeMap<String, Vec<u32>>,
}

impl PersistedSnapshot {
    pub fn new(remaining: BTreeMap<String, Vec<u32>>) -> Self {
        Self { remaining }
    }

    pub fn get(&self, entity: &str, channel: usize) -> Option<u32> {
        self.remaining.get(entity)?.get(channel).copied()
    }
}

/// File-backed snapshot store.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored snapshot.
    ///
    /// # Errors
    /// `WriteFailed` if the directory, temporary file or rename fails. The
    /// previously committed snapshot is left untouched in that case.
    pub fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), PersistenceError> {
        let write_failed = |source: std::io::Error| PersistenceError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_vec_pretty(snapshot)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_failed)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_failed)?;
        tmp.write_all(&content).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(&self.path).map_err(|e| write_failed(e.error))?;

        tracing::trace!(path = %self.path.display(), "timer snapshot saved");
        Ok(())
    }

    /// Read the last committed snapshot.
    ///
    /// Returns `Ok(None)` when no snapshot has ever been written.
    ///
    /// # Errors
    /// `Corrupt` if the file is not a valid snapshot, `ReadFailed` for any
    /// other IO failure.
    pub fn load(&self) -> Result<Option<PersistedSnapshot>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot = serde_json::from_str(&content).map_err(|source| {
            PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(Some(snapshot))
    }
}
