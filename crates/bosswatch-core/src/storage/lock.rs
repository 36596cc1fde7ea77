//! Single-writer lock on the state file.
//!
//! Two processes driving the same snapshot would overwrite each other's
//! countdowns. The process that owns the countdowns holds an exclusive
//! advisory lock on `<state file>.lock` for as long as it runs; everyone else
//! that wants to write is turned away with [`PersistenceError::Locked`].

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Held exclusive lock. Released when dropped or when the process exits.
#[derive(Debug)]
pub struct StateLock {
    _file: File,
    path: PathBuf,
}

impl StateLock {
    /// Take the lock for `state_path` without waiting.
    ///
    /// # Errors
    /// `Locked` if another handle (in this or any other process) holds it,
    /// `LockFailed` if the lock file cannot be opened.
    pub fn try_acquire(state_path: &Path) -> Result<Self, PersistenceError> {
        let path = lock_path(state_path);
        let lock_failed = |source: std::io::Error| PersistenceError::LockFailed {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(lock_failed)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(lock_failed)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(PersistenceError::Locked {
                    path: state_path.to_path_buf(),
                });
            }
            return Err(lock_failed(e));
        }

        tracing::debug!(path = %path.display(), "state file lock acquired");
        Ok(Self { _file: file, path })
    }

    /// Path of the lock file itself.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_path(state_path: &Path) -> PathBuf {
    let mut name = OsString::from(state_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
