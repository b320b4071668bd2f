//! # Data Directory Locking
//!
//! Prevents two engine processes from opening the same data directory.
//! The in-process per-SKU lock table is only a sound serialization point
//! while exactly one process owns the store; this file lock enforces that.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Errors from data-directory locking.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to create lock file: {0}")]
    CreateFailed(io::Error),

    #[error("data directory already in use (pid {pid:?}, lock {})", .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("failed to write pid to lock file: {0}")]
    WriteFailed(io::Error),
}

/// Exclusive lock on the engine's data directory.
///
/// Acquired on startup, released on drop (RAII).
pub struct DataDirLock {
    /// Kept open to hold the flock.
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the exclusive lock, creating the directory if needed.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        std::fs::create_dir_all(data_dir).map_err(LockError::CreateFailed)?;
        let lock_path = data_dir.join(Self::LOCK_FILE);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            let pid = std::fs::read_to_string(&lock_path)
                .ok()
                .and_then(|s| s.trim().parse().ok());
            return Err(LockError::AlreadyLocked {
                pid,
                path: lock_path,
            });
        }

        let mut locked = file;
        writeln!(locked, "{}", std::process::id()).map_err(LockError::WriteFailed)?;
        locked.sync_all().map_err(LockError::WriteFailed)?;

        Ok(Self {
            file: locked,
            path: lock_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
