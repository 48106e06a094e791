//! Advisory lock on the configuration store
//!
//! Readers take a shared lock, writers an exclusive one. The lock is held
//! until the guard is dropped.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{AliasToolError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Guard holding a lock on the config lock file
#[derive(Debug)]
pub struct ConfigLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl ConfigLock {
    /// Block until the lock at `path` is acquired in `mode`
    pub fn acquire(path: &Path, mode: LockMode) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AliasToolError::Lock(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| AliasToolError::Lock(format!("Failed to open {}: {}", path.display(), e)))?;

        let locked = match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        };
        locked.map_err(|e| AliasToolError::Lock(format!("Failed to lock {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), ?mode, "Config lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode,
        })
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for ConfigLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!(path = %self.path.display(), "Config lock released");
    }
}
