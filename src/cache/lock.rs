//! Advisory per-entry locking for the module cache
//!
//! CI agents routinely run concurrent jobs against a shared cache volume.
//! The lock is held across the whole check-then-install window so that two
//! tasks resolving the same (package, version) cannot both observe "absent"
//! and race an install into the same directory.

use crate::error::{AgentError, AgentResult};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive advisory lock on a single cache entry.
///
/// Released on drop. The lock file itself is left behind; it carries no
/// state beyond the OS-level lock.
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquire the lock for `package` inside `version_dir`, blocking until
    /// any concurrent holder releases it.
    pub fn acquire(version_dir: &Path, package: &str) -> AgentResult<Self> {
        let path = version_dir.join(format!(".{package}.lock"));
        let file = File::create(&path).map_err(|e| AgentError::CacheLock {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        file.lock_exclusive().map_err(|e| AgentError::CacheLock {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!("Acquired cache lock: {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            debug!("Failed to release cache lock {}: {}", self.path.display(), e);
        }
    }
}
