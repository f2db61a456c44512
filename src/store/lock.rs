use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;
use tracing::debug;

use crate::error::{JuneError, Result};

/// Exclusive advisory lock on the store directory, held for one write.
/// Dropping the guard releases it.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Take the lock without waiting. A lock held elsewhere is `Locked`.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| JuneError::Locked(path.display().to_string()))?;
        debug!(path = %path.display(), "store lock taken");
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn held_lock_blocks_until_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lock");

        let guard = StoreLock::acquire(&path).unwrap();
        assert!(matches!(
            StoreLock::acquire(&path),
            Err(JuneError::Locked(_))
        ));

        drop(guard);
        StoreLock::acquire(&path).unwrap();
    }
}
