//! Cross-process advisory lock (`drift.lock`).
//!
//! Write-heavy scans take the lock; reads never do. The file records
//! `pid:timestamp` so operators can identify a stale holder, and
//! `force_unlock` removes it when the holding process is gone.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use drift_core::errors::StorageError;

const LOCK_FILE: &str = "drift.lock";

/// Held for the duration of a scan; released on drop.
#[derive(Debug)]
pub struct AdvisoryLock {
    path: PathBuf,
    released: bool,
}

impl AdvisoryLock {
    /// Acquire the lock at `project_root/drift.lock`. Fails with
    /// `StorageError::Locked` when another live process holds it.
    pub fn acquire(project_root: &Path, now_epoch: i64) -> Result<Self, StorageError> {
        let path = project_root.join(LOCK_FILE);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}:{}", std::process::id(), now_epoch)?;
                Ok(Self {
                    path,
                    released: false,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                let (pid, since) = read_holder(&path).unwrap_or((0, 0));
                Err(StorageError::Locked { pid, since })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a lock file regardless of holder. Operator recourse for a
    /// crashed scan.
    pub fn force_unlock(project_root: &Path) -> Result<(), StorageError> {
        let path = project_root.join(LOCK_FILE);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Holder info of an existing lock file, if any.
    pub fn holder(project_root: &Path) -> Option<(u32, i64)> {
        read_holder(&project_root.join(LOCK_FILE))
    }

    pub fn release(mut self) -> Result<(), StorageError> {
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn read_holder(path: &Path) -> Option<(u32, i64)> {
    let text = std::fs::read_to_string(path).ok()?;
    let mut parts = text.trim().splitn(2, ':');
    let pid = parts.next()?.parse().ok()?;
    let since = parts.next()?.parse().ok()?;
    Some((pid, since))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_with_holder() {
        let dir = tempfile::tempdir().unwrap();
        let lock = AdvisoryLock::acquire(dir.path(), 1_700_000_000).unwrap();

        let err = AdvisoryLock::acquire(dir.path(), 1_700_000_001).unwrap_err();
        match err {
            StorageError::Locked { pid, since } => {
                assert_eq!(pid, std::process::id());
                assert_eq!(since, 1_700_000_000);
            }
            other => panic!("unexpected error: {other}"),
        }

        lock.release().unwrap();
        AdvisoryLock::acquire(dir.path(), 1_700_000_002).unwrap();
    }

    #[test]
    fn drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _lock = AdvisoryLock::acquire(dir.path(), 1).unwrap();
        }
        assert!(AdvisoryLock::holder(dir.path()).is_none());
    }

    #[test]
    fn force_unlock_clears_stale_lock() {
        let dir = tempfile::tempdir().unwrap();
        let lock = AdvisoryLock::acquire(dir.path(), 1).unwrap();
        std::mem::forget(lock);
        AdvisoryLock::force_unlock(dir.path()).unwrap();
        AdvisoryLock::acquire(dir.path(), 2).unwrap();
    }
}
