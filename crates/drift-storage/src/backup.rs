//! Database backups and corruption recovery.
//!
//! Backups are rotated copies next to the database (`drift.db.bak.1` is
//! newest). `Store::open` stays simple; hosts that want recovery call
//! `open_with_recovery`, which restores the newest backup when the file
//! fails its integrity check.

use std::path::{Path, PathBuf};

use drift_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::Store;

fn backup_path(db: &Path, slot: u32) -> PathBuf {
    let mut name = db.as_os_str().to_os_string();
    name.push(format!(".bak.{slot}"));
    PathBuf::from(name)
}

/// Copy the database into slot 1, shifting older backups down and
/// dropping anything past `keep`.
pub fn create_backup(db: &Path, keep: u32) -> Result<(), StorageError> {
    if keep == 0 || !db.exists() {
        return Ok(());
    }

    // Shift: .bak.(keep-1) → .bak.keep, ..., .bak.1 → .bak.2.
    for slot in (1..keep).rev() {
        let from = backup_path(db, slot);
        if from.exists() {
            std::fs::rename(&from, backup_path(db, slot + 1))?;
        }
    }
    std::fs::copy(db, backup_path(db, 1))?;
    Ok(())
}

/// The newest existing backup, if any.
pub fn latest_backup(db: &Path, keep: u32) -> Option<PathBuf> {
    (1..=keep.max(1))
        .map(|slot| backup_path(db, slot))
        .find(|path| path.exists())
}

/// Replace the database file with the newest backup.
pub fn restore_latest(db: &Path, keep: u32) -> Result<(), StorageError> {
    let backup = latest_backup(db, keep).ok_or_else(|| StorageError::Corrupt {
        message: "database corrupt and no backup available".to_string(),
    })?;

    // Stale WAL/SHM from the corrupt file must not shadow the restore.
    for suffix in ["-wal", "-shm"] {
        let mut side = db.as_os_str().to_os_string();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            std::fs::remove_file(&side)?;
        }
    }
    std::fs::copy(&backup, db)?;
    tracing::warn!(backup = %backup.display(), "database restored from backup");
    Ok(())
}

/// Quick integrity probe on a closed database file.
pub fn is_intact(db: &Path) -> bool {
    let Ok(conn) = Connection::open(db) else {
        return false;
    };
    conn.query_row("PRAGMA integrity_check", [], |row| row.get::<_, String>(0))
        .map(|verdict| verdict == "ok")
        .unwrap_or(false)
}

/// Open the store, restoring from the newest backup when the database is
/// corrupt and `restore_on_corruption` allows it.
pub fn open_with_recovery(
    db: &Path,
    read_pool_size: usize,
    restore_on_corruption: bool,
    backup_keep: u32,
) -> Result<Store, StorageError> {
    if db.exists() && !is_intact(db) {
        if !restore_on_corruption {
            return Err(StorageError::Corrupt {
                message: format!("{} failed integrity check", db.display()),
            });
        }
        restore_latest(db, backup_keep)?;
    }
    Store::open(db, read_pool_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_rotation_keeps_bounded_history() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("drift.db");
        std::fs::write(&db, b"state-1").unwrap();
        create_backup(&db, 2).unwrap();
        std::fs::write(&db, b"state-2").unwrap();
        create_backup(&db, 2).unwrap();
        std::fs::write(&db, b"state-3").unwrap();
        create_backup(&db, 2).unwrap();

        // Slot 1 is the newest backup; slot 3 never exists.
        assert_eq!(std::fs::read(backup_path(&db, 1)).unwrap(), b"state-3");
        assert_eq!(std::fs::read(backup_path(&db, 2)).unwrap(), b"state-2");
        assert!(!backup_path(&db, 3).exists());
    }

    #[test]
    fn corrupt_file_restores_from_backup() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("drift.db");

        // A healthy database, backed up.
        {
            let store = Store::open(&db, 1).unwrap();
            store
                .with_writer(|conn| {
                    conn.execute(
                        "INSERT INTO health_trends (health_score, risk_level) VALUES (90.0, 'low')",
                        [],
                    )
                    .map(|_| ())
                    .map_err(|e| StorageError::Sqlite {
                        message: e.to_string(),
                    })
                })
                .unwrap();
            store.checkpoint_truncate().unwrap();
        }
        create_backup(&db, 2).unwrap();

        // Corrupt the live file.
        std::fs::write(&db, b"definitely not a sqlite database").unwrap();
        assert!(!is_intact(&db));

        let store = open_with_recovery(&db, 1, true, 2).unwrap();
        let trend_count: i64 = store
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM health_trends", [], |r| r.get(0))
                    .map_err(|e| StorageError::Sqlite {
                        message: e.to_string(),
                    })
            })
            .unwrap();
        assert_eq!(trend_count, 1);
    }

    #[test]
    fn recovery_disabled_surfaces_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("drift.db");
        std::fs::write(&db, b"garbage").unwrap();
        let err = open_with_recovery(&db, 1, false, 2).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
