//! File metadata queries - the substrate of the incremental layer.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};
use rustc_hash::FxHashMap;

use crate::connection::sqlite_err;

/// Cached metadata for one file, as persisted by the previous scan.
#[derive(Debug, Clone)]
pub struct FileRow {
    pub path: String,
    pub content_hash: u64,
    pub size: u64,
    pub language: Option<String>,
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub scan_error: Option<String>,
}

/// Load every file row keyed by path, for scan diffing.
pub fn load_all(conn: &Connection) -> Result<FxHashMap<String, FileRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT path, content_hash, size, language, mtime_secs, mtime_nanos, scan_error
             FROM file_metadata",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(FileRow {
                path: row.get(0)?,
                content_hash: row.get::<_, i64>(1)? as u64,
                size: row.get::<_, i64>(2)? as u64,
                language: row.get(3)?,
                mtime_secs: row.get(4)?,
                mtime_nanos: row.get(5)?,
                scan_error: row.get(6)?,
            })
        })
        .map_err(sqlite_err)?;

    let mut map = FxHashMap::default();
    for row in rows {
        let row = row.map_err(sqlite_err)?;
        map.insert(row.path.clone(), row);
    }
    Ok(map)
}

pub fn count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM file_metadata", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// Record a per-file scan error without touching the rest of the row.
pub fn set_scan_error(
    conn: &Connection,
    path: &str,
    error: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE file_metadata SET scan_error = ?2 WHERE path = ?1",
        params![path, error],
    )
    .map_err(sqlite_err)?;
    Ok(())
}
