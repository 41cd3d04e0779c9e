//! Scan history: one row per scan, the anchor for scan_id stamping and
//! momentum history.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

#[derive(Debug, Clone)]
pub struct ScanRow {
    pub scan_id: i64,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub status: String,
    pub pattern_count: u64,
}

/// Open a new scan row; returns the scan_id that stamps derived rows.
pub fn begin_scan(conn: &Connection, started_at: i64) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO scan_history (started_at, status) VALUES (?1, 'running')",
        params![started_at],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

#[allow(clippy::too_many_arguments)]
pub fn finish_scan(
    conn: &Connection,
    scan_id: i64,
    finished_at: i64,
    status: &str,
    added: u64,
    modified: u64,
    deleted: u64,
    unchanged: u64,
    pattern_count: u64,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE scan_history SET
            finished_at = ?2, status = ?3,
            files_added = ?4, files_modified = ?5, files_deleted = ?6, files_unchanged = ?7,
            pattern_count = ?8
         WHERE scan_id = ?1",
        params![
            scan_id,
            finished_at,
            status,
            added as i64,
            modified as i64,
            deleted as i64,
            unchanged as i64,
            pattern_count as i64
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// The most recent scans, oldest first - the shape momentum trackers want.
pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<ScanRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT scan_id, started_at, finished_at, status, pattern_count
             FROM scan_history ORDER BY scan_id DESC LIMIT ?1",
        )
        .map_err(sqlite_err)?;
    let mut rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(ScanRow {
                scan_id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                status: row.get(3)?,
                pattern_count: row.get::<_, i64>(4)? as u64,
            })
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;
    rows.reverse();
    Ok(rows)
}
