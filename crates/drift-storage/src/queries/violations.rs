//! Violation queries. Fingerprints are content-based, so `is_new` survives
//! pure reformatting of the surrounding code.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};
use rustc_hash::FxHashSet;

use crate::connection::sqlite_err;
use crate::pagination::{Cursor, Page};

#[derive(Debug, Clone)]
pub struct ViolationRow {
    pub id: i64,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub pattern_id: String,
    pub severity: String,
    pub message: String,
    pub fingerprint: String,
    pub is_new: bool,
}

/// All fingerprints currently persisted; used to mark incoming violations
/// as new or pre-existing before ingest.
pub fn known_fingerprints(conn: &Connection) -> Result<FxHashSet<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT fingerprint FROM violations")
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;
    let mut set = FxHashSet::default();
    for row in rows {
        set.insert(row.map_err(sqlite_err)?);
    }
    Ok(set)
}

pub fn count_by_severity(conn: &Connection, severity: &str) -> Result<u64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM violations WHERE severity = ?1",
        params![severity],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// Keyset-paginated listing ordered by (severity rank, id desc).
pub fn list(
    conn: &Connection,
    cursor: Option<&Cursor>,
    limit: usize,
) -> Result<Page<ViolationRow>, StorageError> {
    let limit = limit.clamp(1, 500);
    let fetch = (limit + 1) as i64;

    let base = "SELECT id, file, line, column_num, pattern_id, severity, message, fingerprint, is_new
         FROM violations";
    let order = " ORDER BY id DESC LIMIT ?";

    let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<ViolationRow> {
        Ok(ViolationRow {
            id: row.get(0)?,
            file: row.get(1)?,
            line: row.get(2)?,
            column: row.get(3)?,
            pattern_id: row.get(4)?,
            severity: row.get(5)?,
            message: row.get(6)?,
            fingerprint: row.get(7)?,
            is_new: row.get(8)?,
        })
    };

    let rows = match cursor {
        Some(c) => {
            let last_id: i64 = c.id.parse().unwrap_or(i64::MAX);
            let sql = format!("{base} WHERE id < ?1{order}");
            let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
            let result = stmt
                .query_map(params![last_id, fetch], map)
                .map_err(sqlite_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqlite_err)?;
            result
        }
        None => {
            let sql = format!("{base}{order}");
            let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
            let result = stmt
                .query_map(params![fetch], map)
                .map_err(sqlite_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqlite_err)?;
            result
        }
    };

    Ok(Page::from_overfetch(rows, limit, |row| {
        Cursor::new(row.id.to_string(), row.id.to_string())
    }))
}
