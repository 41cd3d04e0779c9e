//! Convention persistence: discovery, promotion, expiry.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

#[derive(Debug, Clone)]
pub struct ConventionRow {
    pub id: String,
    pub pattern_id: String,
    pub category: String,
    pub scope_kind: String,
    pub scope_value: Option<String>,
    pub dominance: f64,
    pub discovered_at: i64,
    pub last_seen: i64,
    pub status: String,
}

pub fn upsert(conn: &Connection, row: &ConventionRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO conventions
            (id, pattern_id, category, scope_kind, scope_value, dominance, discovered_at, last_seen, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            category = excluded.category,
            scope_kind = excluded.scope_kind,
            scope_value = excluded.scope_value,
            dominance = excluded.dominance,
            last_seen = excluded.last_seen,
            status = excluded.status",
        params![
            row.id,
            row.pattern_id,
            row.category,
            row.scope_kind,
            row.scope_value,
            row.dominance,
            row.discovered_at,
            row.last_seen,
            row.status
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn all(conn: &Connection) -> Result<Vec<ConventionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, pattern_id, category, scope_kind, scope_value, dominance,
                    discovered_at, last_seen, status
             FROM conventions ORDER BY id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ConventionRow {
                id: row.get(0)?,
                pattern_id: row.get(1)?,
                category: row.get(2)?,
                scope_kind: row.get(3)?,
                scope_value: row.get(4)?,
                dominance: row.get(5)?,
                discovered_at: row.get(6)?,
                last_seen: row.get(7)?,
                status: row.get(8)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn approved_count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM conventions WHERE status = 'approved'",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// Conventions absent for longer than `expiry_secs` move to Expired. They
/// are tagged, never deleted.
pub fn expire_stale(conn: &Connection, now: i64, expiry_secs: i64) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE conventions SET status = 'expired'
         WHERE status != 'expired' AND last_seen < ?1 - ?2",
        params![now, expiry_secs],
    )
    .map_err(sqlite_err)
}
