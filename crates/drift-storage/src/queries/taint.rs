//! Taint flow queries.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

#[derive(Debug, Clone)]
pub struct TaintFlowRow {
    pub id: i64,
    pub cwe_id: u32,
    pub severity: String,
    pub steps_json: String,
}

pub fn count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM taint_flows", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

pub fn by_cwe(conn: &Connection, cwe_id: u32) -> Result<Vec<TaintFlowRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, cwe_id, severity, steps FROM taint_flows
             WHERE cwe_id = ?1 ORDER BY id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![cwe_id], |row| {
            Ok(TaintFlowRow {
                id: row.get(0)?,
                cwe_id: row.get(1)?,
                severity: row.get(2)?,
                steps_json: row.get(3)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn high_severity_count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM taint_flows WHERE severity IN ('high', 'critical')",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(sqlite_err)
}
