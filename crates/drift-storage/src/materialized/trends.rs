//! Health trend log - one append per gold refresh.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

#[derive(Debug, Clone)]
pub struct TrendRow {
    pub recorded_at: i64,
    pub health_score: f64,
    pub risk_level: String,
    pub violation_count: u64,
}

pub fn append_trend(
    conn: &Connection,
    health_score: f64,
    risk_level: &str,
    violation_count: u64,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO health_trends (health_score, risk_level, violation_count)
         VALUES (?1, ?2, ?3)",
        params![health_score, risk_level, violation_count as i64],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn recent_trends(conn: &Connection, limit: usize) -> Result<Vec<TrendRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT recorded_at, health_score, risk_level, violation_count
             FROM health_trends ORDER BY id DESC LIMIT ?1",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(TrendRow {
                recorded_at: row.get(0)?,
                health_score: row.get(1)?,
                risk_level: row.get(2)?,
                violation_count: row.get::<_, i64>(3)? as u64,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
