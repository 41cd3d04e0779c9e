//! Boundary and sensitive-field queries feeding the security summary.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

#[derive(Debug, Clone)]
pub struct BoundaryRow {
    pub file: String,
    pub line: u32,
    pub framework: String,
    pub table_name: String,
    pub operation: String,
    pub fields: Vec<String>,
    pub confidence: f64,
}

pub fn by_table(conn: &Connection, table: &str) -> Result<Vec<BoundaryRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT file, line, framework, table_name, operation, fields, confidence
             FROM boundaries WHERE table_name = ?1 ORDER BY file, line",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![table], map_row)
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn sensitive_field_count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM sensitive_fields", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// Access points on tables with sensitive fields where no auth-handling
/// function owns the access site.
pub fn unprotected_access_points(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM boundaries b
         WHERE b.table_name IN (SELECT DISTINCT table_name FROM sensitive_fields
                                WHERE table_name IS NOT NULL)
           AND NOT EXISTS (
             SELECT 1 FROM functions f
             WHERE f.file = b.file
               AND f.is_auth_handler = 1
               AND f.start_line <= b.line AND f.end_line >= b.line
           )",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// Tables ranked by sensitive-field exposure, most exposed first.
pub fn top_risk_tables(conn: &Connection, limit: usize) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT table_name FROM sensitive_fields
             WHERE table_name IS NOT NULL
             GROUP BY table_name
             ORDER BY COUNT(*) DESC, table_name
             LIMIT ?1",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![limit as i64], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Map each function to the sensitivity classes of fields its file/line
/// range touches, for reachability sensitivity inheritance.
pub fn function_sensitivities(
    conn: &Connection,
) -> Result<Vec<(i64, String)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT f.id, sf.sensitivity
             FROM functions f
             JOIN boundaries b ON b.file = f.file
                  AND b.line BETWEEN f.start_line AND f.end_line
             JOIN sensitive_fields sf ON sf.table_name = b.table_name",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BoundaryRow> {
    let fields_json: String = row.get(5)?;
    Ok(BoundaryRow {
        file: row.get(0)?,
        line: row.get(1)?,
        framework: row.get(2)?,
        table_name: row.get(3)?,
        operation: row.get(4)?,
        fields: serde_json::from_str(&fields_json).unwrap_or_default(),
        confidence: row.get(6)?,
    })
}
