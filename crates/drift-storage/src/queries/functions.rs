//! Function table queries.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

#[derive(Debug, Clone)]
pub struct FunctionRow {
    pub id: i64,
    pub file: String,
    pub name: String,
    pub qualified_name: String,
    pub body_hash: u64,
    pub start_line: u32,
    pub end_line: u32,
    pub is_entry_point: bool,
    pub is_test: bool,
}

pub fn count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM functions", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

pub fn by_file(conn: &Connection, file: &str) -> Result<Vec<FunctionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, file, name, qualified_name, body_hash, start_line, end_line,
                    is_entry_point, is_test
             FROM functions WHERE file = ?1 ORDER BY start_line",
        )
        .map_err(sqlite_err)?;
    let result = collect(stmt.query_map(params![file], map_row).map_err(sqlite_err)?);
    result
}

pub fn lookup_id(
    conn: &Connection,
    file: &str,
    qualified_name: &str,
) -> Result<Option<i64>, StorageError> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT id FROM functions WHERE file = ?1 AND qualified_name = ?2 LIMIT 1",
        params![file, qualified_name],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqlite_err)
}

/// Mark inbound edges to a removed file's functions as stale instead of
/// deleting the caller's record of the call.
pub fn mark_inbound_edges_stale(conn: &Connection, file: &str) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE call_edges SET callee_id = NULL, resolution = 'stale'
         WHERE callee_id IN (SELECT id FROM functions WHERE file = ?1)",
        params![file],
    )
    .map_err(sqlite_err)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FunctionRow> {
    Ok(FunctionRow {
        id: row.get(0)?,
        file: row.get(1)?,
        name: row.get(2)?,
        qualified_name: row.get(3)?,
        body_hash: row.get::<_, i64>(4)? as u64,
        start_line: row.get(5)?,
        end_line: row.get(6)?,
        is_entry_point: row.get(7)?,
        is_test: row.get(8)?,
    })
}

fn collect<I: Iterator<Item = rusqlite::Result<FunctionRow>>>(
    rows: I,
) -> Result<Vec<FunctionRow>, StorageError> {
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
