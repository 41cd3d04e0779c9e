//! Call edge queries, including the recursive-CTE traversal used when the
//! in-memory graph is too large or unavailable. Both engines must return
//! identical frontiers for identical inputs.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection};

use crate::connection::sqlite_err;

const DEFAULT_CTE_DEPTH: u32 = 5;

#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub caller_id: i64,
    pub callee_id: Option<i64>,
    pub resolution: String,
    pub confidence: f64,
    pub call_line: u32,
}

pub fn count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM call_edges", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

pub fn outgoing(conn: &Connection, caller_id: i64) -> Result<Vec<EdgeRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT caller_id, callee_id, resolution, confidence, call_line
             FROM call_edges WHERE caller_id = ?1",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![caller_id], |row| {
            Ok(EdgeRow {
                caller_id: row.get(0)?,
                callee_id: row.get(1)?,
                resolution: row.get(2)?,
                confidence: row.get(3)?,
                call_line: row.get(4)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// Forward reachability via recursive CTE: every function id reachable from
/// `start` within `max_depth` hops, with the depth at first discovery.
pub fn cte_reachable_forward(
    conn: &Connection,
    start: i64,
    max_depth: Option<u32>,
) -> Result<Vec<(i64, u32)>, StorageError> {
    cte_reachable(conn, start, max_depth, false)
}

/// Inverse reachability via recursive CTE: every caller that can reach
/// `start` within `max_depth` hops.
pub fn cte_reachable_inverse(
    conn: &Connection,
    start: i64,
    max_depth: Option<u32>,
) -> Result<Vec<(i64, u32)>, StorageError> {
    cte_reachable(conn, start, max_depth, true)
}

fn cte_reachable(
    conn: &Connection,
    start: i64,
    max_depth: Option<u32>,
    inverse: bool,
) -> Result<Vec<(i64, u32)>, StorageError> {
    let depth = max_depth.unwrap_or(DEFAULT_CTE_DEPTH);
    let (join_from, join_to) = if inverse {
        ("callee_id", "caller_id")
    } else {
        ("caller_id", "callee_id")
    };

    // Depth is interpolated (validated u32), ids are bound.
    let sql = format!(
        "WITH RECURSIVE frontier(id, depth) AS (
            SELECT ?1, 0
            UNION
            SELECT ce.{join_to}, f.depth + 1
            FROM call_edges ce
            JOIN frontier f ON ce.{join_from} = f.id
            WHERE f.depth < {depth} AND ce.{join_to} IS NOT NULL
         )
         SELECT id, MIN(depth) FROM frontier WHERE id != ?1 GROUP BY id"
    );

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![start], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?))
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
