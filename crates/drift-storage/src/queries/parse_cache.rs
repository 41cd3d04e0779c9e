//! Durable layer of the content-addressed parse cache.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::sqlite_err;

/// Fetch a cached parse result as JSON, if present.
pub fn get(
    conn: &Connection,
    language: &str,
    content_hash: u64,
) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT result FROM parse_cache WHERE language = ?1 AND content_hash = ?2",
        params![language, content_hash as i64],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqlite_err)
}

pub fn put(
    conn: &Connection,
    language: &str,
    content_hash: u64,
    result_json: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO parse_cache (language, content_hash, result, created_at)
         VALUES (?1, ?2, ?3, unixepoch())",
        params![language, content_hash as i64, result_json],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn evict_older_than(conn: &Connection, cutoff_epoch: i64) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM parse_cache WHERE created_at < ?1",
        params![cutoff_epoch],
    )
    .map_err(sqlite_err)
}
