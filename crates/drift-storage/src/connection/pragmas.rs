//! Connection pragmas.
//!
//! Writer: WAL, synchronous=NORMAL, 64 MiB page cache, 256 MiB mmap,
//! foreign keys on, 5 s busy timeout, incremental auto-vacuum.
//! Readers: the same cache/mmap settings plus `query_only=ON`.

use drift_core::errors::StorageError;
use rusqlite::Connection;

use super::sqlite_err;

pub fn apply_write_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA cache_size = -65536;
         PRAGMA mmap_size = 268435456;
         PRAGMA busy_timeout = 5000;
         PRAGMA temp_store = MEMORY;",
    )
    .map_err(sqlite_err)?;

    // auto_vacuum only takes effect before the first table exists; on an
    // established database the pragma reads back its stored value.
    let auto_vacuum: i64 = conn
        .pragma_query_value(None, "auto_vacuum", |row| row.get(0))
        .unwrap_or(0);
    if auto_vacuum != 2 {
        conn.execute_batch("PRAGMA auto_vacuum = INCREMENTAL; VACUUM;")
            .map_err(sqlite_err)?;
    }
    Ok(())
}

pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA query_only = ON;
         PRAGMA cache_size = -65536;
         PRAGMA mmap_size = 268435456;
         PRAGMA busy_timeout = 5000;
         PRAGMA temp_store = MEMORY;",
    )
    .map_err(sqlite_err)
}
