//! `BEGIN IMMEDIATE` transaction helper.
//!
//! The write lock is taken at transaction start, so a concurrent reader
//! never upgrades us into SQLITE_BUSY mid-transaction.

use drift_core::errors::StorageError;
use rusqlite::Connection;

use super::sqlite_err;

pub fn immediate_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    conn.execute_batch("BEGIN IMMEDIATE").map_err(sqlite_err)?;

    // The transaction is already open; unchecked_transaction wraps it so a
    // closure error rolls back on drop.
    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
    let value = f(&tx)?;
    tx.commit().map_err(sqlite_err)?;
    Ok(value)
}
