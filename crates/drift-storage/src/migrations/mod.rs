//! Linear, numbered migrations tracked by `PRAGMA user_version`.
//!
//! Each migration is pure SQL and irreversible. The store refuses to open a
//! database written by a newer code version.

mod v001_files;
mod v002_analysis;
mod v003_patterns;
mod v004_boundaries;
mod v005_graph;
mod v006_materialized;

use drift_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sqlite_err;

const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_files::SQL),
    (2, v002_analysis::SQL),
    (3, v003_patterns::SQL),
    (4, v004_boundaries::SQL),
    (5, v005_graph::SQL),
    (6, v006_materialized::SQL),
];

/// Latest schema version this build understands.
pub const SUPPORTED_VERSION: u32 = 6;

/// Apply all pending migrations.
pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    let current = schema_version(conn)?;

    if current > SUPPORTED_VERSION {
        return Err(StorageError::SchemaTooNew {
            found: current,
            supported: SUPPORTED_VERSION,
        });
    }

    for &(version, sql) in MIGRATIONS {
        if current < version {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version,
                    message: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version,
                    message: e.to_string(),
                })?;
            tracing::info!(version, "applied schema migration");
        }
    }
    Ok(())
}

/// Read the current `user_version`.
pub fn schema_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(sqlite_err)
}
