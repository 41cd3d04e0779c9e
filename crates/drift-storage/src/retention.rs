//! Retention: trim append-only tables by age and count, checkpoint the WAL,
//! and reclaim freelist pages when they exceed 20% of the database.

use drift_core::errors::StorageError;
use rusqlite::params;

use crate::connection::{sqlite_err, Store};

const APPEND_ONLY_TABLES: &[&str] = &["health_trends", "scan_history", "query_telemetry"];
const FREELIST_VACUUM_RATIO: f64 = 0.20;

#[derive(Debug, Clone, Default)]
pub struct RetentionReport {
    pub rows_trimmed: u64,
    pub vacuumed: bool,
}

/// Enforce retention after a gold refresh.
pub fn enforce(
    store: &Store,
    now_epoch: i64,
    max_age_days: u32,
    max_rows: u64,
) -> Result<RetentionReport, StorageError> {
    let cutoff = now_epoch - i64::from(max_age_days) * 86_400;
    let mut report = RetentionReport::default();

    store.with_write_tx(|tx| {
        for table in APPEND_ONLY_TABLES {
            let (time_col, id_col) = match *table {
                "scan_history" => ("started_at", "scan_id"),
                _ => ("recorded_at", "id"),
            };

            let by_age = tx
                .execute(
                    &format!("DELETE FROM {table} WHERE {time_col} < ?1"),
                    params![cutoff],
                )
                .map_err(sqlite_err)?;

            let by_count = tx
                .execute(
                    &format!(
                        "DELETE FROM {table} WHERE {id_col} NOT IN
                            (SELECT {id_col} FROM {table} ORDER BY {id_col} DESC LIMIT ?1)"
                    ),
                    params![max_rows as i64],
                )
                .map_err(sqlite_err)?;

            report.rows_trimmed += (by_age + by_count) as u64;
        }

        // Parse-cache entries for long-gone content only cost pages.
        report.rows_trimmed +=
            crate::queries::parse_cache::evict_older_than(tx, cutoff)? as u64;
        Ok(())
    })?;

    store.checkpoint_truncate()?;

    report.vacuumed = maybe_incremental_vacuum(store)?;
    Ok(report)
}

/// Run `incremental_vacuum` only when the freelist exceeds the ratio
/// threshold; reclaiming a near-empty freelist is wasted I/O.
fn maybe_incremental_vacuum(store: &Store) -> Result<bool, StorageError> {
    store.with_writer(|conn| {
        let freelist: i64 = conn
            .pragma_query_value(None, "freelist_count", |row| row.get(0))
            .map_err(sqlite_err)?;
        let pages: i64 = conn
            .pragma_query_value(None, "page_count", |row| row.get(0))
            .map_err(sqlite_err)?;

        if pages > 0 && (freelist as f64 / pages as f64) > FREELIST_VACUUM_RATIO {
            conn.execute_batch("PRAGMA incremental_vacuum;")
                .map_err(sqlite_err)?;
            tracing::debug!(freelist, pages, "incremental vacuum ran");
            return Ok(true);
        }
        Ok(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialized::append_trend;

    #[test]
    fn trims_by_count() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_writer(|conn| {
                for i in 0..50 {
                    append_trend(conn, f64::from(i), "low", 0)?;
                }
                Ok(())
            })
            .unwrap();

        let report = enforce(&store, 2_000_000_000, 90, 10).unwrap();
        assert!(report.rows_trimmed >= 40);

        let remaining: i64 = store
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM health_trends", [], |r| r.get(0))
                    .map_err(crate::connection::sqlite_err)
            })
            .unwrap();
        assert_eq!(remaining, 10);
    }
}
