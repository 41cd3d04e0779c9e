//! Pattern, location, and confidence persistence.

use drift_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::sqlite_err;
use crate::pagination::{Cursor, Page};

#[derive(Debug, Clone)]
pub struct PatternRow {
    pub pattern_id: String,
    pub category: String,
    pub occurrences: u32,
    pub file_spread: u32,
    pub outlier_count: u32,
    pub parent_id: Option<String>,
    pub last_seen: i64,
    pub status: String,
    pub tier: Option<String>,
    pub posterior_mean: Option<f64>,
}

/// Upsert one aggregated pattern row. Location rows are replaced wholesale
/// by the aggregation pass, so re-ingesting the same state is idempotent.
#[allow(clippy::too_many_arguments)]
pub fn upsert(
    conn: &Connection,
    pattern_id: &str,
    category: &str,
    occurrences: u32,
    file_spread: u32,
    outlier_count: u32,
    parent_id: Option<&str>,
    aliases_json: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO patterns
            (pattern_id, category, occurrences, file_spread, outlier_count, parent_id, aliases, last_seen)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, unixepoch())
         ON CONFLICT(pattern_id) DO UPDATE SET
            category = excluded.category,
            occurrences = excluded.occurrences,
            file_spread = excluded.file_spread,
            outlier_count = excluded.outlier_count,
            parent_id = excluded.parent_id,
            aliases = excluded.aliases,
            last_seen = unixepoch()",
        params![
            pattern_id,
            category,
            occurrences,
            file_spread,
            outlier_count,
            parent_id,
            aliases_json
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn replace_locations(
    conn: &Connection,
    pattern_id: &str,
    locations: &[(String, u32, u32, f64, bool)],
) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM pattern_locations WHERE pattern_id = ?1",
        params![pattern_id],
    )
    .map_err(sqlite_err)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO pattern_locations
                (pattern_id, file, line, column_num, confidence, is_outlier)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqlite_err)?;
    for (file, line, column, confidence, is_outlier) in locations {
        stmt.execute(params![pattern_id, file, line, column, confidence, is_outlier])
            .map_err(sqlite_err)?;
    }
    Ok(())
}

/// Persist a confidence score, keyed by `(pattern_id, scan_id)` so the same
/// scan never double-counts. Returns false when the scan was already
/// recorded and the update was skipped.
#[allow(clippy::too_many_arguments)]
pub fn record_confidence(
    conn: &Connection,
    pattern_id: &str,
    scan_id: i64,
    alpha: f64,
    beta: f64,
    posterior_mean: f64,
    ci: (f64, f64),
    tier: &str,
    momentum: &str,
    composite: f64,
) -> Result<bool, StorageError> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO confidence_updates (pattern_id, scan_id) VALUES (?1, ?2)",
            params![pattern_id, scan_id],
        )
        .map_err(sqlite_err)?;
    if inserted == 0 {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO confidence_scores
            (pattern_id, alpha, beta, posterior_mean, ci_low, ci_high, tier, momentum, composite)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(pattern_id) DO UPDATE SET
            alpha = excluded.alpha,
            beta = excluded.beta,
            posterior_mean = excluded.posterior_mean,
            ci_low = excluded.ci_low,
            ci_high = excluded.ci_high,
            tier = excluded.tier,
            momentum = excluded.momentum,
            composite = excluded.composite",
        params![
            pattern_id,
            alpha,
            beta,
            posterior_mean,
            ci.0,
            ci.1,
            tier,
            momentum,
            composite
        ],
    )
    .map_err(sqlite_err)?;
    Ok(true)
}

pub fn confidence_params(
    conn: &Connection,
    pattern_id: &str,
) -> Result<Option<(f64, f64)>, StorageError> {
    conn.query_row(
        "SELECT alpha, beta FROM confidence_scores WHERE pattern_id = ?1",
        params![pattern_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(sqlite_err)
}

pub fn count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM patterns", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// Keyset-paginated pattern listing, ordered by (posterior_mean desc, id).
pub fn list(
    conn: &Connection,
    cursor: Option<&Cursor>,
    limit: usize,
) -> Result<Page<PatternRow>, StorageError> {
    let limit = limit.clamp(1, 500);
    let fetch = (limit + 1) as i64;

    let mut sql = String::from(
        "SELECT p.pattern_id, p.category, p.occurrences, p.file_spread, p.outlier_count,
                p.parent_id, p.last_seen, p.status, c.tier,
                COALESCE(c.posterior_mean, 0.0) AS score
         FROM patterns p
         LEFT JOIN confidence_scores c ON c.pattern_id = p.pattern_id",
    );
    if cursor.is_some() {
        // Column aliases are not visible in WHERE; repeat the expression.
        sql.push_str(" WHERE (COALESCE(c.posterior_mean, 0.0), p.pattern_id) < (?1, ?2)");
    }
    sql.push_str(" ORDER BY score DESC, p.pattern_id DESC LIMIT ?3");

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<PatternRow> {
        Ok(PatternRow {
            pattern_id: row.get(0)?,
            category: row.get(1)?,
            occurrences: row.get(2)?,
            file_spread: row.get(3)?,
            outlier_count: row.get(4)?,
            parent_id: row.get(5)?,
            last_seen: row.get(6)?,
            status: row.get(7)?,
            tier: row.get(8)?,
            posterior_mean: row.get(9)?,
        })
    };

    let rows = match cursor {
        Some(c) => {
            let sort: f64 = c.sort_value.parse().unwrap_or(0.0);
            stmt.query_map(params![sort, c.id, fetch], map)
                .map_err(sqlite_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqlite_err)?
        }
        None => {
            // ?3 stays positional even without a cursor; bind placeholders 1-2
            // with values the predicate never sees.
            let sql_first = sql.replace(" LIMIT ?3", " LIMIT ?1");
            let mut stmt = conn.prepare(&sql_first).map_err(sqlite_err)?;
            let result = stmt
                .query_map(params![fetch], map)
                .map_err(sqlite_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqlite_err)?;
            result
        }
    };

    Ok(Page::from_overfetch(rows, limit, |row| {
        Cursor::new(
            format!("{}", row.posterior_mean.unwrap_or(0.0)),
            row.pattern_id.clone(),
        )
    }))
}

pub fn set_status(
    conn: &Connection,
    pattern_id: &str,
    status: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE patterns SET status = ?2 WHERE pattern_id = ?1",
        params![pattern_id, status],
    )
    .map_err(sqlite_err)?;
    Ok(())
}
