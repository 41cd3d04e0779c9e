//! The status summary singleton. Reads the security summary computed
//! earlier in the same transaction - never the stale persisted row.

use drift_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sqlite_err;
use crate::queries::{conventions, files, functions, patterns, violations};

use super::security::SecuritySummary;

#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub health_score: f64,
    pub trend: String,
    pub file_count: u64,
    pub pattern_count: u64,
    pub approved_count: u64,
    pub critical_violations: u64,
    pub warnings: u64,
    pub security_risk_level: String,
}

impl StatusSummary {
    pub fn total_violations(&self) -> u64 {
        self.critical_violations + self.warnings
    }
}

/// Recompute and persist the status summary from base tables plus the
/// fresh security summary.
pub fn refresh_status(
    conn: &Connection,
    security: &SecuritySummary,
) -> Result<StatusSummary, StorageError> {
    let file_count = files::count(conn)?;
    let function_count = functions::count(conn)?;
    let pattern_count = patterns::count(conn)?;
    let approved_count = conventions::approved_count(conn)?;
    let critical = violations::count_by_severity(conn, "error")?;
    let warnings = violations::count_by_severity(conn, "warning")?;

    let health_score = health_score(function_count, critical, warnings, &security.risk_level);
    let trend = trend_vs_previous(conn, health_score)?;

    conn.execute(
        "INSERT INTO materialized_status
            (id, health_score, trend, last_scan_at, file_count, pattern_count,
             approved_count, critical_violations, warnings, security_risk_level, refreshed_at)
         VALUES (1, ?1, ?2, unixepoch(), ?3, ?4, ?5, ?6, ?7, ?8, unixepoch())
         ON CONFLICT(id) DO UPDATE SET
            health_score = excluded.health_score,
            trend = excluded.trend,
            last_scan_at = excluded.last_scan_at,
            file_count = excluded.file_count,
            pattern_count = excluded.pattern_count,
            approved_count = excluded.approved_count,
            critical_violations = excluded.critical_violations,
            warnings = excluded.warnings,
            security_risk_level = excluded.security_risk_level,
            refreshed_at = unixepoch()",
        rusqlite::params![
            health_score,
            trend,
            file_count as i64,
            pattern_count as i64,
            approved_count as i64,
            critical as i64,
            warnings as i64,
            security.risk_level
        ],
    )
    .map_err(sqlite_err)?;

    Ok(StatusSummary {
        health_score,
        trend,
        file_count,
        pattern_count,
        approved_count,
        critical_violations: critical,
        warnings,
        security_risk_level: security.risk_level.clone(),
    })
}

/// Health in [0, 100]: violations discount per-function, security risk caps
/// the ceiling.
fn health_score(functions: u64, critical: u64, warnings: u64, risk_level: &str) -> f64 {
    let denom = functions.max(1) as f64;
    let violation_load = (critical as f64 * 3.0 + warnings as f64) / denom;
    let base = 100.0 * (1.0 - violation_load.min(1.0));
    let cap = match risk_level {
        "critical" => 40.0,
        "high" => 60.0,
        "medium" => 85.0,
        _ => 100.0,
    };
    base.min(cap).clamp(0.0, 100.0)
}

fn trend_vs_previous(conn: &Connection, current: f64) -> Result<String, StorageError> {
    use rusqlite::OptionalExtension;
    let previous: Option<f64> = conn
        .query_row(
            "SELECT health_score FROM health_trends ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(sqlite_err)?;

    Ok(match previous {
        Some(prev) if current > prev + 1.0 => "improving".to_string(),
        Some(prev) if current < prev - 1.0 => "declining".to_string(),
        _ => "stable".to_string(),
    })
}

/// Read the persisted summary.
pub fn load_status(conn: &Connection) -> Result<Option<StatusSummary>, StorageError> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT health_score, trend, file_count, pattern_count, approved_count,
                critical_violations, warnings, security_risk_level
         FROM materialized_status WHERE id = 1",
        [],
        |row| {
            Ok(StatusSummary {
                health_score: row.get(0)?,
                trend: row.get(1)?,
                file_count: row.get::<_, i64>(2)? as u64,
                pattern_count: row.get::<_, i64>(3)? as u64,
                approved_count: row.get::<_, i64>(4)? as u64,
                critical_violations: row.get::<_, i64>(5)? as u64,
                warnings: row.get::<_, i64>(6)? as u64,
                security_risk_level: row.get(7)?,
            })
        },
    )
    .optional()
    .map_err(sqlite_err)
}
