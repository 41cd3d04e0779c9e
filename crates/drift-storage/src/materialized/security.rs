//! The security summary singleton.

use drift_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sqlite_err;
use crate::queries::{boundaries, taint};

#[derive(Debug, Clone)]
pub struct SecuritySummary {
    pub risk_level: String,
    pub sensitive_field_count: u64,
    pub unprotected_access_points: u64,
    pub top_risk_tables: Vec<String>,
}

/// Recompute and persist the security summary from base tables. Must run
/// before the status refresh within the same transaction.
pub fn refresh_security(conn: &Connection) -> Result<SecuritySummary, StorageError> {
    let sensitive_fields = boundaries::sensitive_field_count(conn)?;
    let unprotected = boundaries::unprotected_access_points(conn)?;
    let top_tables = boundaries::top_risk_tables(conn, 5)?;
    let high_flows = taint::high_severity_count(conn)?;

    let risk_level = classify_risk(sensitive_fields, unprotected, high_flows);
    let top_json = serde_json::to_string(&top_tables).unwrap_or_else(|_| "[]".to_string());

    conn.execute(
        "INSERT INTO materialized_security
            (id, risk_level, sensitive_field_count, unprotected_access_points, top_risk_tables, refreshed_at)
         VALUES (1, ?1, ?2, ?3, ?4, unixepoch())
         ON CONFLICT(id) DO UPDATE SET
            risk_level = excluded.risk_level,
            sensitive_field_count = excluded.sensitive_field_count,
            unprotected_access_points = excluded.unprotected_access_points,
            top_risk_tables = excluded.top_risk_tables,
            refreshed_at = unixepoch()",
        rusqlite::params![
            risk_level,
            sensitive_fields as i64,
            unprotected as i64,
            top_json
        ],
    )
    .map_err(sqlite_err)?;

    Ok(SecuritySummary {
        risk_level,
        sensitive_field_count: sensitive_fields,
        unprotected_access_points: unprotected,
        top_risk_tables: top_tables,
    })
}

fn classify_risk(sensitive_fields: u64, unprotected: u64, high_flows: u64) -> String {
    let level = if high_flows > 0 || unprotected >= 5 {
        "critical"
    } else if unprotected > 0 {
        "high"
    } else if sensitive_fields > 0 {
        "medium"
    } else {
        "low"
    };
    level.to_string()
}

/// Read the persisted summary (for consumers outside a refresh).
pub fn load_security(conn: &Connection) -> Result<Option<SecuritySummary>, StorageError> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT risk_level, sensitive_field_count, unprotected_access_points, top_risk_tables
         FROM materialized_security WHERE id = 1",
        [],
        |row| {
            let top_json: String = row.get(3)?;
            Ok(SecuritySummary {
                risk_level: row.get(0)?,
                sensitive_field_count: row.get::<_, i64>(1)? as u64,
                unprotected_access_points: row.get::<_, i64>(2)? as u64,
                top_risk_tables: serde_json::from_str(&top_json).unwrap_or_default(),
            })
        },
    )
    .optional()
    .map_err(sqlite_err)
}
