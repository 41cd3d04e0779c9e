//! v006: materialized singleton summaries and the health trend log.

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS materialized_status (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    health_score REAL NOT NULL DEFAULT 0.0,
    trend TEXT NOT NULL DEFAULT 'stable',
    last_scan_at INTEGER,
    file_count INTEGER NOT NULL DEFAULT 0,
    pattern_count INTEGER NOT NULL DEFAULT 0,
    approved_count INTEGER NOT NULL DEFAULT 0,
    critical_violations INTEGER NOT NULL DEFAULT 0,
    warnings INTEGER NOT NULL DEFAULT 0,
    security_risk_level TEXT NOT NULL DEFAULT 'low',
    refreshed_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE TABLE IF NOT EXISTS materialized_security (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    risk_level TEXT NOT NULL DEFAULT 'low',
    sensitive_field_count INTEGER NOT NULL DEFAULT 0,
    unprotected_access_points INTEGER NOT NULL DEFAULT 0,
    top_risk_tables TEXT NOT NULL DEFAULT '[]' CHECK (json_valid(top_risk_tables)),
    refreshed_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

-- Append-only; one row per gold refresh, trimmed by retention.
CREATE TABLE IF NOT EXISTS health_trends (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at INTEGER NOT NULL DEFAULT (unixepoch()),
    health_score REAL NOT NULL,
    risk_level TEXT NOT NULL,
    violation_count INTEGER NOT NULL DEFAULT 0
) STRICT;
"#;
