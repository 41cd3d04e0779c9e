//! v003: aggregated patterns, locations, confidence, conventions, violations.

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS patterns (
    pattern_id TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    occurrences INTEGER NOT NULL DEFAULT 0,
    file_spread INTEGER NOT NULL DEFAULT 0,
    outlier_count INTEGER NOT NULL DEFAULT 0,
    parent_id TEXT,
    aliases TEXT CHECK (aliases IS NULL OR json_valid(aliases)),
    first_seen INTEGER NOT NULL DEFAULT (unixepoch()),
    last_seen INTEGER NOT NULL DEFAULT (unixepoch()),
    status TEXT NOT NULL DEFAULT 'discovered'
) STRICT;

CREATE INDEX IF NOT EXISTS idx_patterns_category ON patterns(category);
CREATE INDEX IF NOT EXISTS idx_patterns_status ON patterns(status);

CREATE TABLE IF NOT EXISTS pattern_locations (
    pattern_id TEXT NOT NULL REFERENCES patterns(pattern_id) ON DELETE CASCADE,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    line INTEGER NOT NULL,
    column_num INTEGER NOT NULL,
    confidence REAL NOT NULL,
    is_outlier INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (pattern_id, file, line, column_num)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_pattern_locations_file ON pattern_locations(file);

CREATE TABLE IF NOT EXISTS confidence_scores (
    pattern_id TEXT PRIMARY KEY REFERENCES patterns(pattern_id) ON DELETE CASCADE,
    alpha REAL NOT NULL CHECK (alpha >= 1.0),
    beta REAL NOT NULL CHECK (beta >= 1.0),
    posterior_mean REAL NOT NULL,
    ci_low REAL NOT NULL,
    ci_high REAL NOT NULL,
    tier TEXT NOT NULL,
    momentum TEXT NOT NULL DEFAULT 'stable',
    composite REAL NOT NULL DEFAULT 0.0
) STRICT;

-- One row per (pattern, scan): a confidence update for an already-recorded
-- scan is skipped, not double-counted.
CREATE TABLE IF NOT EXISTS confidence_updates (
    pattern_id TEXT NOT NULL,
    scan_id INTEGER NOT NULL,
    PRIMARY KEY (pattern_id, scan_id)
) STRICT;

CREATE TABLE IF NOT EXISTS conventions (
    id TEXT PRIMARY KEY,
    pattern_id TEXT NOT NULL REFERENCES patterns(pattern_id) ON DELETE CASCADE,
    category TEXT NOT NULL,
    scope_kind TEXT NOT NULL DEFAULT 'project',
    scope_value TEXT,
    dominance REAL NOT NULL,
    discovered_at INTEGER NOT NULL DEFAULT (unixepoch()),
    last_seen INTEGER NOT NULL DEFAULT (unixepoch()),
    status TEXT NOT NULL DEFAULT 'discovered'
) STRICT;

CREATE INDEX IF NOT EXISTS idx_conventions_pattern ON conventions(pattern_id);
CREATE INDEX IF NOT EXISTS idx_conventions_status ON conventions(status);

CREATE TABLE IF NOT EXISTS violations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_id INTEGER NOT NULL,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    line INTEGER NOT NULL,
    column_num INTEGER NOT NULL DEFAULT 0,
    pattern_id TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    is_new INTEGER NOT NULL DEFAULT 1,
    cwe_id INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_violations_file ON violations(file);
CREATE INDEX IF NOT EXISTS idx_violations_fingerprint ON violations(fingerprint);
CREATE INDEX IF NOT EXISTS idx_violations_severity ON violations(severity);
"#;
