//! v002: functions, call edges, detections, parse cache.

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS functions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL,
    signature TEXT,
    body_hash INTEGER NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    is_entry_point INTEGER NOT NULL DEFAULT 0,
    is_injectable INTEGER NOT NULL DEFAULT 0,
    is_auth_handler INTEGER NOT NULL DEFAULT 0,
    is_test INTEGER NOT NULL DEFAULT 0,
    is_data_accessor INTEGER NOT NULL DEFAULT 0,
    UNIQUE (file, qualified_name, body_hash)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_functions_file ON functions(file);
CREATE INDEX IF NOT EXISTS idx_functions_name ON functions(name);

-- callee_id is NULL for unresolved sites retained for diagnostics; the
-- resolution column records the strategy that produced the edge, or
-- 'stale' when the callee's file was re-parsed away.
CREATE TABLE IF NOT EXISTS call_edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    caller_id INTEGER NOT NULL REFERENCES functions(id) ON DELETE CASCADE,
    callee_id INTEGER REFERENCES functions(id) ON DELETE SET NULL,
    resolution TEXT NOT NULL,
    confidence REAL NOT NULL,
    call_line INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_call_edges_caller ON call_edges(caller_id);
CREATE INDEX IF NOT EXISTS idx_call_edges_callee ON call_edges(callee_id);

CREATE TABLE IF NOT EXISTS detections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_id INTEGER NOT NULL,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    line INTEGER NOT NULL,
    column_num INTEGER NOT NULL,
    pattern_id TEXT NOT NULL,
    detector_id TEXT NOT NULL,
    category TEXT NOT NULL,
    confidence REAL NOT NULL,
    snippet TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_detections_file ON detections(file);
CREATE INDEX IF NOT EXISTS idx_detections_pattern ON detections(pattern_id);

-- Durable layer of the content-addressed parse cache.
CREATE TABLE IF NOT EXISTS parse_cache (
    language TEXT NOT NULL,
    content_hash INTEGER NOT NULL,
    result TEXT NOT NULL CHECK (json_valid(result)),
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    PRIMARY KEY (language, content_hash)
) STRICT;
"#;
