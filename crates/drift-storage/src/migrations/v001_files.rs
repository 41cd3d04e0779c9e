//! v001: file metadata and scan history.

pub const SQL: &str = r#"
-- File metadata drives the content-hash incremental layer. A row exists for
-- every scan-visible file; content_hash unchanged means zero re-derivation.
CREATE TABLE IF NOT EXISTS file_metadata (
    path TEXT PRIMARY KEY,
    content_hash INTEGER NOT NULL,
    size INTEGER NOT NULL,
    language TEXT,
    mtime_secs INTEGER NOT NULL DEFAULT 0,
    mtime_nanos INTEGER NOT NULL DEFAULT 0,
    scan_error TEXT,
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE INDEX IF NOT EXISTS idx_file_metadata_language ON file_metadata(language);

-- One row per scan; scan_id stamps every derived row for exactly-once
-- incremental updates.
CREATE TABLE IF NOT EXISTS scan_history (
    scan_id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    finished_at INTEGER,
    status TEXT NOT NULL DEFAULT 'running',
    files_added INTEGER NOT NULL DEFAULT 0,
    files_modified INTEGER NOT NULL DEFAULT 0,
    files_deleted INTEGER NOT NULL DEFAULT 0,
    files_unchanged INTEGER NOT NULL DEFAULT 0,
    pattern_count INTEGER NOT NULL DEFAULT 0
) STRICT;

-- Append-only query telemetry, trimmed by retention.
CREATE TABLE IF NOT EXISTS query_telemetry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at INTEGER NOT NULL DEFAULT (unixepoch()),
    query_kind TEXT NOT NULL,
    duration_us INTEGER NOT NULL
) STRICT;
"#;
