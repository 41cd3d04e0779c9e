//! v005: taint flows and detector health bookkeeping.

pub const SQL: &str = r#"
-- Each flow is self-contained: steps is an ordered JSON array of
-- {file, function, line, role, snippet} from Source to Sink.
CREATE TABLE IF NOT EXISTS taint_flows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_id INTEGER NOT NULL,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    cwe_id INTEGER NOT NULL,
    severity TEXT NOT NULL,
    steps TEXT NOT NULL CHECK (json_valid(steps))
) STRICT;

CREATE INDEX IF NOT EXISTS idx_taint_flows_cwe ON taint_flows(cwe_id);
CREATE INDEX IF NOT EXISTS idx_taint_flows_file ON taint_flows(file);

-- Detector false-positive tracking; a detector above 20% FP for more than
-- 30 days is disabled by the feedback path.
CREATE TABLE IF NOT EXISTS detector_stats (
    detector_id TEXT PRIMARY KEY,
    match_count INTEGER NOT NULL DEFAULT 0,
    false_positive_count INTEGER NOT NULL DEFAULT 0,
    flagged_since INTEGER,
    disabled INTEGER NOT NULL DEFAULT 0
) STRICT;
"#;
