//! v004: data-access boundaries and sensitive fields.

pub const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS boundaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_id INTEGER NOT NULL,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    line INTEGER NOT NULL,
    framework TEXT NOT NULL,
    table_name TEXT NOT NULL,
    operation TEXT NOT NULL DEFAULT 'unknown',
    fields TEXT NOT NULL CHECK (json_valid(fields)),
    confidence REAL NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_boundaries_file ON boundaries(file);
CREATE INDEX IF NOT EXISTS idx_boundaries_table ON boundaries(table_name);

CREATE TABLE IF NOT EXISTS sensitive_fields (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file TEXT NOT NULL REFERENCES file_metadata(path) ON DELETE CASCADE,
    line INTEGER NOT NULL,
    field_name TEXT NOT NULL,
    table_name TEXT,
    sensitivity TEXT NOT NULL,
    confidence REAL NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_sensitive_fields_table ON sensitive_fields(table_name);
CREATE INDEX IF NOT EXISTS idx_sensitive_fields_class ON sensitive_fields(sensitivity);
"#;
