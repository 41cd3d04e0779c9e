//! Commands accepted by the batch writer. One variant per base-table write;
//! derived-table rebuilds go through their own modules, not the channel.

/// A single ingest command. Function-referencing rows carry the function's
/// natural key (file + qualified name); the writer resolves row ids inside
/// its transaction so producers never see them.
#[derive(Debug, Clone)]
pub enum BatchCommand {
    UpsertFile {
        path: String,
        content_hash: u64,
        size: u64,
        language: Option<String>,
        mtime_secs: i64,
        mtime_nanos: u32,
        scan_error: Option<String>,
    },
    DeleteFile {
        path: String,
    },
    /// Remove derived rows owned by a file ahead of re-insertion.
    PurgeFileDerived {
        path: String,
    },
    InsertFunction {
        file: String,
        name: String,
        qualified_name: String,
        signature: Option<String>,
        body_hash: u64,
        start_line: u32,
        end_line: u32,
        is_entry_point: bool,
        is_injectable: bool,
        is_auth_handler: bool,
        is_test: bool,
        is_data_accessor: bool,
    },
    InsertCallEdge {
        caller_file: String,
        caller_qualified: String,
        callee_file: Option<String>,
        callee_qualified: Option<String>,
        resolution: String,
        confidence: f64,
        call_line: u32,
    },
    InsertDetection {
        scan_id: i64,
        file: String,
        line: u32,
        column: u32,
        pattern_id: String,
        detector_id: String,
        category: String,
        confidence: f64,
        snippet: Option<String>,
    },
    InsertBoundary {
        scan_id: i64,
        file: String,
        line: u32,
        framework: String,
        table_name: String,
        operation: String,
        fields_json: String,
        confidence: f64,
    },
    InsertSensitiveField {
        file: String,
        line: u32,
        field_name: String,
        table_name: Option<String>,
        sensitivity: String,
        confidence: f64,
    },
    InsertViolation {
        scan_id: i64,
        file: String,
        line: u32,
        column: u32,
        pattern_id: String,
        severity: String,
        message: String,
        fingerprint: String,
        is_new: bool,
        cwe_id: Option<u32>,
    },
    InsertTaintFlow {
        scan_id: i64,
        file: String,
        cwe_id: u32,
        severity: String,
        steps_json: String,
    },
    CacheParseResult {
        language: String,
        content_hash: u64,
        result_json: String,
    },
}
