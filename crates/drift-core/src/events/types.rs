//! Event payloads.

use std::path::PathBuf;

/// A scan started on the given root.
#[derive(Debug, Clone)]
pub struct ScanStarted {
    pub root: PathBuf,
}

/// Progress tick emitted between files.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
}

/// A scan finished (completed or cancelled) with diff counts.
#[derive(Debug, Clone)]
pub struct ScanComplete {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// A new pattern crossed the discovery gates.
#[derive(Debug, Clone)]
pub struct PatternDiscovered {
    pub pattern_id: String,
    pub category: String,
    pub confidence: f64,
}

/// A convention was promoted to Approved.
#[derive(Debug, Clone)]
pub struct PatternApproved {
    pub pattern_id: String,
}

/// An outlier was converted into a violation.
#[derive(Debug, Clone)]
pub struct ViolationDetected {
    pub violation_id: String,
    pub pattern_id: String,
    pub file: String,
    pub line: u32,
    pub severity: String,
}

/// A convention was learned or re-categorized.
#[derive(Debug, Clone)]
pub struct ConventionLearned {
    pub convention_id: String,
    pub category: String,
    pub dominance: f64,
}

/// A structural constraint was violated.
#[derive(Debug, Clone)]
pub struct ConstraintViolated {
    pub constraint_id: String,
    pub message: String,
}

/// An external memory record was created for a derived fact. The id is
/// opaque; the engine never dereferences it.
#[derive(Debug, Clone)]
pub struct MemoryCreated {
    pub external_id: String,
}

/// A detector crossed the false-positive disable threshold.
#[derive(Debug, Clone)]
pub struct DetectorAlert {
    pub detector_id: String,
    pub false_positive_rate: f64,
}

/// A recoverable error was recorded during a scan.
#[derive(Debug, Clone)]
pub struct EngineError {
    pub message: String,
    pub file: Option<String>,
}
