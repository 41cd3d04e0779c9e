//! Pipeline-level errors and the scan status carried back to callers.
//!
//! Cancellation is a status, not an error: a cancelled scan returns
//! `ScanStatus::Cancelled` with whatever made it to durable storage.

use thiserror::Error;

use super::{
    BoundaryError, ConfigError, DetectionError, GraphError, StorageError, TaintError,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Taint(#[from] TaintError),

    #[error("pipeline inconsistency: {0}")]
    Inconsistency(String),
}

impl PipelineError {
    /// Process exit code when the engine is embedded in a command surface:
    /// 2 for tool/runtime failures, 3 for invalid input or configuration.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 3,
            _ => 2,
        }
    }
}

/// Terminal status of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Scan ran to completion; derived state is fully refreshed.
    Completed,
    /// Cancellation was requested; durable state is a consistent prefix.
    Cancelled,
}

impl ScanStatus {
    pub fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
