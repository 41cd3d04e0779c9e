//! Call-graph and reachability errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("function not found in graph: {key}")]
    FunctionNotFound { key: String },

    #[error("recursive-CTE traversal failed: {message}")]
    CteFailed { message: String },

    #[error("CTE engine requested but no store connection available")]
    NoCteConnection,

    #[error("graph lock poisoned")]
    LockPoisoned,
}
