//! Detection-engine errors: bad pattern definitions, detector faults,
//! non-finite statistics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("invalid pattern definition: {0}")]
    InvalidPattern(String),

    #[error("pattern '{id}' must declare exactly one of `query` or `regex`")]
    AmbiguousPatternBody { id: String },

    #[error("detector '{detector}' failed on {file}: {message}")]
    DetectorFailed {
        detector: String,
        file: String,
        message: String,
    },

    #[error("non-finite value in {context}: {value}")]
    NonFiniteValue { context: String, value: f64 },

    #[error("aggregation inconsistency: {0}")]
    Inconsistency(String),
}
