//! Boundary-analyzer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("no extractor registered for framework '{framework}'")]
    UnknownFramework { framework: String },

    #[error("learn phase has not run; detect phase requires learned context")]
    NotLearned,

    #[error("field extraction failed in {file}: {message}")]
    ExtractionFailed { file: String, message: String },
}
