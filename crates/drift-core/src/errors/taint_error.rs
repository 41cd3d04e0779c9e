//! Taint-analysis errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaintError {
    #[error("taint registry parse error: {0}")]
    RegistryParse(String),

    #[error("registry entry '{entry}' missing required field '{field}'")]
    RegistryIncomplete { entry: String, field: String },

    #[error("invalid arg_flow spec '{spec}': {message}")]
    InvalidArgFlow { spec: String, message: String },

    #[error("summary propagation did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },
}
