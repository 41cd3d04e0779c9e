//! Error taxonomy: one enum per subsystem, `thiserror` only.
//!
//! Inner layers return these without logging; the pipeline records per-file
//! errors and keeps going. Panics are never part of the normal flow.

mod boundary_error;
mod config_error;
mod detection_error;
mod graph_error;
mod parse_error;
mod pipeline_error;
mod scan_error;
mod storage_error;
mod taint_error;

pub use boundary_error::BoundaryError;
pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use graph_error::GraphError;
pub use parse_error::ParseError;
pub use pipeline_error::{PipelineError, ScanStatus};
pub use scan_error::ScanError;
pub use storage_error::StorageError;
pub use taint_error::TaintError;
