//! Boundary analysis: learn the project's ORM usage, then detect data
//! access points and classify sensitive fields.

mod detector;
mod extractors;
mod learn;
mod sensitive;
mod types;

pub use detector::BoundaryAnalyzer;
pub use learn::{LearnedContext, TableNamingStyle};
pub use sensitive::{SensitiveFieldClassifier, SensitivityClass};
pub use types::{Boundary, BoundaryOperation, OrmFramework, SensitiveField};
