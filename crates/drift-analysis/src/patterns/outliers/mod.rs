//! Outlier detection: statistical method auto-selected by sample shape,
//! normalized deviation scores, violation conversion.

mod conversion;
mod esd;
mod grubbs;
mod iqr;
mod mad;
mod rule_based;
mod selector;
mod types;
mod zscore;

pub use conversion::{outliers_to_violations, violation_fingerprint, Violation};
pub use selector::{select_method, OutlierDetector};
pub use types::{Deviation, OutlierFinding, OutlierMethod, Significance};
