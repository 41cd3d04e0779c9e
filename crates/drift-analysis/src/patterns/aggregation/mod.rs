//! Pattern aggregation: seven idempotent, restartable phases from raw
//! per-file matches to reconciled cross-file patterns.

mod grouper;
mod hierarchy;
mod incremental;
mod pipeline;
mod similarity;
mod types;

pub use grouper::group_matches;
pub use hierarchy::build_hierarchy;
pub use incremental::remove_stale_locations;
pub use pipeline::{AggregationDiagnostics, AggregationPipeline, AggregationResult};
pub use similarity::{jaccard, MergeCandidate, MergeDecision, MinHashIndex};
pub use types::{AggregatedPattern, AggregationConfig, PatternLocation};
