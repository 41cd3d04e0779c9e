//! Reachability queries over the call graph.

mod bfs;
mod cache;
mod sensitivity;

pub use bfs::{find_path, reachable, ReachabilityResult, TraversalDirection};
pub use cache::ReachabilityCache;
pub use sensitivity::{max_reachable_sensitivity, FunctionSensitivity};

/// Default BFS depth for reachability queries.
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// Which engine serves a reachability query. Both return identical
/// frontiers; the CTE engine exists for graphs too large to hold, or for
/// processes without an in-memory graph handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachabilityEngine {
    InMemory,
    SqlCte,
}

/// Engine selection: in-memory below the node threshold, recursive CTE at
/// or above it (or whenever no in-memory handle exists).
pub fn select_engine(
    node_count: usize,
    threshold: usize,
    in_memory_available: bool,
) -> ReachabilityEngine {
    if !in_memory_available || node_count >= threshold {
        ReachabilityEngine::SqlCte
    } else {
        ReachabilityEngine::InMemory
    }
}
