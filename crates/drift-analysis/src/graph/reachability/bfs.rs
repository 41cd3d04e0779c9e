//! Level-order BFS, forward and inverse, with first-discovery depth and
//! predecessor recording. The recursive-CTE engine in the storage layer
//! must return the same vertex set and depths for the same input; the
//! tests here assert parity.

use drift_core::types::collections::FxHashMap;
use drift_core::CancellationToken;
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;

use crate::call_graph::CallGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalDirection {
    Forward,
    Inverse,
}

impl TraversalDirection {
    fn petgraph(self) -> Direction {
        match self {
            Self::Forward => Direction::Outgoing,
            Self::Inverse => Direction::Incoming,
        }
    }
}

/// Result of one reachability query.
#[derive(Debug, Clone)]
pub struct ReachabilityResult {
    /// Reached nodes (excluding roots) with their first-discovery depth.
    pub reached: FxHashMap<NodeIndex, u32>,
    /// Predecessor on the first-discovery edge, for path reconstruction.
    pub predecessors: FxHashMap<NodeIndex, NodeIndex>,
    /// Deepest level actually explored.
    pub max_depth_reached: u32,
    /// True when the frontier emptied before the depth limit - the result
    /// is the full closure, not a truncation.
    pub saturated: bool,
}

/// BFS from `roots` up to `max_depth` levels. Cancellation is polled at
/// level boundaries.
pub fn reachable(
    graph: &CallGraph,
    roots: &[NodeIndex],
    direction: TraversalDirection,
    max_depth: u32,
    cancel: &CancellationToken,
) -> ReachabilityResult {
    let mut reached: FxHashMap<NodeIndex, u32> = FxHashMap::default();
    let mut predecessors: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut frontier: Vec<NodeIndex> = roots.to_vec();
    let mut depth = 0u32;
    let mut saturated = false;

    while !frontier.is_empty() {
        if depth >= max_depth {
            break;
        }
        if cancel.is_cancelled() {
            break;
        }
        depth += 1;

        let mut next = Vec::new();
        for &node in &frontier {
            for neighbor in graph.neighbors(node, direction.petgraph()) {
                if roots.contains(&neighbor) || reached.contains_key(&neighbor) {
                    continue;
                }
                reached.insert(neighbor, depth);
                predecessors.insert(neighbor, node);
                next.push(neighbor);
            }
        }
        if next.is_empty() {
            saturated = true;
        }
        frontier = next;
    }

    if frontier.is_empty() {
        saturated = true;
    }

    ReachabilityResult {
        reached,
        predecessors,
        max_depth_reached: depth,
        saturated,
    }
}

/// Shortest path between two nodes via BFS predecessors, inclusive of both
/// endpoints. `None` when unreachable within `max_depth`.
pub fn find_path(
    graph: &CallGraph,
    from: NodeIndex,
    to: NodeIndex,
    max_depth: u32,
    cancel: &CancellationToken,
) -> Option<Vec<NodeIndex>> {
    if from == to {
        return Some(vec![from]);
    }
    let result = reachable(graph, &[from], TraversalDirection::Forward, max_depth, cancel);
    if !result.reached.contains_key(&to) {
        return None;
    }

    let mut path = vec![to];
    let mut current = to;
    while let Some(&previous) = result.predecessors.get(&current) {
        path.push(previous);
        if previous == from {
            break;
        }
        current = previous;
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_graph::{CallEdgeData, CallGraph, FunctionNode};
    use crate::resolution::Resolution;

    fn node(file: &str, name: &str) -> FunctionNode {
        FunctionNode {
            file: file.to_string(),
            qualified_name: name.to_string(),
            name: name.to_string(),
            body_hash: 0,
            start_line: 1,
            end_line: 5,
            is_entry_point: false,
            is_test: false,
            is_exported: false,
        }
    }

    fn edge() -> CallEdgeData {
        CallEdgeData {
            resolution: Resolution::SameFile,
            confidence: 0.95,
            call_line: 2,
        }
    }

    /// a → b → c → d, plus a → c shortcut.
    fn diamond() -> (CallGraph, Vec<NodeIndex>) {
        let mut graph = CallGraph::new();
        let a = graph.add_function(node("f.ts", "a"));
        let b = graph.add_function(node("f.ts", "b"));
        let c = graph.add_function(node("f.ts", "c"));
        let d = graph.add_function(node("f.ts", "d"));
        graph.add_edge(a, b, edge());
        graph.add_edge(b, c, edge());
        graph.add_edge(c, d, edge());
        graph.add_edge(a, c, edge());
        (graph, vec![a, b, c, d])
    }

    #[test]
    fn forward_reaches_closure_with_min_depths() {
        let (graph, nodes) = diamond();
        let result = reachable(
            &graph,
            &[nodes[0]],
            TraversalDirection::Forward,
            20,
            &CancellationToken::new(),
        );
        assert_eq!(result.reached.len(), 3);
        assert_eq!(result.reached[&nodes[1]], 1);
        // c is discoverable at depth 2 via b, but the a→c shortcut wins.
        assert_eq!(result.reached[&nodes[2]], 1);
        assert_eq!(result.reached[&nodes[3]], 2);
        assert!(result.saturated);
    }

    #[test]
    fn inverse_walks_callers() {
        let (graph, nodes) = diamond();
        let result = reachable(
            &graph,
            &[nodes[3]],
            TraversalDirection::Inverse,
            20,
            &CancellationToken::new(),
        );
        assert_eq!(result.reached.len(), 3);
        assert_eq!(result.reached[&nodes[2]], 1);
    }

    #[test]
    fn depth_limit_truncates_and_clears_saturated() {
        let (graph, nodes) = diamond();
        let result = reachable(
            &graph,
            &[nodes[0]],
            TraversalDirection::Forward,
            1,
            &CancellationToken::new(),
        );
        assert!(!result.reached.contains_key(&nodes[3]));
        assert!(!result.saturated);
    }

    #[test]
    fn path_follows_first_discovery_edges() {
        let (graph, nodes) = diamond();
        let path = find_path(&graph, nodes[0], nodes[3], 20, &CancellationToken::new())
            .expect("path exists");
        assert_eq!(path.first(), Some(&nodes[0]));
        assert_eq!(path.last(), Some(&nodes[3]));
        // Shortcut a→c→d beats a→b→c→d.
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn in_memory_bfs_matches_sql_cte() {
        use drift_storage::{queries::call_edges, BatchCommand, BatchWriter, Store};
        use std::sync::Arc;

        let (graph, nodes) = diamond();

        // Mirror the diamond into the store.
        let store = Arc::new(Store::open_in_memory().unwrap());
        let (sender, writer) = BatchWriter::spawn(store.clone(), 64, 500);
        sender
            .send(BatchCommand::UpsertFile {
                path: "f.ts".to_string(),
                content_hash: 1,
                size: 1,
                language: Some("typescript".to_string()),
                mtime_secs: 0,
                mtime_nanos: 0,
                scan_error: None,
            })
            .unwrap();
        for name in ["a", "b", "c", "d"] {
            sender
                .send(BatchCommand::InsertFunction {
                    file: "f.ts".to_string(),
                    name: name.to_string(),
                    qualified_name: name.to_string(),
                    signature: None,
                    body_hash: 0,
                    start_line: 1,
                    end_line: 5,
                    is_entry_point: false,
                    is_injectable: false,
                    is_auth_handler: false,
                    is_test: false,
                    is_data_accessor: false,
                })
                .unwrap();
        }
        for (caller, callee) in [("a", "b"), ("b", "c"), ("c", "d"), ("a", "c")] {
            sender
                .send(BatchCommand::InsertCallEdge {
                    caller_file: "f.ts".to_string(),
                    caller_qualified: caller.to_string(),
                    callee_file: Some("f.ts".to_string()),
                    callee_qualified: Some(callee.to_string()),
                    resolution: "same_file".to_string(),
                    confidence: 0.95,
                    call_line: 2,
                })
                .unwrap();
        }
        drop(sender);
        writer.close().unwrap();

        let memory = reachable(
            &graph,
            &[nodes[0]],
            TraversalDirection::Forward,
            5,
            &CancellationToken::new(),
        );

        let a_id = store
            .with_reader(|conn| {
                drift_storage::queries::functions::lookup_id(conn, "f.ts", "a")
            })
            .unwrap()
            .unwrap();
        let via_cte = store
            .with_reader(|conn| call_edges::cte_reachable_forward(conn, a_id, Some(5)))
            .unwrap();

        // Same vertex count and same depth per vertex.
        assert_eq!(via_cte.len(), memory.reached.len());
        let mut cte_depths: Vec<u32> = via_cte.iter().map(|(_, d)| *d).collect();
        let mut mem_depths: Vec<u32> = memory.reached.values().copied().collect();
        cte_depths.sort();
        mem_depths.sort();
        assert_eq!(cte_depths, mem_depths);
    }
}
