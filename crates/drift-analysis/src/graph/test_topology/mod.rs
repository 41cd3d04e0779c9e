//! Test topology: which production functions each test exercises, and the
//! minimum test set for a change.

mod minimum_set;

pub use minimum_set::{minimum_test_set, TestSelection};

use drift_core::types::collections::{FxHashMap, FxHashSet};
use drift_core::CancellationToken;
use petgraph::stable_graph::NodeIndex;

use crate::call_graph::CallGraph;

use super::reachability::{reachable, TraversalDirection};

/// One test's reach into production code.
#[derive(Debug, Clone)]
pub struct TestReach {
    pub test: NodeIndex,
    pub reaches: FxHashSet<NodeIndex>,
}

/// Map every test function to the production functions reachable from its
/// body. Test-to-test edges are ignored - a test reaching another test
/// says nothing about coverage.
pub fn test_topology(
    graph: &CallGraph,
    max_depth: u32,
    cancel: &CancellationToken,
) -> Vec<TestReach> {
    let tests: Vec<NodeIndex> = graph
        .all_nodes()
        .filter(|&node| graph.weight(node).map(|w| w.is_test).unwrap_or(false))
        .collect();

    let mut topology = Vec::with_capacity(tests.len());
    for test in tests {
        if cancel.is_cancelled() {
            break;
        }
        let result = reachable(graph, &[test], TraversalDirection::Forward, max_depth, cancel);
        let reaches: FxHashSet<NodeIndex> = result
            .reached
            .keys()
            .copied()
            .filter(|&node| graph.weight(node).map(|w| !w.is_test).unwrap_or(false))
            .collect();
        topology.push(TestReach { test, reaches });
    }
    topology
}

/// Production functions with no covering test at all.
pub fn uncovered_functions(
    graph: &CallGraph,
    topology: &[TestReach],
) -> Vec<NodeIndex> {
    let covered: FxHashSet<NodeIndex> = topology
        .iter()
        .flat_map(|reach| reach.reaches.iter().copied())
        .collect();

    graph
        .all_nodes()
        .filter(|&node| {
            graph
                .weight(node)
                .map(|w| !w.is_test && !covered.contains(&node))
                .unwrap_or(false)
        })
        .collect()
}

/// Coverage ratio per file: covered production functions over total.
pub fn coverage_by_file(
    graph: &CallGraph,
    topology: &[TestReach],
) -> FxHashMap<String, (usize, usize)> {
    let covered: FxHashSet<NodeIndex> = topology
        .iter()
        .flat_map(|reach| reach.reaches.iter().copied())
        .collect();

    let mut by_file: FxHashMap<String, (usize, usize)> = FxHashMap::default();
    for node in graph.all_nodes() {
        let Some(weight) = graph.weight(node) else {
            continue;
        };
        if weight.is_test {
            continue;
        }
        let entry = by_file.entry(weight.file.clone()).or_insert((0, 0));
        entry.1 += 1;
        if covered.contains(&node) {
            entry.0 += 1;
        }
    }
    by_file
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::call_graph::{CallEdgeData, CallGraph, FunctionNode};
    use crate::resolution::Resolution;
    use petgraph::stable_graph::NodeIndex;

    pub fn node(name: &str, is_test: bool) -> FunctionNode {
        FunctionNode {
            file: if is_test { "app.test.ts" } else { "app.ts" }.to_string(),
            qualified_name: name.to_string(),
            name: name.to_string(),
            body_hash: 0,
            start_line: 1,
            end_line: 9,
            is_entry_point: false,
            is_test,
            is_exported: false,
        }
    }

    pub fn edge() -> CallEdgeData {
        CallEdgeData {
            resolution: Resolution::SameFile,
            confidence: 0.95,
            call_line: 2,
        }
    }

    /// Two tests over three prod functions:
    /// t1 → a → b, t2 → b → c.
    pub fn fixture() -> (CallGraph, Vec<NodeIndex>) {
        let mut graph = CallGraph::new();
        let t1 = graph.add_function(node("t1", true));
        let t2 = graph.add_function(node("t2", true));
        let a = graph.add_function(node("a", false));
        let b = graph.add_function(node("b", false));
        let c = graph.add_function(node("c", false));
        graph.add_edge(t1, a, edge());
        graph.add_edge(a, b, edge());
        graph.add_edge(t2, b, edge());
        graph.add_edge(b, c, edge());
        (graph, vec![t1, t2, a, b, c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::fixture;

    #[test]
    fn tests_map_to_production_reach() {
        let (graph, nodes) = fixture();
        let topology = test_topology(&graph, 20, &CancellationToken::new());

        let t1 = topology.iter().find(|r| r.test == nodes[0]).unwrap();
        assert!(t1.reaches.contains(&nodes[2])); // a
        assert!(t1.reaches.contains(&nodes[3])); // b
        assert!(t1.reaches.contains(&nodes[4])); // c via b

        let t2 = topology.iter().find(|r| r.test == nodes[1]).unwrap();
        assert!(!t2.reaches.contains(&nodes[2]));
        assert!(t2.reaches.contains(&nodes[3]));
    }

    #[test]
    fn uncovered_functions_found() {
        let (mut graph, _) = fixture();
        let orphan = graph.add_function(fixtures::node("orphan", false));
        let topology = test_topology(&graph, 20, &CancellationToken::new());
        let uncovered = uncovered_functions(&graph, &topology);
        assert_eq!(uncovered, vec![orphan]);
    }

    #[test]
    fn coverage_by_file_counts() {
        let (graph, _) = fixture();
        let topology = test_topology(&graph, 20, &CancellationToken::new());
        let coverage = coverage_by_file(&graph, &topology);
        let (covered, total) = coverage["app.ts"];
        assert_eq!(total, 3);
        assert_eq!(covered, 3);
    }
}
