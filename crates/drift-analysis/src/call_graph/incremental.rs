//! Incremental graph maintenance: replacing a file's functions is a bulk
//! remove-then-insert scoped to that file's nodes and edges.

use petgraph::Direction;

use super::{CallGraph, FunctionNode};

/// Remove every node owned by `file` and insert the fresh set. Inbound
/// edges from other files to removed nodes disappear with the node; the
/// persisted layer marks those rows `stale` instead (see the storage
/// queries), so callers keep a record of the severed call.
///
/// Cost is O(nodes + edges touching the file), not O(graph).
pub fn replace_file(graph: &mut CallGraph, file: &str, fresh: Vec<FunctionNode>) {
    if let Some(nodes) = graph.by_file.remove(file) {
        for idx in nodes {
            if let Some(node) = graph.graph.node_weight(idx) {
                graph.by_key.remove(&node.key());
            }
            // Removes the node's incident edges in both directions.
            graph.graph.remove_node(idx);
        }
    }

    for node in fresh {
        graph.add_function(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_graph::{test_edge, test_node};

    #[test]
    fn replace_removes_outgoing_and_inbound_edges() {
        let mut graph = CallGraph::new();
        let a = graph.add_function(test_node("a.ts", "fa"));
        let b = graph.add_function(test_node("b.ts", "fb"));
        let c = graph.add_function(test_node("c.ts", "fc"));
        graph.add_edge(a, b, test_edge()); // inbound to b
        graph.add_edge(b, c, test_edge()); // outgoing from b

        replace_file(&mut graph, "b.ts", vec![test_node("b.ts", "fb2")]);

        assert!(graph.node("b.ts::fb").is_none());
        assert!(graph.node("b.ts::fb2").is_some());
        assert_eq!(graph.edge_count(), 0);
        // Other files' nodes are untouched.
        assert!(graph.node("a.ts::fa").is_some());
        assert!(graph.node("c.ts::fc").is_some());
    }

    #[test]
    fn replace_is_scoped_to_one_file() {
        let mut graph = CallGraph::new();
        let a = graph.add_function(test_node("a.ts", "fa"));
        let a2 = graph.add_function(test_node("a.ts", "fa2"));
        graph.add_edge(a, a2, test_edge());

        replace_file(&mut graph, "b.ts", Vec::new());
        assert_eq!(graph.function_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn inbound_neighbor_count_drops() {
        let mut graph = CallGraph::new();
        let a = graph.add_function(test_node("a.ts", "fa"));
        let b = graph.add_function(test_node("b.ts", "fb"));
        graph.add_edge(a, b, test_edge());

        replace_file(&mut graph, "b.ts", Vec::new());
        assert_eq!(
            graph
                .neighbors(a, Direction::Outgoing)
                .count(),
            0
        );
    }
}
