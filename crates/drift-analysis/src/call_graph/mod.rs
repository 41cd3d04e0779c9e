//! The in-memory call graph: directed, labeled, file-owned nodes.

mod incremental;

use drift_core::types::collections::FxHashMap;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;

use crate::resolution::Resolution;

pub use incremental::replace_file;

/// One function node. The key is `file::qualified_name`.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub file: String,
    pub qualified_name: String,
    pub name: String,
    pub body_hash: u64,
    pub start_line: u32,
    pub end_line: u32,
    pub is_entry_point: bool,
    pub is_test: bool,
    pub is_exported: bool,
}

impl FunctionNode {
    pub fn key(&self) -> String {
        format!("{}::{}", self.file, self.qualified_name)
    }
}

/// One call edge.
#[derive(Debug, Clone)]
pub struct CallEdgeData {
    pub resolution: Resolution,
    pub confidence: f64,
    pub call_line: u32,
}

/// Stable-index directed graph plus the lookup maps that make file-level
/// removal a bulk operation.
pub struct CallGraph {
    pub(crate) graph: StableDiGraph<FunctionNode, CallEdgeData>,
    pub(crate) by_key: FxHashMap<String, NodeIndex>,
    pub(crate) by_file: FxHashMap<String, Vec<NodeIndex>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            by_key: FxHashMap::default(),
            by_file: FxHashMap::default(),
        }
    }

    pub fn function_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, key: &str) -> Option<NodeIndex> {
        self.by_key.get(key).copied()
    }

    pub fn weight(&self, idx: NodeIndex) -> Option<&FunctionNode> {
        self.graph.node_weight(idx)
    }

    pub fn nodes_of_file(&self, file: &str) -> &[NodeIndex] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Insert a function, returning its index. Re-inserting the same key
    /// returns the existing node.
    pub fn add_function(&mut self, node: FunctionNode) -> NodeIndex {
        let key = node.key();
        if let Some(&existing) = self.by_key.get(&key) {
            return existing;
        }
        let file = node.file.clone();
        let idx = self.graph.add_node(node);
        self.by_key.insert(key, idx);
        self.by_file.entry(file).or_default().push(idx);
        idx
    }

    pub fn add_edge(&mut self, caller: NodeIndex, callee: NodeIndex, edge: CallEdgeData) {
        self.graph.add_edge(caller, callee, edge);
    }

    pub fn neighbors(
        &self,
        idx: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, direction)
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Nodes with no inbound call edges - the raw input to dead-code
    /// analysis before its false-positive filters.
    pub fn uncalled_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn test_node(file: &str, name: &str) -> FunctionNode {
    FunctionNode {
        file: file.to_string(),
        qualified_name: name.to_string(),
        name: name.to_string(),
        body_hash: 0,
        start_line: 1,
        end_line: 10,
        is_entry_point: false,
        is_test: false,
        is_exported: false,
    }
}

#[cfg(test)]
pub(crate) fn test_edge() -> CallEdgeData {
    CallEdgeData {
        resolution: Resolution::SameFile,
        confidence: 0.95,
        call_line: 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_is_stable() {
        let mut graph = CallGraph::new();
        let a = graph.add_function(test_node("a.ts", "f"));
        let b = graph.add_function(test_node("a.ts", "f"));
        assert_eq!(a, b);
        assert_eq!(graph.function_count(), 1);
    }

    #[test]
    fn uncalled_nodes_excludes_callees() {
        let mut graph = CallGraph::new();
        let caller = graph.add_function(test_node("a.ts", "caller"));
        let callee = graph.add_function(test_node("a.ts", "callee"));
        graph.add_edge(caller, callee, test_edge());

        let uncalled = graph.uncalled_nodes();
        assert!(uncalled.contains(&caller));
        assert!(!uncalled.contains(&callee));
    }
}
