//! Minimum test set for a change: every test whose reach intersects the
//! changed functions, ordered most-selective first so the cheapest signal
//! runs earliest.

use drift_core::types::collections::FxHashSet;
use petgraph::stable_graph::NodeIndex;

use super::TestReach;

#[derive(Debug, Clone)]
pub struct TestSelection {
    pub test: NodeIndex,
    /// Changed functions this test actually reaches.
    pub hits: usize,
    /// Total production functions the test reaches - the selectivity key.
    pub reach_size: usize,
}

pub fn minimum_test_set(
    topology: &[TestReach],
    changed: &FxHashSet<NodeIndex>,
) -> Vec<TestSelection> {
    let mut selected: Vec<TestSelection> = topology
        .iter()
        .filter_map(|reach| {
            let hits = reach.reaches.intersection(changed).count();
            if hits == 0 {
                return None;
            }
            Some(TestSelection {
                test: reach.test,
                hits,
                reach_size: reach.reaches.len(),
            })
        })
        .collect();

    // Fewest-reaching first; ties broken by more hits.
    selected.sort_by(|a, b| {
        a.reach_size
            .cmp(&b.reach_size)
            .then(b.hits.cmp(&a.hits))
    });
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_topology::fixtures::fixture;
    use crate::graph::test_topology::test_topology;
    use drift_core::CancellationToken;

    #[test]
    fn only_intersecting_tests_selected() {
        let (graph, nodes) = fixture();
        let topology = test_topology(&graph, 20, &CancellationToken::new());

        // Change only `a`: t1 reaches it, t2 does not.
        let changed: FxHashSet<NodeIndex> = [nodes[2]].into_iter().collect();
        let selection = minimum_test_set(&topology, &changed);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].test, nodes[0]);
    }

    #[test]
    fn selectivity_orders_narrow_tests_first() {
        let (graph, nodes) = fixture();
        let topology = test_topology(&graph, 20, &CancellationToken::new());

        // Change `b`: both tests reach it; t2 (reach {b, c}) is narrower
        // than t1 (reach {a, b, c}).
        let changed: FxHashSet<NodeIndex> = [nodes[3]].into_iter().collect();
        let selection = minimum_test_set(&topology, &changed);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection[0].test, nodes[1]);
        assert_eq!(selection[1].test, nodes[0]);
    }

    #[test]
    fn untouched_change_set_selects_nothing() {
        let (graph, _) = fixture();
        let topology = test_topology(&graph, 20, &CancellationToken::new());
        let selection = minimum_test_set(&topology, &FxHashSet::default());
        assert!(selection.is_empty());
    }
}
