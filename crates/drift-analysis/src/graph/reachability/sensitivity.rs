//! Sensitivity inheritance: a function carries the max sensitivity of the
//! fields it touches; a reachability result carries the max over every
//! function it reaches.

use drift_core::types::collections::FxHashMap;
use petgraph::stable_graph::NodeIndex;

use crate::boundaries::SensitivityClass;

use super::bfs::ReachabilityResult;

/// Function → sensitivity map, built from the boundary analyzer's
/// function→table→field chain.
pub type FunctionSensitivity = FxHashMap<NodeIndex, SensitivityClass>;

/// Highest sensitivity reachable from the query root, including the root
/// itself.
pub fn max_reachable_sensitivity(
    result: &ReachabilityResult,
    roots: &[NodeIndex],
    sensitivities: &FunctionSensitivity,
) -> Option<SensitivityClass> {
    roots
        .iter()
        .chain(result.reached.keys())
        .filter_map(|node| sensitivities.get(node))
        .copied()
        .max_by_key(|class| class.severity())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_over_root_and_reached() {
        let root = NodeIndex::new(0);
        let reached_node = NodeIndex::new(1);

        let mut result = ReachabilityResult {
            reached: FxHashMap::default(),
            predecessors: FxHashMap::default(),
            max_depth_reached: 1,
            saturated: true,
        };
        result.reached.insert(reached_node, 1);

        let mut sensitivities = FunctionSensitivity::default();
        sensitivities.insert(root, SensitivityClass::Pii);
        sensitivities.insert(reached_node, SensitivityClass::Credentials);

        let max = max_reachable_sensitivity(&result, &[root], &sensitivities);
        assert_eq!(max, Some(SensitivityClass::Credentials));
    }

    #[test]
    fn no_sensitive_functions_is_none() {
        let result = ReachabilityResult {
            reached: FxHashMap::default(),
            predecessors: FxHashMap::default(),
            max_depth_reached: 0,
            saturated: true,
        };
        let max = max_reachable_sensitivity(
            &result,
            &[NodeIndex::new(0)],
            &FunctionSensitivity::default(),
        );
        assert!(max.is_none());
    }
}
