//! Blast radius: transitive callers ∪ transitive callees, weighted by
//! entry-point ancestry and the maximum sensitivity encountered.

use drift_core::types::collections::FxHashSet;
use drift_core::CancellationToken;
use petgraph::stable_graph::NodeIndex;

use crate::boundaries::SensitivityClass;
use crate::call_graph::CallGraph;
use crate::graph::reachability::{
    max_reachable_sensitivity, reachable, FunctionSensitivity, TraversalDirection,
};

#[derive(Debug, Clone)]
pub struct ImpactReport {
    pub root: String,
    pub affected: FxHashSet<NodeIndex>,
    pub affected_count: usize,
    pub entry_point_ancestors: usize,
    pub sensitivity_max: Option<SensitivityClass>,
    /// Composite risk in [0, 100].
    pub risk_score: u8,
}

pub fn blast_radius(
    graph: &CallGraph,
    root: NodeIndex,
    max_depth: u32,
    sensitivities: &FunctionSensitivity,
    cancel: &CancellationToken,
) -> ImpactReport {
    let callers = reachable(graph, &[root], TraversalDirection::Inverse, max_depth, cancel);
    let callees = reachable(graph, &[root], TraversalDirection::Forward, max_depth, cancel);

    let mut affected: FxHashSet<NodeIndex> = FxHashSet::default();
    affected.extend(callers.reached.keys().copied());
    affected.extend(callees.reached.keys().copied());

    let entry_point_ancestors = callers
        .reached
        .keys()
        .filter(|&&node| graph.weight(node).map(|w| w.is_entry_point).unwrap_or(false))
        .count();

    let sensitivity_forward =
        max_reachable_sensitivity(&callees, &[root], sensitivities);
    let sensitivity_inverse =
        max_reachable_sensitivity(&callers, &[root], sensitivities);
    let sensitivity_max = [sensitivity_forward, sensitivity_inverse]
        .into_iter()
        .flatten()
        .max_by_key(|class| class.severity());

    let risk_score = risk_score(
        affected.len(),
        graph.function_count(),
        entry_point_ancestors,
        sensitivity_max,
    );

    ImpactReport {
        root: graph
            .weight(root)
            .map(|w| w.key())
            .unwrap_or_default(),
        affected_count: affected.len(),
        affected,
        entry_point_ancestors,
        sensitivity_max,
        risk_score,
    }
}

/// Reach share (up to 50) + entry-point weight (up to 25) + sensitivity
/// weight (up to 25).
fn risk_score(
    affected: usize,
    total: usize,
    entry_points: usize,
    sensitivity: Option<SensitivityClass>,
) -> u8 {
    let reach = if total > 0 {
        (affected as f64 / total as f64 * 50.0).min(50.0)
    } else {
        0.0
    };
    let entry = (entry_points as f64 * 5.0).min(25.0);
    let sensitive = match sensitivity {
        Some(SensitivityClass::Credentials) => 25.0,
        Some(SensitivityClass::Financial) | Some(SensitivityClass::Health) => 20.0,
        Some(SensitivityClass::Pii) => 15.0,
        None => 0.0,
    };
    (reach + entry + sensitive).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_graph::{CallEdgeData, FunctionNode};
    use crate::resolution::Resolution;

    fn node(name: &str, entry: bool) -> FunctionNode {
        FunctionNode {
            file: "f.ts".to_string(),
            qualified_name: name.to_string(),
            name: name.to_string(),
            body_hash: 0,
            start_line: 1,
            end_line: 5,
            is_entry_point: entry,
            is_test: false,
            is_exported: false,
        }
    }

    fn edge() -> CallEdgeData {
        CallEdgeData {
            resolution: Resolution::SameFile,
            confidence: 0.95,
            call_line: 1,
        }
    }

    #[test]
    fn radius_spans_both_directions() {
        // route(entry) → service → repo; radius of service covers both.
        let mut graph = CallGraph::new();
        let route = graph.add_function(node("route", true));
        let service = graph.add_function(node("service", false));
        let repo = graph.add_function(node("repo", false));
        graph.add_edge(route, service, edge());
        graph.add_edge(service, repo, edge());

        let mut sensitivities = FunctionSensitivity::default();
        sensitivities.insert(repo, SensitivityClass::Pii);

        let report = blast_radius(
            &graph,
            service,
            20,
            &sensitivities,
            &CancellationToken::new(),
        );
        assert_eq!(report.affected_count, 2);
        assert_eq!(report.entry_point_ancestors, 1);
        assert_eq!(report.sensitivity_max, Some(SensitivityClass::Pii));
        assert!(report.risk_score > 0);
    }

    #[test]
    fn isolated_function_scores_low() {
        let mut graph = CallGraph::new();
        let lonely = graph.add_function(node("lonely", false));
        let report = blast_radius(
            &graph,
            lonely,
            20,
            &FunctionSensitivity::default(),
            &CancellationToken::new(),
        );
        assert_eq!(report.affected_count, 0);
        assert_eq!(report.risk_score, 0);
    }
}
