//! Interprocedural propagation: per-function summaries pushed to fixed
//! point along the call graph in reverse topological SCC order.
//!
//! A summary records which CWEs a function's parameters can transitively
//! reach. A caller passing tainted data into a summarized callee completes
//! a cross-function flow without re-analyzing the callee's body.

use drift_core::types::collections::{FxHashMap, FxHashSet};
use petgraph::algo::tarjan_scc;

use crate::call_graph::CallGraph;

use super::intraprocedural::IntraproceduralResult;
use super::types::{FlowSeverity, TaintFlow, TaintRole, TaintStep};

/// Iteration bound within one SCC; cycles that have not converged by then
/// carry no further summary growth worth chasing.
const SCC_ITERATION_BOUND: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct FunctionSummary {
    /// CWEs reachable from this function's parameters, directly or through
    /// callees.
    pub param_reaches_cwes: FxHashSet<u32>,
}

/// Propagate summaries and emit cross-function flows.
///
/// `intra` is keyed by the function's qualified name as it appears in call
/// graph nodes.
pub fn propagate_summaries(
    graph: &CallGraph,
    intra: &FxHashMap<String, IntraproceduralResult>,
) -> (FxHashMap<String, FunctionSummary>, Vec<TaintFlow>) {
    let mut summaries: FxHashMap<String, FunctionSummary> = FxHashMap::default();

    // Seed from direct param→sink observations.
    for (name, result) in intra {
        let summary = summaries.entry(name.clone()).or_default();
        for (_, cwe) in &result.param_sinks {
            summary.param_reaches_cwes.insert(*cwe);
        }
    }

    // Reverse topological SCC order: callees summarized before callers.
    // tarjan_scc returns components in reverse topological order already.
    let components = tarjan_scc(&graph.graph);

    for component in &components {
        for _ in 0..SCC_ITERATION_BOUND {
            let mut changed = false;
            for &node in component {
                let Some(weight) = graph.weight(node) else {
                    continue;
                };
                let caller_name = weight.qualified_name.clone();
                let Some(result) = intra.get(&caller_name) else {
                    continue;
                };

                // A call with a tainted argument inherits the callee's
                // reachable CWEs into the caller's summary.
                let mut inherited: FxHashSet<u32> = FxHashSet::default();
                for (callee_text, _, _) in &result.tainted_calls {
                    let callee_name = callee_text
                        .rsplit(['.', ':']) // method chains collapse to the name
                        .next()
                        .unwrap_or(callee_text);
                    if let Some(callee_summary) = lookup_summary(&summaries, callee_name) {
                        inherited.extend(callee_summary.param_reaches_cwes.iter().copied());
                    }
                }

                if !inherited.is_empty() {
                    let summary = summaries.entry(caller_name).or_default();
                    let before = summary.param_reaches_cwes.len();
                    summary.param_reaches_cwes.extend(inherited);
                    if summary.param_reaches_cwes.len() != before {
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    let flows = emit_cross_function_flows(intra, &summaries);
    (summaries, flows)
}

/// A caller with a real (source-rooted) tainted value flowing into a
/// summarized callee produces a flow ending at the callee boundary.
fn emit_cross_function_flows(
    intra: &FxHashMap<String, IntraproceduralResult>,
    summaries: &FxHashMap<String, FunctionSummary>,
) -> Vec<TaintFlow> {
    let mut flows = Vec::new();

    for result in intra.values() {
        // Only callers that saw a real source produce complete flows.
        let has_local_source = result
            .flows
            .iter()
            .any(|f| f.source().is_some())
            || !result.tainted_calls.is_empty();
        if !has_local_source {
            continue;
        }

        for (callee_text, _, line) in &result.tainted_calls {
            let callee_name = callee_text.rsplit(['.', ':']).next().unwrap_or(callee_text);
            let Some(summary) = lookup_summary(summaries, callee_name) else {
                continue;
            };
            for &cwe in &summary.param_reaches_cwes {
                flows.push(TaintFlow {
                    steps: vec![
                        TaintStep {
                            file: result.file.clone(),
                            function: result.function.clone(),
                            line: *line,
                            role: TaintRole::Source,
                            snippet: format!("tainted argument to {callee_text}"),
                        },
                        TaintStep {
                            file: result.file.clone(),
                            function: callee_name.to_string(),
                            line: *line,
                            role: TaintRole::Sink,
                            snippet: format!("{callee_text} reaches CWE-{cwe} sink"),
                        },
                    ],
                    cwe,
                    severity: FlowSeverity::for_cwe(cwe),
                });
            }
        }
    }
    flows
}

fn lookup_summary<'s>(
    summaries: &'s FxHashMap<String, FunctionSummary>,
    callee_name: &str,
) -> Option<&'s FunctionSummary> {
    // Qualified-name keys may carry a class prefix; fall back to a suffix
    // match on `.name`.
    summaries.get(callee_name).or_else(|| {
        summaries
            .iter()
            .find(|(key, _)| key.ends_with(&format!(".{callee_name}")))
            .map(|(_, summary)| summary)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_graph::{CallEdgeData, FunctionNode};
    use crate::resolution::Resolution;

    fn node(name: &str) -> FunctionNode {
        FunctionNode {
            file: "f.js".to_string(),
            qualified_name: name.to_string(),
            name: name.to_string(),
            body_hash: 0,
            start_line: 1,
            end_line: 9,
            is_entry_point: false,
            is_test: false,
            is_exported: false,
        }
    }

    fn intra_result(
        name: &str,
        param_sinks: Vec<(&str, u32)>,
        tainted_calls: Vec<(&str, usize, u32)>,
    ) -> IntraproceduralResult {
        IntraproceduralResult {
            function: name.to_string(),
            file: "f.js".to_string(),
            flows: Vec::new(),
            param_sinks: param_sinks
                .into_iter()
                .map(|(n, c)| (n.to_string(), c))
                .collect(),
            tainted_calls: tainted_calls
                .into_iter()
                .map(|(n, i, l)| (n.to_string(), i, l))
                .collect(),
        }
    }

    #[test]
    fn summaries_propagate_through_call_chain() {
        // handler → buildQuery → runQuery(db.query inside).
        let mut graph = CallGraph::new();
        let handler = graph.add_function(node("handler"));
        let build = graph.add_function(node("buildQuery"));
        let run = graph.add_function(node("runQuery"));
        let edge = || CallEdgeData {
            resolution: Resolution::SameFile,
            confidence: 0.95,
            call_line: 2,
        };
        graph.add_edge(handler, build, edge());
        graph.add_edge(build, run, edge());

        let mut intra = FxHashMap::default();
        intra.insert(
            "runQuery".to_string(),
            intra_result("runQuery", vec![("sql", 89)], vec![]),
        );
        intra.insert(
            "buildQuery".to_string(),
            intra_result("buildQuery", vec![], vec![("runQuery", 1, 4)]),
        );
        intra.insert(
            "handler".to_string(),
            intra_result("handler", vec![], vec![("buildQuery", 1, 2)]),
        );

        let (summaries, flows) = propagate_summaries(&graph, &intra);

        assert!(summaries["runQuery"].param_reaches_cwes.contains(&89));
        // Transitively: buildQuery and handler both reach the sink.
        assert!(summaries["buildQuery"].param_reaches_cwes.contains(&89));
        assert!(summaries["handler"].param_reaches_cwes.contains(&89));

        assert!(flows.iter().any(|f| f.cwe == 89 && f.is_well_formed()));
    }

    #[test]
    fn recursive_scc_terminates() {
        let mut graph = CallGraph::new();
        let a = graph.add_function(node("a"));
        let b = graph.add_function(node("b"));
        let edge = || CallEdgeData {
            resolution: Resolution::SameFile,
            confidence: 0.95,
            call_line: 2,
        };
        graph.add_edge(a, b, edge());
        graph.add_edge(b, a, edge());

        let mut intra = FxHashMap::default();
        intra.insert("a".to_string(), intra_result("a", vec![("x", 78)], vec![("b", 0, 1)]));
        intra.insert("b".to_string(), intra_result("b", vec![], vec![("a", 0, 1)]));

        let (summaries, _) = propagate_summaries(&graph, &intra);
        assert!(summaries["b"].param_reaches_cwes.contains(&78));
    }
}
