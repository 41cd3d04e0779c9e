//! Dead-code candidates: functions with no inbound edges, filtered through
//! the known false-positive classes before anything is reported.

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;

use crate::call_graph::CallGraph;

/// Why an uncalled function was excused. One entry per false-positive
/// class the filter recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    EntryPoint,
    Exported,
    TestFunction,
    TestOnlyCallers,
    FrameworkHook,
    Constructor,
    MainFunction,
    DunderOrMagic,
    AnnotatedHandler,
    DynamicDispatchCandidate,
}

#[derive(Debug, Default)]
pub struct DeadCodeReport {
    /// Survivors: uncalled and unexcused.
    pub dead: Vec<NodeIndex>,
    /// Excused candidates with the class that excused them.
    pub excluded: Vec<(NodeIndex, ExclusionReason)>,
}

const FRAMEWORK_HOOK_NAMES: &[&str] = &[
    "componentDidMount", "componentWillUnmount", "ngOnInit", "ngOnDestroy", "setup",
    "teardown", "render", "mounted", "created", "beforeEach", "afterEach",
    "onModuleInit", "onApplicationBootstrap", "configure", "middleware",
];

const CONSTRUCTOR_NAMES: &[&str] = &["constructor", "__init__", "new", "init", "initialize"];

pub fn dead_code(graph: &CallGraph) -> DeadCodeReport {
    let mut report = DeadCodeReport::default();

    // Candidates: no production caller. A function reached only from
    // tests is production-dead but lands in the test-only exclusion class
    // rather than the report.
    let candidates: Vec<(NodeIndex, bool)> = graph
        .all_nodes()
        .filter_map(|node| {
            let mut any_caller = false;
            let mut any_production_caller = false;
            for caller in graph.neighbors(node, Direction::Incoming) {
                any_caller = true;
                if graph.weight(caller).map(|w| !w.is_test).unwrap_or(true) {
                    any_production_caller = true;
                    break;
                }
            }
            if any_production_caller {
                None
            } else {
                Some((node, any_caller))
            }
        })
        .collect();

    for (node, has_test_callers) in candidates {
        let Some(weight) = graph.weight(node) else {
            continue;
        };

        let reason = if has_test_callers {
            Some(ExclusionReason::TestOnlyCallers)
        } else if weight.is_entry_point {
            Some(ExclusionReason::EntryPoint)
        } else if weight.is_exported {
            Some(ExclusionReason::Exported)
        } else if weight.is_test {
            Some(ExclusionReason::TestFunction)
        } else if weight.name == "main" {
            Some(ExclusionReason::MainFunction)
        } else if CONSTRUCTOR_NAMES.contains(&weight.name.as_str()) {
            Some(ExclusionReason::Constructor)
        } else if weight.name.starts_with("__") && weight.name.ends_with("__") {
            Some(ExclusionReason::DunderOrMagic)
        } else if FRAMEWORK_HOOK_NAMES.contains(&weight.name.as_str()) {
            Some(ExclusionReason::FrameworkHook)
        } else if weight.qualified_name.contains('.') && looks_dynamic(&weight.name) {
            // Interface-style method names are routinely reached through
            // dynamic dispatch the resolver cannot see.
            Some(ExclusionReason::DynamicDispatchCandidate)
        } else {
            None
        };

        match reason {
            Some(reason) => report.excluded.push((node, reason)),
            None => report.dead.push(node),
        }
    }

    report
}

/// Handler/listener shapes commonly invoked reflectively.
fn looks_dynamic(name: &str) -> bool {
    name.starts_with("on")
        || name.starts_with("handle")
        || name.ends_with("Handler")
        || name.ends_with("Listener")
        || name.ends_with("Callback")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_graph::{CallEdgeData, FunctionNode};
    use crate::resolution::Resolution;

    fn node(name: &str) -> FunctionNode {
        FunctionNode {
            file: "f.ts".to_string(),
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
            call_line: 1,
        }
    }

    #[test]
    fn truly_dead_function_survives_filters() {
        let mut graph = CallGraph::new();
        let dead_fn = graph.add_function(node("obsoleteHelper"));
        let report = dead_code(&graph);
        assert_eq!(report.dead, vec![dead_fn]);
    }

    #[test]
    fn entry_points_and_exports_are_excused() {
        let mut graph = CallGraph::new();
        let mut entry = node("route");
        entry.is_entry_point = true;
        let mut exported = node("publicApi");
        exported.is_exported = true;
        graph.add_function(entry);
        graph.add_function(exported);

        let report = dead_code(&graph);
        assert!(report.dead.is_empty());
        assert_eq!(report.excluded.len(), 2);
    }

    #[test]
    fn framework_hooks_and_constructors_are_excused() {
        let mut graph = CallGraph::new();
        graph.add_function(node("componentDidMount"));
        graph.add_function(node("constructor"));
        graph.add_function(node("__repr__"));

        let report = dead_code(&graph);
        assert!(report.dead.is_empty());
    }

    #[test]
    fn test_only_callees_are_excused() {
        let mut graph = CallGraph::new();
        let mut test_fn = node("spec");
        test_fn.is_test = true;
        let test_idx = graph.add_function(test_fn);
        let helper = graph.add_function(node("fixtureBuilder"));
        graph.add_edge(test_idx, helper, edge());

        let report = dead_code(&graph);
        // Called only from a test: excused under the test-only class, not
        // reported dead.
        assert!(!report.dead.contains(&helper));
        assert!(report
            .excluded
            .iter()
            .any(|(node, reason)| *node == helper
                && *reason == ExclusionReason::TestOnlyCallers));
    }
}
