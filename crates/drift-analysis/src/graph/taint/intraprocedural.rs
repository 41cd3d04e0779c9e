//! Intraprocedural dataflow: one mini taint pass per function over its
//! GAST subtree.
//!
//! Tainted names propagate through assignments and variable declarations;
//! a call matching a sink with a tainted argument closes a flow; a
//! sanitizer clearing that sink's CWE terminates it first. Symbolic names
//! are per-function, so the pass is trivially parallel across functions.

use drift_core::types::collections::{FxHashMap, FxHashSet};

use crate::gast::{GastKind, GastNode};

use super::registry::TaintRegistry;
use super::types::{FlowSeverity, TaintFlow, TaintRole, TaintStep};

/// Output of one function's pass.
#[derive(Debug, Clone, Default)]
pub struct IntraproceduralResult {
    pub function: String,
    pub file: String,
    /// Complete in-function flows.
    pub flows: Vec<TaintFlow>,
    /// Parameter names that reach a sink inside this function, with the
    /// sink's CWE - the seed for interprocedural summaries.
    pub param_sinks: Vec<(String, u32)>,
    /// Calls receiving tainted arguments: (callee text, argument index,
    /// line) - resolved cross-function by the interprocedural phase.
    pub tainted_calls: Vec<(String, usize, u32)>,
}

struct TaintedName {
    /// Steps that carried taint to this name, source first.
    trail: Vec<TaintStep>,
    label: String,
    /// CWEs already neutralized for this value.
    cleared_cwes: FxHashSet<u32>,
}

pub fn analyze_function(
    registry: &TaintRegistry,
    file: &str,
    function_name: &str,
    parameters: &[String],
    body: &GastNode,
) -> IntraproceduralResult {
    let mut result = IntraproceduralResult {
        function: function_name.to_string(),
        file: file.to_string(),
        ..Default::default()
    };

    let mut tainted: FxHashMap<String, TaintedName> = FxHashMap::default();

    // Parameters are latent sources: tracked so summaries can report
    // param→sink reachability, but they only become flows when a caller
    // passes tainted data.
    for param in parameters {
        tainted.insert(
            param.clone(),
            TaintedName {
                trail: Vec::new(),
                label: "parameter".to_string(),
                cleared_cwes: FxHashSet::default(),
            },
        );
    }

    walk(registry, file, function_name, body, &mut tainted, &mut result);
    result
}

fn walk(
    registry: &TaintRegistry,
    file: &str,
    function: &str,
    node: &GastNode,
    tainted: &mut FxHashMap<String, TaintedName>,
    result: &mut IntraproceduralResult,
) {
    match &node.kind {
        GastKind::Assignment | GastKind::VariableDecl => {
            handle_assignment(registry, file, function, node, tainted);
        }
        GastKind::Call | GastKind::MethodCall | GastKind::New => {
            handle_call(registry, file, function, node, tainted, result);
        }
        _ => {}
    }

    for child in &node.children {
        walk(registry, file, function, child, tainted, result);
    }
}

/// `target = expr`: target becomes tainted when expr references a source
/// or an already-tainted name. The assignment itself is a propagator step.
fn handle_assignment(
    registry: &TaintRegistry,
    file: &str,
    function: &str,
    node: &GastNode,
    tainted: &mut FxHashMap<String, TaintedName>,
) {
    let Some(target) = assignment_target(node) else {
        return;
    };
    let line = node.range.start_line;

    // Direct source reference in the right-hand side.
    if let Some((source_text, entry)) = find_source_text(registry, node) {
        let mut trail = vec![TaintStep {
            file: file.to_string(),
            function: function.to_string(),
            line,
            role: TaintRole::Source,
            snippet: source_text,
        }];
        trail.push(propagator_step(file, function, line, &target));
        tainted.insert(
            target,
            TaintedName {
                trail,
                label: entry.taint_label.clone(),
                cleared_cwes: FxHashSet::default(),
            },
        );
        return;
    }

    // Propagation from an existing tainted name.
    if let Some(carrier) = referenced_tainted_name(node, tainted) {
        let existing = &tainted[&carrier];
        let mut trail = existing.trail.clone();
        let label = existing.label.clone();
        let mut cleared = existing.cleared_cwes.clone();

        // A sanitizer call in the RHS clears its CWEs for the new value.
        if let Some(sanitizer) = find_sanitizer(registry, node) {
            trail.push(TaintStep {
                file: file.to_string(),
                function: function.to_string(),
                line,
                role: TaintRole::Sanitizer,
                snippet: sanitizer.pattern.clone(),
            });
            cleared.extend(sanitizer.clears_cwes.iter().copied());
        } else {
            trail.push(propagator_step(file, function, line, &target));
        }

        tainted.insert(
            target,
            TaintedName {
                trail,
                label,
                cleared_cwes: cleared,
            },
        );
    }
}

fn handle_call(
    registry: &TaintRegistry,
    file: &str,
    function: &str,
    node: &GastNode,
    tainted: &mut FxHashMap<String, TaintedName>,
    result: &mut IntraproceduralResult,
) {
    let Some(callee) = node.text.as_deref() else {
        return;
    };
    let line = node.range.start_line;

    // Sink: close a flow for each tainted argument that is not cleared
    // for this sink's CWE.
    if let Some(sink) = registry.match_sink(callee) {
        for (argument_index, name) in tainted_arguments(node, tainted) {
            let entry = &tainted[&name];
            if entry.cleared_cwes.contains(&sink.cwe) {
                continue; // sanitized for exactly this weakness class
            }

            if entry.trail.is_empty() {
                // Parameter-seeded taint: no in-function source, so this
                // is summary material, not a complete flow.
                result.param_sinks.push((name.clone(), sink.cwe));
                let _ = argument_index;
                continue;
            }

            let mut steps = entry.trail.clone();
            steps.push(TaintStep {
                file: file.to_string(),
                function: function.to_string(),
                line,
                role: TaintRole::Sink,
                snippet: callee.to_string(),
            });
            result.flows.push(TaintFlow {
                steps,
                cwe: sink.cwe,
                severity: FlowSeverity::for_cwe(sink.cwe),
            });
        }
        return;
    }

    // Sanitizer applied in statement position: clears its CWEs on every
    // tainted argument.
    if let Some(sanitizer) = registry.match_sanitizer(callee) {
        let cleared: Vec<String> = tainted_arguments(node, tainted)
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        for name in cleared {
            if let Some(entry) = tainted.get_mut(&name) {
                entry.cleared_cwes.extend(sanitizer.clears_cwes.iter().copied());
                entry.trail.push(TaintStep {
                    file: file.to_string(),
                    function: function.to_string(),
                    line,
                    role: TaintRole::Sanitizer,
                    snippet: callee.to_string(),
                });
            }
        }
        return;
    }

    // Ordinary call with tainted arguments: recorded for the
    // interprocedural phase.
    for (argument_index, _) in tainted_arguments(node, tainted) {
        result
            .tainted_calls
            .push((callee.to_string(), argument_index, line));
    }
}

fn propagator_step(file: &str, function: &str, line: u32, target: &str) -> TaintStep {
    TaintStep {
        file: file.to_string(),
        function: function.to_string(),
        line,
        role: TaintRole::Propagator,
        snippet: target.to_string(),
    }
}

/// Assignment target: the declared name or the first identifier child.
fn assignment_target(node: &GastNode) -> Option<String> {
    if let Some(name) = &node.name {
        return Some(name.clone());
    }
    first_identifier(node).map(|text| {
        // `obj.field` targets taint the base object conservatively.
        text.split(['.', '[']).next().unwrap_or(&text).to_string()
    })
}

fn first_identifier(node: &GastNode) -> Option<String> {
    for child in &node.children {
        if matches!(child.kind, GastKind::Identifier | GastKind::MemberAccess) {
            if let Some(text) = &child.text {
                return Some(text.clone());
            }
        }
        if let Some(found) = first_identifier(child) {
            return Some(found);
        }
    }
    None
}

/// First source-matching expression anywhere in the subtree.
fn find_source_text<'r>(
    registry: &'r TaintRegistry,
    node: &GastNode,
) -> Option<(String, &'r super::registry::SourceEntry)> {
    let mut found = None;
    node.walk(&mut |n| {
        if found.is_some() {
            return;
        }
        if let Some(text) = &n.text {
            if let Some(entry) = registry.match_source(text) {
                found = Some((text.clone(), entry));
            }
        }
    });
    found
}

fn find_sanitizer<'r>(
    registry: &'r TaintRegistry,
    node: &GastNode,
) -> Option<&'r super::registry::SanitizerEntry> {
    let mut found = None;
    node.walk(&mut |n| {
        if found.is_some() {
            return;
        }
        if matches!(n.kind, GastKind::Call | GastKind::MethodCall) {
            if let Some(text) = &n.text {
                found = registry.match_sanitizer(text);
            }
        }
    });
    found
}

/// Tainted names referenced in a call's argument subtrees, with the
/// argument index they appear in.
fn tainted_arguments(
    call: &GastNode,
    tainted: &FxHashMap<String, TaintedName>,
) -> Vec<(usize, String)> {
    let mut hits = Vec::new();
    for (index, argument) in call.children.iter().enumerate() {
        argument.walk(&mut |n| {
            if let Some(text) = &n.text {
                let base = text.split(['.', '[', '(']).next().unwrap_or(text);
                if tainted.contains_key(base)
                    && !hits.iter().any(|(i, name): &(usize, String)| {
                        *i == index && name == base
                    })
                {
                    hits.push((index, base.to_string()));
                }
            }
        });
    }
    hits
}

/// Name referenced in an assignment RHS that is already tainted.
fn referenced_tainted_name(
    node: &GastNode,
    tainted: &FxHashMap<String, TaintedName>,
) -> Option<String> {
    let target = assignment_target(node);
    let mut found = None;
    node.walk(&mut |n| {
        if found.is_some() {
            return;
        }
        if let Some(text) = &n.text {
            let base = text.split(['.', '[', '(']).next().unwrap_or(text);
            if Some(base.to_string()) != target && tainted.contains_key(base) {
                found = Some(base.to_string());
            }
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserManager;
    use crate::scanner::Language;

    fn analyze(source: &str) -> Vec<IntraproceduralResult> {
        let manager = ParserManager::new(1, None);
        let (parse, gast) = manager
            .parse_with_gast("handler.js", source.as_bytes(), Language::JavaScript, 1, None)
            .unwrap();
        let registry = TaintRegistry::builtin();

        parse
            .functions
            .iter()
            .map(|f| {
                let params: Vec<String> =
                    f.parameters.iter().map(|p| p.name.clone()).collect();
                // The function's GAST subtree: find by matching range.
                let mut body = None;
                gast.walk(&mut |n| {
                    if body.is_none()
                        && matches!(n.kind, GastKind::Function | GastKind::Method)
                        && n.range.start_line == f.range.start_line
                    {
                        body = Some(n.clone());
                    }
                });
                analyze_function(
                    &registry,
                    "handler.js",
                    &f.qualified_name,
                    &params,
                    &body.unwrap_or_else(|| gast.clone()),
                )
            })
            .collect()
    }

    #[test]
    fn source_concat_sink_produces_flow() {
        let results = analyze(
            r#"
function getUser(req, res) {
    const id = req.query.id;
    const sql = "SELECT * FROM users WHERE id = " + id;
    db.query(sql);
}
"#,
        );
        let flows: Vec<&TaintFlow> = results.iter().flat_map(|r| &r.flows).collect();
        assert_eq!(flows.len(), 1, "expected exactly one SQLi flow");
        let flow = flows[0];
        assert_eq!(flow.cwe, 89);
        assert!(flow.severity >= FlowSeverity::High);
        assert!(flow.is_well_formed());
        // Source → propagator(s) → sink.
        assert_eq!(flow.steps.first().unwrap().role, TaintRole::Source);
        assert!(flow.steps.iter().any(|s| s.role == TaintRole::Propagator));
        assert_eq!(flow.steps.last().unwrap().role, TaintRole::Sink);
    }

    #[test]
    fn sanitizer_clears_matching_cwe() {
        let results = analyze(
            r#"
function getUser(req, res) {
    const id = req.query.id;
    const safe = parameterize(id);
    db.query(safe);
}
"#,
        );
        let flows: Vec<&TaintFlow> = results.iter().flat_map(|r| &r.flows).collect();
        assert!(flows.is_empty(), "parameterized query must not flow");
    }

    #[test]
    fn wrong_class_sanitizer_does_not_clear() {
        // escapeHtml clears XSS (79), not SQLi (89).
        let results = analyze(
            r#"
function getUser(req, res) {
    const id = req.query.id;
    const escaped = escapeHtml(id);
    db.query(escaped);
}
"#,
        );
        let flows: Vec<&TaintFlow> = results.iter().flat_map(|r| &r.flows).collect();
        assert_eq!(flows.len(), 1, "HTML escaping must not clear a SQL sink");
    }

    #[test]
    fn parameter_to_sink_becomes_summary_material() {
        let results = analyze(
            r#"
function runQuery(sql) {
    db.query(sql);
}
"#,
        );
        let run_query = results
            .iter()
            .find(|r| r.function == "runQuery")
            .unwrap();
        assert!(run_query.flows.is_empty());
        assert!(run_query
            .param_sinks
            .iter()
            .any(|(name, cwe)| name == "sql" && *cwe == 89));
    }
}
