//! Derivation stages of a scan. Base-table rows for changed files flow
//! through the batch channel; pattern/confidence/convention rows go through
//! the writer directly since they are whole-table reconciliations.

use std::path::Path;
use std::sync::Arc;

use drift_core::config::DriftConfig;
use drift_core::errors::PipelineError;
use drift_core::events::{
    ConventionLearned, EngineError, EventDispatcher, PatternApproved, PatternDiscovered,
    ViolationDetected,
};
use drift_core::types::collections::{FxHashMap, FxHashSet};
use drift_core::CancellationToken;
use drift_storage::queries::{patterns as pattern_queries, scan_history, violations as violation_queries};
use drift_storage::{BatchCommand, BatchSender, Store};
use rayon::prelude::*;

use crate::boundaries::BoundaryAnalyzer;
use crate::call_graph::{CallEdgeData, CallGraph, FunctionNode};
use crate::detectors::DetectorRegistry;
use crate::engine::{DetectionEngine, PatternMatch, TomlRuleSet};
use crate::gast::{GastKind, GastNode};
use crate::graph::taint::{
    analyze_function, propagate_summaries, IntraproceduralResult, TaintRegistry,
};
use crate::parsers::{ParseResult, ParserManager};
use crate::patterns::aggregation::{AggregatedPattern, AggregationPipeline};
use crate::patterns::confidence::{ConfidenceScorer, MomentumTracker, ScorerConfig};
use crate::patterns::learning::{
    apply_promotions, relearn_mode, ConventionLearner, ConventionStatus, RelearnMode,
};
use crate::patterns::outliers::{outliers_to_violations, OutlierDetector};
use crate::resolution::{ResolutionDiagnostics, ResolutionIndex};
use crate::scanner::{Language, ScanDiff};

/// One parsed, normalized file ready for detection.
pub struct FileAnalysis {
    pub file: String,
    pub language: Language,
    pub parse: ParseResult,
    pub gast: GastNode,
}

#[derive(Debug, Default)]
pub struct DerivationOutcome {
    pub pattern_count: usize,
    pub violation_count: usize,
    pub taint_flow_count: usize,
    pub convention_count: usize,
    pub resolution: ResolutionDiagnostics,
    /// Aggregated patterns, persisted after the batch writer drains so
    /// their location rows never race the file rows they reference.
    pub patterns: Vec<AggregatedPattern>,
    pub total_files: u64,
    /// L3 invalidation decision for this scan's delta.
    pub relearn: RelearnMode,
}

/// Stage 2: persist the scan diff. Deleted files cascade; modified files
/// purge their derived rows ahead of re-insertion; unchanged files write
/// nothing.
pub fn persist_diff(sender: &BatchSender, diff: &ScanDiff) -> Result<(), PipelineError> {
    for path in &diff.deleted {
        sender.send(BatchCommand::DeleteFile {
            path: path.to_string_lossy().into_owned(),
        })?;
    }
    for path in &diff.modified {
        sender.send(BatchCommand::PurgeFileDerived {
            path: path.to_string_lossy().into_owned(),
        })?;
    }
    for path in diff.dirty_files() {
        let Some(entry) = diff.entries.get(path) else {
            continue;
        };
        sender.send(BatchCommand::UpsertFile {
            path: path.to_string_lossy().into_owned(),
            content_hash: entry.content_hash,
            size: entry.size,
            language: entry.language.map(|l| l.name().to_string()),
            mtime_secs: entry.mtime_secs,
            mtime_nanos: entry.mtime_nanos,
            scan_error: entry.scan_error.clone(),
        })?;
    }
    Ok(())
}

/// Stages 3+: parse, detect, resolve, analyze, aggregate, score, learn.
#[allow(clippy::too_many_arguments)]
pub fn run_derivation(
    store: &Arc<Store>,
    config: &DriftConfig,
    events: &EventDispatcher,
    cancel: &CancellationToken,
    sender: &BatchSender,
    root: &Path,
    diff: &ScanDiff,
    scan_id: i64,
) -> Result<DerivationOutcome, PipelineError> {
    let dirty: FxHashSet<String> = diff
        .dirty_files()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    // Stage 3: parse every live file. Unchanged files come out of the
    // parse cache; only fresh parses hit tree-sitter.
    let analyses = parse_all(store, config, events, cancel, sender, root, diff);
    if cancel.is_cancelled() {
        return Ok(DerivationOutcome::default());
    }

    // Stage 4: learning passes, then single-pass detection per file.
    let registry = Arc::new(DetectorRegistry::with_defaults());
    let parses: Vec<ParseResult> = analyses.iter().map(|a| a.parse.clone()).collect();
    registry.learn_all(&parses);
    for file in &dirty {
        registry.notify_file_change(file);
    }
    let boundary_analyzer = BoundaryAnalyzer::learn(&parses);

    let toml_rules = load_toml_rules(config, root, events);
    let engine = DetectionEngine::new(registry, toml_rules);

    let matches: Vec<PatternMatch> = analyses
        .par_iter()
        .flat_map_iter(|analysis| {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            engine.run_file(
                &analysis.file,
                analysis.language,
                &analysis.parse,
                &analysis.gast,
            )
        })
        .collect();

    // Detection rows are file-owned: only dirty files re-ingest.
    for m in matches.iter().filter(|m| dirty.contains(&m.file)) {
        sender.send(BatchCommand::InsertDetection {
            scan_id,
            file: m.file.clone(),
            line: m.line,
            column: m.column,
            pattern_id: m.pattern_id.clone(),
            detector_id: m.detector_id.clone(),
            category: m.category.name().to_string(),
            confidence: m.confidence,
            snippet: m.snippet.clone(),
        })?;
    }

    // Stage 5: boundaries on dirty files.
    for analysis in analyses.iter().filter(|a| dirty.contains(&a.file)) {
        for boundary in boundary_analyzer.detect(&analysis.parse) {
            for field in boundary_analyzer.classify_fields(&boundary) {
                sender.send(BatchCommand::InsertSensitiveField {
                    file: field.file.clone(),
                    line: field.line,
                    field_name: field.field,
                    table_name: field.table,
                    sensitivity: field.class.name().to_string(),
                    confidence: field.confidence,
                })?;
            }
            sender.send(BatchCommand::InsertBoundary {
                scan_id,
                file: boundary.file.clone(),
                line: boundary.line,
                framework: boundary.framework.name().to_string(),
                table_name: boundary.table,
                operation: boundary.operation.name().to_string(),
                fields_json: serde_json::to_string(&boundary.fields).unwrap_or_else(|_| "[]".into()),
                confidence: boundary.confidence,
            })?;
        }
    }

    // Stage 6: resolution index + call graph.
    let index = ResolutionIndex::new();
    for analysis in &analyses {
        index.add_file(&analysis.parse);
    }
    let snapshot = index.seal();

    let mut graph = CallGraph::new();
    let mut diagnostics = ResolutionDiagnostics::default();
    build_call_graph(
        &analyses,
        &snapshot,
        config.analysis.fuzzy_similarity_threshold,
        &mut graph,
        &mut diagnostics,
    );
    for warning in diagnostics.low_resolution_languages() {
        tracing::warn!(language = %warning, "low call resolution rate");
    }

    persist_graph(sender, &analyses, &graph, &dirty, scan_id)?;

    // Stage 7: taint, intraprocedural then interprocedural.
    let taint_registry = TaintRegistry::load(Some(
        &root.join(&config.analysis.taint_registry_file),
    ))
    .map_err(PipelineError::Taint)?;
    let flow_count = run_taint(
        sender,
        &taint_registry,
        &analyses,
        &graph,
        &dirty,
        scan_id,
        cancel,
    )?;

    // Stage 8: aggregation over every match of the scan.
    let aggregation = AggregationPipeline::with_defaults()
        .run(&matches)
        .map_err(PipelineError::Detection)?;
    let mut patterns = aggregation.patterns;

    // Stage 9: outliers, marked back onto pattern locations.
    let known_fingerprints = store.with_reader(violation_queries::known_fingerprints)?;
    let mut violation_count = 0usize;
    let mut all_violations = Vec::new();
    for pattern in &mut patterns {
        let sample: Vec<f64> = pattern
            .per_file_counts()
            .iter()
            .map(|(_, count)| f64::from(*count))
            .collect();
        if sample.len() < 2 {
            continue;
        }
        let (_, findings) = OutlierDetector::detect(&sample);
        let per_file = pattern.per_file_counts();
        for finding in &findings {
            if let Some((file, _)) = per_file.get(finding.index) {
                for location in pattern.locations.iter_mut().filter(|l| &l.file == file) {
                    location.is_outlier = true;
                }
            }
        }
        pattern.reconcile();
        all_violations.extend(outliers_to_violations(pattern, &findings, &known_fingerprints));
    }

    for violation in &all_violations {
        // Unchanged files keep their persisted violations; re-ingesting
        // them would duplicate rows.
        if !dirty.contains(&violation.file) && !violation.is_new {
            continue;
        }
        sender.send(BatchCommand::InsertViolation {
            scan_id,
            file: violation.file.clone(),
            line: violation.line,
            column: violation.column,
            pattern_id: violation.pattern_id.clone(),
            severity: violation.severity.name().to_string(),
            message: violation.message.clone(),
            fingerprint: violation.fingerprint.clone(),
            is_new: violation.is_new,
            cwe_id: violation.cwe_id,
        })?;
        violation_count += 1;
        events.violation_detected(&ViolationDetected {
            violation_id: violation.fingerprint.clone(),
            pattern_id: violation.pattern_id.clone(),
            file: violation.file.clone(),
            line: violation.line,
            severity: violation.severity.name().to_string(),
        });
    }

    // L3 invalidation: past the changed-file fraction, incremental
    // learning loses its statistical footing.
    let relearn = relearn_mode(
        dirty.len() + diff.deleted.len(),
        diff.entries.len().max(1),
        config.learning.full_relearn_fraction,
    );

    Ok(DerivationOutcome {
        pattern_count: patterns.len(),
        violation_count,
        taint_flow_count: flow_count,
        convention_count: 0,
        resolution: diagnostics,
        patterns,
        total_files: diff.entries.len() as u64,
        relearn,
    })
}

/// Stages 10–11, run after the batch writer has drained: persist
/// aggregated patterns, score confidence, learn conventions. Returns the
/// convention count.
pub fn persist_intelligence(
    store: &Arc<Store>,
    config: &DriftConfig,
    events: &EventDispatcher,
    patterns: &[AggregatedPattern],
    total_files: u64,
    scan_id: i64,
    relearn: RelearnMode,
) -> Result<usize, PipelineError> {
    persist_patterns(store, patterns)?;
    score_confidence(store, patterns, total_files, scan_id)?;
    learn_conventions(store, config, events, patterns, total_files, scan_id, relearn)
}

fn parse_all(
    store: &Arc<Store>,
    config: &DriftConfig,
    events: &EventDispatcher,
    cancel: &CancellationToken,
    sender: &BatchSender,
    root: &Path,
    diff: &ScanDiff,
) -> Vec<FileAnalysis> {
    let threads = if config.scan.threads > 0 {
        config.scan.threads
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    };
    let manager = ParserManager::new(threads, Some(store.clone()));

    let entries: Vec<_> = diff
        .entries
        .values()
        .filter(|entry| entry.language.is_some() && entry.scan_error.is_none())
        .collect();

    entries
        .par_iter()
        .filter_map(|entry| {
            if cancel.is_cancelled() {
                return None;
            }
            let language = entry.language?;
            let file = entry.path.to_string_lossy().into_owned();
            let source = match std::fs::read(root.join(&entry.path)) {
                Ok(bytes) => bytes,
                Err(err) => {
                    events.error(&EngineError {
                        message: err.to_string(),
                        file: Some(file.clone()),
                    });
                    return None;
                }
            };

            match manager.parse_with_gast(
                &file,
                &source,
                language,
                entry.content_hash,
                Some(sender),
            ) {
                Ok((parse, gast)) => Some(FileAnalysis {
                    file,
                    language,
                    parse,
                    gast,
                }),
                Err(err) => {
                    // Per-file parser errors never abort the scan.
                    events.error(&EngineError {
                        message: err.to_string(),
                        file: Some(file),
                    });
                    None
                }
            }
        })
        .collect()
}

fn load_toml_rules(
    config: &DriftConfig,
    root: &Path,
    events: &EventDispatcher,
) -> TomlRuleSet {
    let path = root.join(&config.analysis.patterns_file);
    if !path.exists() {
        return TomlRuleSet::default();
    }
    match TomlRuleSet::load_file(&path) {
        Ok(rules) => rules,
        Err(err) => {
            // Malformed pattern files are fatal to the load, not the scan.
            events.error(&EngineError {
                message: err.to_string(),
                file: Some(path.to_string_lossy().into_owned()),
            });
            TomlRuleSet::default()
        }
    }
}

fn build_call_graph(
    analyses: &[FileAnalysis],
    snapshot: &crate::resolution::ResolutionSnapshot,
    fuzzy_threshold: f64,
    graph: &mut CallGraph,
    diagnostics: &mut ResolutionDiagnostics,
) {
    use crate::detectors::flags;

    for analysis in analyses {
        for function in &analysis.parse.functions {
            graph.add_function(FunctionNode {
                file: analysis.file.clone(),
                qualified_name: function.qualified_name.clone(),
                name: function.name.clone(),
                body_hash: function.body_hash,
                start_line: function.start_line,
                end_line: function.end_line,
                is_entry_point: flags::is_entry_point(function),
                is_test: flags::is_test(function, &analysis.parse),
                is_exported: function.is_exported,
            });
        }
    }

    for analysis in analyses {
        for call in &analysis.parse.call_sites {
            let Some(caller) = &call.caller else {
                continue;
            };
            let caller_key = format!("{}::{}", analysis.file, caller);
            let Some(caller_idx) = graph.node(&caller_key) else {
                continue;
            };

            let resolved = snapshot.resolve(call, &analysis.file, fuzzy_threshold);
            diagnostics.record(Some(analysis.language), resolved.as_ref().map(|r| r.strategy));

            if let Some(resolved) = resolved {
                if let Some(callee_idx) = graph.node(&resolved.callee.node_id()) {
                    graph.add_edge(
                        caller_idx,
                        callee_idx,
                        CallEdgeData {
                            resolution: resolved.strategy,
                            confidence: resolved.strategy.confidence(),
                            call_line: call.line,
                        },
                    );
                }
            }
        }
    }
}

fn persist_graph(
    sender: &BatchSender,
    analyses: &[FileAnalysis],
    graph: &CallGraph,
    dirty: &FxHashSet<String>,
    _scan_id: i64,
) -> Result<(), PipelineError> {
    use crate::detectors::flags;
    use petgraph::visit::EdgeRef;
    use petgraph::Direction;

    for analysis in analyses.iter().filter(|a| dirty.contains(&a.file)) {
        for function in &analysis.parse.functions {
            sender.send(BatchCommand::InsertFunction {
                file: analysis.file.clone(),
                name: function.name.clone(),
                qualified_name: function.qualified_name.clone(),
                signature: Some(function.signature.clone()),
                body_hash: function.body_hash,
                start_line: function.start_line,
                end_line: function.end_line,
                is_entry_point: flags::is_entry_point(function),
                is_injectable: flags::is_injectable(function, &analysis.parse),
                is_auth_handler: flags::is_auth_handler_fn(function),
                is_test: flags::is_test(function, &analysis.parse),
                is_data_accessor: flags::is_data_accessor(function, &analysis.parse),
            })?;
        }
    }

    // Edges are owned by the caller's file.
    for node in graph.all_nodes() {
        let Some(caller) = graph.weight(node) else {
            continue;
        };
        if !dirty.contains(&caller.file) {
            continue;
        }
        for edge_ref in graph.graph.edges_directed(node, Direction::Outgoing) {
            let Some(callee) = graph.weight(edge_ref.target()) else {
                continue;
            };
            let edge = edge_ref.weight();
            sender.send(BatchCommand::InsertCallEdge {
                caller_file: caller.file.clone(),
                caller_qualified: caller.qualified_name.clone(),
                callee_file: Some(callee.file.clone()),
                callee_qualified: Some(callee.qualified_name.clone()),
                resolution: edge.resolution.name().to_string(),
                confidence: edge.confidence,
                call_line: edge.call_line,
            })?;
        }
    }
    Ok(())
}

fn run_taint(
    sender: &BatchSender,
    registry: &TaintRegistry,
    analyses: &[FileAnalysis],
    graph: &CallGraph,
    dirty: &FxHashSet<String>,
    scan_id: i64,
    cancel: &CancellationToken,
) -> Result<usize, PipelineError> {
    // Phase 1: intraprocedural, parallel across functions.
    let intra: Vec<IntraproceduralResult> = analyses
        .par_iter()
        .flat_map_iter(|analysis| {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            analysis
                .parse
                .functions
                .iter()
                .filter_map(|function| {
                    let body = function_subtree(&analysis.gast, function.start_line)?;
                    let params: Vec<String> =
                        function.parameters.iter().map(|p| p.name.clone()).collect();
                    Some(analyze_function(
                        registry,
                        &analysis.file,
                        &function.qualified_name,
                        &params,
                        body,
                    ))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let intra_by_name: FxHashMap<String, IntraproceduralResult> = intra
        .iter()
        .map(|result| (result.function.clone(), result.clone()))
        .collect();

    // Phase 2: summaries to fixed point along the call graph.
    let (_, cross_flows) = propagate_summaries(graph, &intra_by_name);

    let mut count = 0usize;
    let all_flows = intra
        .iter()
        .flat_map(|result| result.flows.iter().cloned())
        .chain(cross_flows);

    for flow in all_flows {
        let Some(source) = flow.steps.first() else {
            continue;
        };
        if !dirty.contains(&source.file) {
            continue; // unchanged files keep their persisted flows
        }
        sender.send(BatchCommand::InsertTaintFlow {
            scan_id,
            file: source.file.clone(),
            cwe_id: flow.cwe,
            severity: flow.severity.name().to_string(),
            steps_json: serde_json::to_string(&flow.steps).unwrap_or_else(|_| "[]".into()),
        })?;
        count += 1;
    }
    Ok(count)
}

/// The GAST subtree of the function starting at `line`.
fn function_subtree(gast: &GastNode, line: u32) -> Option<&GastNode> {
    let mut found = None;
    find_function(gast, line, &mut found);
    found
}

fn find_function<'g>(node: &'g GastNode, line: u32, found: &mut Option<&'g GastNode>) {
    if found.is_some() {
        return;
    }
    if matches!(
        node.kind,
        GastKind::Function | GastKind::Method | GastKind::Constructor | GastKind::Lambda
    ) && node.range.start_line == line
    {
        *found = Some(node);
        return;
    }
    for child in &node.children {
        find_function(child, line, found);
    }
}

fn persist_patterns(
    store: &Arc<Store>,
    patterns: &[AggregatedPattern],
) -> Result<(), PipelineError> {
    store.with_write_tx(|tx| {
        for pattern in patterns {
            let aliases_json = if pattern.aliases.is_empty() {
                None
            } else {
                serde_json::to_string(&pattern.aliases).ok()
            };
            pattern_queries::upsert(
                tx,
                &pattern.pattern_id,
                pattern.category.name(),
                pattern.occurrences,
                pattern.file_spread,
                pattern.outlier_count,
                pattern.parent_id.as_deref(),
                aliases_json.as_deref(),
            )?;
            let locations: Vec<(String, u32, u32, f64, bool)> = pattern
                .locations
                .iter()
                .map(|l| (l.file.clone(), l.line, l.column, l.confidence, l.is_outlier))
                .collect();
            pattern_queries::replace_locations(tx, &pattern.pattern_id, &locations)?;
        }
        Ok(())
    })?;
    Ok(())
}

fn score_confidence(
    store: &Arc<Store>,
    patterns: &[AggregatedPattern],
    total_files: u64,
    scan_id: i64,
) -> Result<(), PipelineError> {
    let scorer = ConfidenceScorer::new(ScorerConfig {
        total_files: total_files.max(1),
        default_age_days: 7,
    });

    // Momentum from pattern totals across recent scans.
    let history = store.with_reader(|conn| scan_history::recent(conn, 10))?;
    let mut trackers: FxHashMap<String, MomentumTracker> = FxHashMap::default();
    for pattern in patterns {
        let mut tracker = MomentumTracker::new();
        for row in &history {
            // Per-scan totals approximate per-pattern history until the
            // pattern has its own rows in older scans.
            tracker.record(row.pattern_count.min(u64::from(pattern.occurrences)));
        }
        tracker.record(u64::from(pattern.occurrences));
        trackers.insert(pattern.pattern_id.clone(), tracker);
    }

    for pattern in patterns {
        let momentum = trackers
            .get(&pattern.pattern_id)
            .map(|t| t.direction())
            .unwrap_or_default();
        let prior = store
            .with_reader(|conn| pattern_queries::confidence_params(conn, &pattern.pattern_id))?;
        let score = scorer
            .score(pattern, momentum, 7, 0, prior)
            .map_err(PipelineError::Detection)?;

        store.with_writer(|conn| {
            pattern_queries::record_confidence(
                conn,
                &pattern.pattern_id,
                scan_id,
                score.alpha,
                score.beta,
                score.posterior_mean,
                score.credible_interval,
                score.tier.name(),
                score.momentum.name(),
                score.composite,
            )
            .map(|_| ())
        })?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn learn_conventions(
    store: &Arc<Store>,
    config: &DriftConfig,
    events: &EventDispatcher,
    patterns: &[AggregatedPattern],
    total_files: u64,
    _scan_id: i64,
    relearn: RelearnMode,
) -> Result<usize, PipelineError> {
    // Incremental mode only re-discovers genes touched by the delta; a
    // full re-learn sees every pattern.
    let in_scope: Vec<AggregatedPattern> = match relearn {
        RelearnMode::Full => patterns.to_vec(),
        RelearnMode::Incremental => patterns
            .iter()
            .filter(|p| p.needs_rescore)
            .cloned()
            .collect(),
    };

    let scorer = ConfidenceScorer::new(ScorerConfig {
        total_files: total_files.max(1),
        default_age_days: 7,
    });
    let mut scores = FxHashMap::default();
    let mut spreads = FxHashMap::default();
    for pattern in &in_scope {
        let score = scorer
            .score(pattern, Default::default(), 7, 0, None)
            .map_err(PipelineError::Detection)?;
        scores.insert(pattern.pattern_id.clone(), score);
        spreads.insert(pattern.pattern_id.clone(), pattern.file_spread);
    }

    let now = chrono::Utc::now().timestamp();
    let learner = ConventionLearner::new(config.learning.clone());
    let mut conventions = learner.discover(&in_scope, &scores, total_files, now);

    for convention in &conventions {
        events.pattern_discovered(&PatternDiscovered {
            pattern_id: convention.pattern_id.clone(),
            category: convention.category.name().to_string(),
            confidence: convention.dominance,
        });
    }

    let report = apply_promotions(
        &mut conventions,
        &scores,
        &spreads,
        now,
        i64::from(config.learning.expiry_days) * 86_400,
    );
    for id in &report.promoted {
        events.pattern_approved(&PatternApproved {
            pattern_id: id.clone(),
        });
    }

    let count = conventions.len();
    store.with_write_tx(|tx| {
        for convention in &conventions {
            drift_storage::queries::conventions::upsert(
                tx,
                &drift_storage::queries::conventions::ConventionRow {
                    id: convention.id.clone(),
                    pattern_id: convention.pattern_id.clone(),
                    category: convention.category.name().to_string(),
                    scope_kind: convention.scope.kind().to_string(),
                    scope_value: convention.scope.value().map(String::from),
                    dominance: convention.dominance,
                    discovered_at: convention.discovered_at,
                    last_seen: convention.last_seen,
                    status: convention.status.name().to_string(),
                },
            )?;
            if convention.status == ConventionStatus::Discovered
                || convention.status == ConventionStatus::Approved
            {
                events.convention_learned(&ConventionLearned {
                    convention_id: convention.id.clone(),
                    category: convention.category.name().to_string(),
                    dominance: convention.dominance,
                });
            }
        }
        // Conventions whose patterns vanished long ago expire in place.
        drift_storage::queries::conventions::expire_stale(
            tx,
            now,
            i64::from(config.learning.expiry_days) * 86_400,
        )?;
        Ok(())
    })?;

    Ok(count)
}
