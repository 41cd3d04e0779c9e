//! The aggregation pipeline: seven phases, idempotent and restartable.
//!
//! 1. group by pattern id, 2. merge cross-file, 3. pairwise Jaccard,
//! 4. MinHash LSH above the population threshold, 5. hierarchy,
//! 6. counter reconciliation, 7. gold-refresh scheduling (the caller
//! receives the dirty-domain set to hand to the store).

use drift_core::errors::DetectionError;
use drift_core::types::collections::{FxHashMap, FxHashSet};

use crate::engine::{PatternCategory, PatternMatch};

use super::grouper::group_matches;
use super::hierarchy::build_hierarchy;
use super::incremental::{affected_patterns, remove_stale_locations};
use super::similarity::{find_candidates, location_keys, MergeCandidate, MergeDecision, MinHashIndex};
use super::types::{AggregatedPattern, AggregationConfig};

pub struct AggregationPipeline {
    config: AggregationConfig,
}

#[derive(Debug)]
pub struct AggregationResult {
    pub patterns: Vec<AggregatedPattern>,
    pub merge_candidates: Vec<MergeCandidate>,
    pub diagnostics: AggregationDiagnostics,
}

impl AggregationPipeline {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AggregationConfig::default())
    }

    /// Full aggregation over every match of a scan.
    pub fn run(&self, matches: &[PatternMatch]) -> Result<AggregationResult, DetectionError> {
        let mut grouped = group_matches(matches);
        self.finish(&mut grouped, matches.len())
    }

    /// Incremental aggregation: stale locations from changed files are
    /// dropped, fresh matches merged in, and only dirty patterns compete
    /// in similarity detection.
    pub fn run_incremental(
        &self,
        fresh_matches: &[PatternMatch],
        existing: Vec<AggregatedPattern>,
        changed_files: &FxHashSet<String>,
    ) -> Result<AggregationResult, DetectionError> {
        let affected = affected_patterns(existing.iter(), changed_files);

        let mut patterns: FxHashMap<String, AggregatedPattern> = existing
            .into_iter()
            .map(|p| (p.pattern_id.clone(), p))
            .collect();

        for pattern in patterns.values_mut() {
            if affected.contains(&pattern.pattern_id) {
                remove_stale_locations(pattern, changed_files);
            }
        }

        let fresh: Vec<PatternMatch> = fresh_matches
            .iter()
            .filter(|m| changed_files.contains(&m.file))
            .cloned()
            .collect();
        for (id, incoming) in group_matches(&fresh) {
            match patterns.get_mut(&id) {
                Some(existing) => {
                    for location in incoming.locations {
                        let key = location.site_key();
                        if !existing.locations.iter().any(|l| l.site_key() == key) {
                            existing.locations.push(location);
                        }
                    }
                    existing.needs_rescore = true;
                    existing.reconcile();
                }
                None => {
                    patterns.insert(id, incoming);
                }
            }
        }

        self.finish(&mut patterns, fresh_matches.len())
    }

    fn finish(
        &self,
        patterns: &mut FxHashMap<String, AggregatedPattern>,
        raw_match_count: usize,
    ) -> Result<AggregationResult, DetectionError> {
        // Phases 3–4: duplicate detection, exact or MinHash by population.
        let refs: Vec<&AggregatedPattern> = patterns.values().collect();
        let candidates = if refs.len() > self.config.minhash_population {
            self.minhash_candidates(&refs)
        } else {
            find_candidates(
                &refs,
                self.config.flag_threshold,
                self.config.auto_merge_threshold,
            )
        };

        // Phase 5: merge + hierarchy.
        build_hierarchy(patterns, &candidates, self.config.hierarchy_coverage);

        // Phase 6: reconcile and verify the counter invariant.
        for pattern in patterns.values_mut() {
            pattern.reconcile();
            if pattern.occurrences as usize != pattern.locations.len() {
                return Err(DetectionError::Inconsistency(format!(
                    "pattern {} counters diverged from locations",
                    pattern.pattern_id
                )));
            }
        }

        let all: Vec<AggregatedPattern> = patterns.drain().map(|(_, p)| p).collect();
        let diagnostics = AggregationDiagnostics::compute(&all, raw_match_count, &candidates);

        Ok(AggregationResult {
            patterns: all,
            merge_candidates: candidates,
            diagnostics,
        })
    }

    fn minhash_candidates(&self, patterns: &[&AggregatedPattern]) -> Vec<MergeCandidate> {
        let mut index = MinHashIndex::new(128, 16);
        let by_id: FxHashMap<&str, &AggregatedPattern> =
            patterns.iter().map(|p| (p.pattern_id.as_str(), *p)).collect();

        for pattern in patterns {
            index.insert(&pattern.pattern_id, &location_keys(pattern));
        }

        let mut candidates = Vec::new();
        for (a, b) in index.candidate_pairs() {
            let Some(similarity) = index.estimate(&a, &b) else {
                continue;
            };
            if similarity < self.config.flag_threshold {
                continue;
            }
            let (pa, pb) = (by_id[a.as_str()], by_id[b.as_str()]);
            if pa.category != pb.category {
                continue;
            }
            let (keep, merge) = if pa.occurrences >= pb.occurrences {
                (a, b)
            } else {
                (b, a)
            };
            candidates.push(MergeCandidate {
                keep,
                merge,
                similarity,
                decision: if similarity >= self.config.auto_merge_threshold {
                    MergeDecision::AutoMerge
                } else {
                    MergeDecision::Flag
                },
            });
        }
        candidates
    }
}

#[derive(Debug, Clone)]
pub struct AggregationDiagnostics {
    pub total_patterns: usize,
    pub total_locations: usize,
    pub merge_candidates: usize,
    pub per_category: FxHashMap<PatternCategory, usize>,
    pub single_file_patterns: usize,
    pub dedup_ratio: f64,
    /// More than 90% of patterns living in one file suggests detector ids
    /// are over-specific.
    pub single_file_warning: bool,
    /// Dedup under 5% on a non-trivial corpus suggests dedup isn't firing.
    pub low_dedup_warning: bool,
}

impl AggregationDiagnostics {
    fn compute(
        patterns: &[AggregatedPattern],
        raw_match_count: usize,
        candidates: &[MergeCandidate],
    ) -> Self {
        let total_patterns = patterns.len();
        let total_locations: usize = patterns.iter().map(|p| p.locations.len()).sum();
        let single_file_patterns = patterns.iter().filter(|p| p.file_spread <= 1).count();

        let mut per_category: FxHashMap<PatternCategory, usize> = FxHashMap::default();
        for pattern in patterns {
            *per_category.entry(pattern.category).or_insert(0) += 1;
        }

        let dedup_ratio = if raw_match_count > 0 {
            1.0 - (total_locations as f64 / raw_match_count as f64)
        } else {
            0.0
        };

        Self {
            total_patterns,
            total_locations,
            merge_candidates: candidates.len(),
            per_category,
            single_file_patterns,
            dedup_ratio,
            single_file_warning: total_patterns > 0
                && single_file_patterns as f64 / total_patterns as f64 > 0.9,
            low_dedup_warning: raw_match_count > 10 && dedup_ratio < 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;

    fn m(pattern: &str, file: &str, line: u32) -> PatternMatch {
        PatternMatch {
            pattern_id: pattern.to_string(),
            detector_id: "d".to_string(),
            category: PatternCategory::Structural,
            file: file.to_string(),
            line,
            column: 0,
            confidence: 0.8,
            snippet: None,
        }
    }

    #[test]
    fn aggregate_twice_is_idempotent() {
        let matches = vec![m("p1", "a.ts", 1), m("p1", "b.ts", 2), m("p2", "a.ts", 3)];
        let pipeline = AggregationPipeline::with_defaults();

        let first = pipeline.run(&matches).unwrap();
        let again = pipeline
            .run_incremental(&matches, first.patterns.clone(), &FxHashSet::default())
            .unwrap();

        let mut a: Vec<(String, u32)> = first
            .patterns
            .iter()
            .map(|p| (p.pattern_id.clone(), p.occurrences))
            .collect();
        let mut b: Vec<(String, u32)> = again
            .patterns
            .iter()
            .map(|p| (p.pattern_id.clone(), p.occurrences))
            .collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn incremental_only_touches_changed_files() {
        let pipeline = AggregationPipeline::with_defaults();
        let initial = vec![m("p1", "a.ts", 1), m("p1", "b.ts", 2)];
        let first = pipeline.run(&initial).unwrap();

        // a.ts changed: its line moved.
        let fresh = vec![m("p1", "a.ts", 5)];
        let changed: FxHashSet<String> = ["a.ts".to_string()].into_iter().collect();
        let second = pipeline
            .run_incremental(&fresh, first.patterns, &changed)
            .unwrap();

        let p1 = second
            .patterns
            .iter()
            .find(|p| p.pattern_id == "p1")
            .unwrap();
        assert_eq!(p1.occurrences, 2);
        assert!(p1.locations.iter().any(|l| l.file == "b.ts" && l.line == 2));
        assert!(p1.locations.iter().any(|l| l.file == "a.ts" && l.line == 5));
        assert!(!p1.locations.iter().any(|l| l.file == "a.ts" && l.line == 1));
    }
}
