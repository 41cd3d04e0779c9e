//! Aggregation types and the invariants they carry.

use drift_core::types::collections::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::engine::PatternCategory;

/// One deduplicated location of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub confidence: f64,
    pub is_outlier: bool,
    pub snippet: Option<String>,
}

impl PatternLocation {
    /// Dedup key within a pattern.
    pub fn site_key(&self) -> (String, u32, u32) {
        (self.file.clone(), self.line, self.column)
    }
}

/// A pattern merged across files.
///
/// Invariant: `occurrences == locations.len()` and `file_spread` equals the
/// distinct file count - `reconcile` restores both after any mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedPattern {
    pub pattern_id: String,
    pub detector_id: String,
    pub category: PatternCategory,
    pub locations: Vec<PatternLocation>,
    pub occurrences: u32,
    pub file_spread: u32,
    pub outlier_count: u32,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    /// Ids of patterns auto-merged into this one; their names survive here.
    pub aliases: Vec<String>,
    /// Dirty flag for incremental re-aggregation.
    pub needs_rescore: bool,
}

impl AggregatedPattern {
    pub fn new(pattern_id: String, detector_id: String, category: PatternCategory) -> Self {
        Self {
            pattern_id,
            detector_id,
            category,
            locations: Vec::new(),
            occurrences: 0,
            file_spread: 0,
            outlier_count: 0,
            parent_id: None,
            children: Vec::new(),
            aliases: Vec::new(),
            needs_rescore: true,
        }
    }

    /// Restore the counter invariants from the location list.
    pub fn reconcile(&mut self) {
        self.occurrences = self.locations.len() as u32;
        let files: FxHashSet<&str> = self.locations.iter().map(|l| l.file.as_str()).collect();
        self.file_spread = files.len() as u32;
        self.outlier_count = self.locations.iter().filter(|l| l.is_outlier).count() as u32;
    }

    /// Per-file occurrence counts, the sample outlier detection runs on.
    pub fn per_file_counts(&self) -> Vec<(String, u32)> {
        let mut counts: Vec<(String, u32)> = Vec::new();
        for location in &self.locations {
            match counts.iter_mut().find(|(file, _)| file == &location.file) {
                Some((_, count)) => *count += 1,
                None => counts.push((location.file.clone(), 1)),
            }
        }
        counts.sort();
        counts
    }

    pub fn mean_confidence(&self) -> f64 {
        if self.locations.is_empty() {
            return 0.0;
        }
        self.locations.iter().map(|l| l.confidence).sum::<f64>() / self.locations.len() as f64
    }
}

/// Aggregation thresholds.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Jaccard similarity that flags a merge candidate.
    pub flag_threshold: f64,
    /// Jaccard similarity that auto-merges, preserving aliases.
    pub auto_merge_threshold: f64,
    /// Population size above which exact pairwise gives way to MinHash LSH.
    pub minhash_population: usize,
    /// Location coverage required for a hierarchy parent link.
    pub hierarchy_coverage: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            flag_threshold: 0.85,
            auto_merge_threshold: 0.95,
            minhash_population: 50_000,
            hierarchy_coverage: 0.90,
        }
    }
}
