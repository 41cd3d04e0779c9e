//! Convention discovery over aggregated patterns and their scores.
//!
//! A gene is a set of competing alternatives for the same regularity (e.g.
//! the naming styles a detector emits as sibling patterns). Discovery
//! gates: occurrences ≥ min, spread ≥ min, dominance ≥ threshold over the
//! gene's alternatives - unless the gene is contested.

use drift_core::config::LearningConfig;
use drift_core::types::collections::FxHashMap;

use crate::patterns::aggregation::AggregatedPattern;
use crate::patterns::confidence::{ConfidenceScore, ConfidenceTier, Momentum};

use super::dirichlet::DirichletMultinomial;
use super::types::{Convention, ConventionCategory, ConventionScope, ConventionStatus};

/// Competing alternatives of one regularity: all patterns sharing a
/// detector id form a gene.
#[derive(Debug)]
pub struct Gene {
    pub detector_id: String,
    pub alternatives: Vec<String>,
    pub distribution: DirichletMultinomial,
}

pub struct ConventionLearner {
    config: LearningConfig,
}

impl ConventionLearner {
    pub fn new(config: LearningConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(LearningConfig::default())
    }

    /// Group patterns into genes by detector id.
    pub fn genes(patterns: &[AggregatedPattern]) -> Vec<Gene> {
        let mut by_detector: FxHashMap<&str, Vec<&AggregatedPattern>> = FxHashMap::default();
        for pattern in patterns {
            by_detector
                .entry(pattern.detector_id.as_str())
                .or_default()
                .push(pattern);
        }

        let mut genes = Vec::new();
        for (detector_id, mut members) in by_detector {
            members.sort_by(|a, b| a.pattern_id.cmp(&b.pattern_id));
            let labels: Vec<String> = members.iter().map(|p| p.pattern_id.clone()).collect();
            let mut distribution = DirichletMultinomial::new(labels.clone());
            for (index, member) in members.iter().enumerate() {
                distribution.observe(index, u64::from(member.occurrences));
            }
            genes.push(Gene {
                detector_id: detector_id.to_string(),
                alternatives: labels,
                distribution,
            });
        }
        genes.sort_by(|a, b| a.detector_id.cmp(&b.detector_id));
        genes
    }

    /// Discover conventions for one scan.
    ///
    /// `total_files` scopes the Universal test; `now_epoch` stamps
    /// discovery times.
    pub fn discover(
        &self,
        patterns: &[AggregatedPattern],
        scores: &FxHashMap<String, ConfidenceScore>,
        total_files: u64,
        now_epoch: i64,
    ) -> Vec<Convention> {
        let by_id: FxHashMap<&str, &AggregatedPattern> = patterns
            .iter()
            .map(|p| (p.pattern_id.as_str(), p))
            .collect();

        let mut conventions = Vec::new();
        for gene in Self::genes(patterns) {
            let Some((dominant_index, dominant_id, dominance)) = gene.distribution.dominant()
            else {
                continue;
            };
            let _ = dominant_index;
            let Some(pattern) = by_id.get(dominant_id) else {
                continue;
            };

            // Discovery gates.
            if u64::from(pattern.occurrences) < u64::from(self.config.min_occurrences)
                || pattern.file_spread < self.config.min_file_spread
            {
                continue;
            }

            let contested = gene.alternatives.len() > 1
                && gene.distribution.relative_gap() < self.config.contested_gap;

            if !contested && dominance < self.config.dominance_threshold {
                continue;
            }

            let score = scores.get(dominant_id);
            let category = if contested {
                ConventionCategory::Contested
            } else {
                categorize(pattern, score, total_files)
            };

            conventions.push(Convention {
                id: format!("conv:{}", pattern.pattern_id),
                pattern_id: pattern.pattern_id.clone(),
                category,
                scope: ConventionScope::Project,
                dominance,
                discovered_at: now_epoch,
                last_seen: now_epoch,
                status: ConventionStatus::Discovered,
            });
        }
        conventions
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }
}

fn categorize(
    pattern: &AggregatedPattern,
    score: Option<&ConfidenceScore>,
    total_files: u64,
) -> ConventionCategory {
    let spread_ratio = if total_files > 0 {
        f64::from(pattern.file_spread) / total_files as f64
    } else {
        0.0
    };

    match score {
        Some(score) => {
            if score.momentum == Momentum::Falling {
                ConventionCategory::Legacy
            } else if spread_ratio >= 0.80 && score.tier == ConfidenceTier::Established {
                ConventionCategory::Universal
            } else if score.momentum == Momentum::Rising && score.tier >= ConfidenceTier::Emerging
            {
                ConventionCategory::Emerging
            } else {
                ConventionCategory::ProjectSpecific
            }
        }
        None => ConventionCategory::ProjectSpecific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;
    use crate::patterns::aggregation::PatternLocation;
    use crate::patterns::confidence::{ConfidenceScorer, ScorerConfig};

    fn pattern(id: &str, detector: &str, occurrences: u32, files: u32) -> AggregatedPattern {
        let mut p = AggregatedPattern::new(
            id.to_string(),
            detector.to_string(),
            PatternCategory::Structural,
        );
        for i in 0..occurrences {
            p.locations.push(PatternLocation {
                file: format!("f{}.ts", i % files.max(1)),
                line: i,
                column: 0,
                confidence: 0.9,
                is_outlier: false,
                snippet: None,
            });
        }
        p.reconcile();
        p
    }

    fn score_all(
        patterns: &[AggregatedPattern],
        total_files: u64,
    ) -> FxHashMap<String, ConfidenceScore> {
        let scorer = ConfidenceScorer::new(ScorerConfig {
            total_files,
            default_age_days: 60,
        });
        patterns
            .iter()
            .map(|p| {
                (
                    p.pattern_id.clone(),
                    scorer.score(p, Momentum::Stable, 60, 0, None).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn contested_naming_split_yields_contested_category() {
        // 12 camelCase vs 11 snake_case: relative gap well under 20%.
        let patterns = vec![
            pattern("naming:camel", "naming-style", 12, 6),
            pattern("naming:snake", "naming-style", 11, 5),
        ];
        let scores = score_all(&patterns, 12);
        let learner = ConventionLearner::with_defaults();
        let conventions = learner.discover(&patterns, &scores, 12, 1_700_000_000);

        assert_eq!(conventions.len(), 1);
        assert_eq!(conventions[0].category, ConventionCategory::Contested);
    }

    #[test]
    fn clear_majority_is_not_contested() {
        // 80/20: a real winner.
        let patterns = vec![
            pattern("naming:camel", "naming-style", 80, 20),
            pattern("naming:snake", "naming-style", 20, 5),
        ];
        let scores = score_all(&patterns, 25);
        let learner = ConventionLearner::with_defaults();
        let conventions = learner.discover(&patterns, &scores, 25, 1_700_000_000);

        assert_eq!(conventions.len(), 1);
        assert_ne!(conventions[0].category, ConventionCategory::Contested);
        assert_eq!(conventions[0].pattern_id, "naming:camel");
    }

    #[test]
    fn discovery_gates_filter_thin_patterns() {
        // Two occurrences in one file: below every gate.
        let patterns = vec![pattern("p", "d", 2, 1)];
        let scores = score_all(&patterns, 100);
        let learner = ConventionLearner::with_defaults();
        assert!(learner
            .discover(&patterns, &scores, 100, 1_700_000_000)
            .is_empty());
    }

    #[test]
    fn universal_needs_spread_and_established() {
        let patterns = vec![pattern("p", "d", 95, 90)];
        let scores = score_all(&patterns, 100);
        let learner = ConventionLearner::with_defaults();
        let conventions = learner.discover(&patterns, &scores, 100, 1_700_000_000);
        assert_eq!(conventions.len(), 1);
        assert_eq!(conventions[0].category, ConventionCategory::Universal);
    }
}
