//! The confidence scorer: aggregation state in, `ConfidenceScore` out.
//!
//! Non-finite intermediates surface as `DetectionError` instead of
//! propagating into tiers or the store's CHECK constraints.

use drift_core::errors::DetectionError;
use drift_core::types::collections::FxHashMap;

use crate::patterns::aggregation::AggregatedPattern;

use super::beta::{credible_interval, posterior_mean, posterior_params};
use super::factors::{compute_factors, per_file_cv, FactorInput};
use super::momentum::{temporal_decay, MomentumTracker};
use super::types::{ConfidenceScore, ConfidenceTier, Momentum};

const COMPOSITE_POSTERIOR_WEIGHT: f64 = 0.70;
const COMPOSITE_CONSISTENCY_WEIGHT: f64 = 0.15;
const COMPOSITE_MOMENTUM_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub total_files: u64,
    /// Assumed age when scan history carries no first-seen date.
    pub default_age_days: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            total_files: 100,
            default_age_days: 7,
        }
    }
}

pub struct ConfidenceScorer {
    config: ScorerConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScorerConfig::default())
    }

    /// Score one pattern.
    ///
    /// `prior`: persisted (α, β) from the previous scan, when resuming.
    /// `days_unseen`: symmetric temporal decay applies past 7 days.
    pub fn score(
        &self,
        pattern: &AggregatedPattern,
        momentum: Momentum,
        days_since_first_seen: u64,
        days_unseen: u64,
        prior: Option<(f64, f64)>,
    ) -> Result<ConfidenceScore, DetectionError> {
        let trials = self.config.total_files.max(1);
        let conforming = u64::from(pattern.file_spread);
        let (mut alpha, mut beta) = posterior_params(conforming, trials);

        // Factor evidence on top of the base posterior.
        let counts: Vec<u32> = pattern.per_file_counts().iter().map(|(_, c)| *c).collect();
        let consistency_cv = per_file_cv(&counts);
        let factors = compute_factors(&FactorInput {
            occurrences: u64::from(pattern.occurrences),
            population: trials.max(u64::from(pattern.occurrences)),
            per_file_cv: consistency_cv,
            days_since_first_seen,
            file_spread: u64::from(pattern.file_spread),
            total_files: trials,
            momentum,
        });
        let (alpha_add, beta_add) = factors.to_pseudo_observations(u64::from(pattern.occurrences));
        alpha += alpha_add;
        beta += beta_add;

        // Age carries the previous posterior forward as weighted prior
        // observations, narrowing the interval for long-lived patterns.
        if let Some((prior_alpha, prior_beta)) = prior {
            let carry = factors.age * 0.5;
            alpha += (prior_alpha - 1.0).max(0.0) * carry;
            beta += (prior_beta - 1.0).max(0.0) * carry;
        }

        // Symmetric decay: preserves the mean, widens the interval.
        let decay = temporal_decay(days_unseen);
        if decay < 1.0 {
            alpha = 1.0 + (alpha - 1.0) * decay;
            beta = 1.0 + (beta - 1.0) * decay;
        }

        alpha = alpha.max(1.0);
        beta = beta.max(1.0);
        guard_finite(alpha, "alpha")?;
        guard_finite(beta, "beta")?;

        let mean = posterior_mean(alpha, beta);
        let interval = credible_interval(alpha, beta, 0.95);
        let half_width = (interval.1 - interval.0) / 2.0;
        guard_finite(mean, "posterior_mean")?;

        let consistency_value = (1.0 - consistency_cv / 2.0).clamp(0.0, 1.0);
        let momentum_value = match momentum {
            Momentum::Rising => 0.8,
            Momentum::Stable => 0.5,
            Momentum::Falling => 0.2,
        };
        let composite = mean * COMPOSITE_POSTERIOR_WEIGHT
            + consistency_value * COMPOSITE_CONSISTENCY_WEIGHT
            + momentum_value * COMPOSITE_MOMENTUM_WEIGHT;
        guard_finite(composite, "composite")?;

        let mut tier = ConfidenceTier::assign(mean, half_width);
        // A pattern unseen past 30 days cannot hold its tier regardless of
        // what the widened interval still allows.
        if days_unseen > 30 {
            tier = tier.downgraded();
        }

        Ok(ConfidenceScore {
            alpha,
            beta,
            posterior_mean: mean,
            credible_interval: interval,
            tier,
            momentum,
            composite,
        })
    }

    /// Score a batch with per-pattern momentum trackers.
    pub fn score_batch(
        &self,
        patterns: &[AggregatedPattern],
        trackers: &FxHashMap<String, MomentumTracker>,
    ) -> Result<Vec<(String, ConfidenceScore)>, DetectionError> {
        patterns
            .iter()
            .map(|pattern| {
                let momentum = trackers
                    .get(&pattern.pattern_id)
                    .map(|t| t.direction())
                    .unwrap_or(Momentum::Stable);
                let score = self.score(
                    pattern,
                    momentum,
                    self.config.default_age_days,
                    0,
                    None,
                )?;
                Ok((pattern.pattern_id.clone(), score))
            })
            .collect()
    }

    /// Batch diagnostics: tier distribution and the inflation warning.
    pub fn diagnostics(&self, scores: &[(String, ConfidenceScore)]) -> ConfidenceDiagnostics {
        let mut tiers: FxHashMap<ConfidenceTier, usize> = FxHashMap::default();
        let mut mean_sum = 0.0;
        let mut width_sum = 0.0;
        for (_, score) in scores {
            *tiers.entry(score.tier).or_insert(0) += 1;
            mean_sum += score.posterior_mean;
            width_sum += score.ci_half_width() * 2.0;
        }
        let total = scores.len();
        let established = tiers.get(&ConfidenceTier::Established).copied().unwrap_or(0);

        ConfidenceDiagnostics {
            total,
            tier_distribution: tiers,
            avg_posterior_mean: if total > 0 { mean_sum / total as f64 } else { 0.0 },
            avg_ci_width: if total > 0 { width_sum / total as f64 } else { 0.0 },
            inflation_warning: total > 0 && established as f64 / total as f64 > 0.8,
        }
    }
}

fn guard_finite(value: f64, context: &str) -> Result<(), DetectionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DetectionError::NonFiniteValue {
            context: context.to_string(),
            value,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConfidenceDiagnostics {
    pub total: usize,
    pub tier_distribution: FxHashMap<ConfidenceTier, usize>,
    pub avg_posterior_mean: f64,
    pub avg_ci_width: f64,
    /// Over 80% Established usually means the inputs are inflated, not the
    /// codebase consistent.
    pub inflation_warning: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;
    use crate::patterns::aggregation::PatternLocation;

    fn pattern(occurrences: u32, files: u32) -> AggregatedPattern {
        let mut p = AggregatedPattern::new(
            "p".to_string(),
            "d".to_string(),
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

    fn scorer(total_files: u64) -> ConfidenceScorer {
        ConfidenceScorer::new(ScorerConfig {
            total_files,
            default_age_days: 30,
        })
    }

    #[test]
    fn widespread_pattern_reaches_established() {
        let score = scorer(100)
            .score(&pattern(95, 95), Momentum::Rising, 60, 0, None)
            .unwrap();
        assert_eq!(score.tier, ConfidenceTier::Established);
        assert!(score.alpha >= 1.0 && score.beta >= 1.0);
    }

    #[test]
    fn sparse_pattern_stays_low() {
        let score = scorer(100)
            .score(&pattern(3, 2), Momentum::Stable, 1, 0, None)
            .unwrap();
        assert!(score.tier < ConfidenceTier::Established);
    }

    #[test]
    fn empty_pattern_is_near_uniform() {
        let score = scorer(100)
            .score(&pattern(0, 0), Momentum::Stable, 0, 0, None)
            .unwrap();
        assert_eq!(score.tier, ConfidenceTier::Uncertain);
        assert!(score.posterior_mean < 0.2); // 0 of 100 files conform
    }

    #[test]
    fn posterior_mean_is_alpha_over_total() {
        let score = scorer(50)
            .score(&pattern(40, 30), Momentum::Stable, 30, 0, None)
            .unwrap();
        let expected = score.alpha / (score.alpha + score.beta);
        assert!((score.posterior_mean - expected).abs() < 1e-9);
    }

    #[test]
    fn decay_widens_interval_and_downgrades() {
        let scorer = scorer(100);
        let fresh = scorer
            .score(&pattern(90, 85), Momentum::Stable, 90, 0, None)
            .unwrap();
        let stale = scorer
            .score(&pattern(90, 85), Momentum::Stable, 90, 60, None)
            .unwrap();

        assert!((fresh.posterior_mean - stale.posterior_mean).abs() < 0.05);
        assert!(stale.ci_half_width() > fresh.ci_half_width());
        assert!(stale.tier < fresh.tier);
    }

    #[test]
    fn inflation_warning_fires() {
        let scorer = scorer(100);
        let scores: Vec<(String, ConfidenceScore)> = (0..10)
            .map(|i| {
                (
                    format!("p{i}"),
                    scorer
                        .score(&pattern(95, 95), Momentum::Rising, 60, 0, None)
                        .unwrap(),
                )
            })
            .collect();
        assert!(scorer.diagnostics(&scores).inflation_warning);
    }
}
