//! Promotion and expiry. Operator decisions always win: a Rejected
//! convention never auto-promotes, an Approved one never auto-demotes.

use drift_core::types::collections::FxHashMap;

use crate::patterns::confidence::{ConfidenceScore, ConfidenceTier};

use super::types::{Convention, ConventionStatus};

const PROMOTION_MIN_SPREAD: u32 = 5;

/// Apply automatic promotion and expiry to a convention set.
///
/// Promotion: Discovered → Approved at Established tier with spread over
/// the promotion floor. Expiry: unseen past `expiry_secs` → Expired,
/// tagged, never deleted.
pub fn apply_promotions(
    conventions: &mut [Convention],
    scores: &FxHashMap<String, ConfidenceScore>,
    spreads: &FxHashMap<String, u32>,
    now_epoch: i64,
    expiry_secs: i64,
) -> PromotionReport {
    let mut report = PromotionReport::default();

    for convention in conventions.iter_mut() {
        // Expiry first: an expired convention cannot promote this round.
        if now_epoch - convention.last_seen > expiry_secs {
            if convention.status != ConventionStatus::Expired {
                convention.status = ConventionStatus::Expired;
                report.expired.push(convention.id.clone());
            }
            continue;
        }

        if convention.status != ConventionStatus::Discovered {
            continue; // operator-set states are sticky
        }

        let tier = scores
            .get(&convention.pattern_id)
            .map(|s| s.tier)
            .unwrap_or(ConfidenceTier::Uncertain);
        let spread = spreads.get(&convention.pattern_id).copied().unwrap_or(0);

        if tier == ConfidenceTier::Established && spread >= PROMOTION_MIN_SPREAD {
            convention.status = ConventionStatus::Approved;
            report.promoted.push(convention.id.clone());
        }
    }
    report
}

#[derive(Debug, Default)]
pub struct PromotionReport {
    pub promoted: Vec<String>,
    pub expired: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::confidence::Momentum;
    use crate::patterns::learning::types::{ConventionCategory, ConventionScope};

    fn convention(id: &str, status: ConventionStatus, last_seen: i64) -> Convention {
        Convention {
            id: id.to_string(),
            pattern_id: format!("pat:{id}"),
            category: ConventionCategory::ProjectSpecific,
            scope: ConventionScope::Project,
            dominance: 0.8,
            discovered_at: 0,
            last_seen,
            status,
        }
    }

    fn established_score() -> ConfidenceScore {
        ConfidenceScore {
            alpha: 90.0,
            beta: 5.0,
            posterior_mean: 0.947,
            credible_interval: (0.90, 0.98),
            tier: ConfidenceTier::Established,
            momentum: Momentum::Stable,
            composite: 0.9,
        }
    }

    #[test]
    fn promotes_established_with_spread() {
        let mut conventions = vec![convention("c1", ConventionStatus::Discovered, 1000)];
        let scores: FxHashMap<String, ConfidenceScore> =
            [("pat:c1".to_string(), established_score())].into_iter().collect();
        let spreads: FxHashMap<String, u32> =
            [("pat:c1".to_string(), 8u32)].into_iter().collect();

        let report = apply_promotions(&mut conventions, &scores, &spreads, 1100, 86_400);
        assert_eq!(conventions[0].status, ConventionStatus::Approved);
        assert_eq!(report.promoted.len(), 1);
    }

    #[test]
    fn thin_spread_blocks_promotion() {
        let mut conventions = vec![convention("c1", ConventionStatus::Discovered, 1000)];
        let scores: FxHashMap<String, ConfidenceScore> =
            [("pat:c1".to_string(), established_score())].into_iter().collect();
        let spreads: FxHashMap<String, u32> =
            [("pat:c1".to_string(), 3u32)].into_iter().collect();

        apply_promotions(&mut conventions, &scores, &spreads, 1100, 86_400);
        assert_eq!(conventions[0].status, ConventionStatus::Discovered);
    }

    #[test]
    fn rejected_never_auto_promotes() {
        let mut conventions = vec![convention("c1", ConventionStatus::Rejected, 1000)];
        let scores: FxHashMap<String, ConfidenceScore> =
            [("pat:c1".to_string(), established_score())].into_iter().collect();
        let spreads: FxHashMap<String, u32> =
            [("pat:c1".to_string(), 10u32)].into_iter().collect();

        apply_promotions(&mut conventions, &scores, &spreads, 1100, 86_400);
        assert_eq!(conventions[0].status, ConventionStatus::Rejected);
    }

    #[test]
    fn long_unseen_expires_but_survives() {
        let ninety_days = 90 * 86_400;
        let mut conventions = vec![convention("c1", ConventionStatus::Approved, 0)];
        let report = apply_promotions(
            &mut conventions,
            &FxHashMap::default(),
            &FxHashMap::default(),
            ninety_days + 1,
            ninety_days,
        );
        assert_eq!(conventions[0].status, ConventionStatus::Expired);
        assert_eq!(report.expired.len(), 1);
    }
}
