//! Confidence score types.

use serde::{Deserialize, Serialize};

/// Graduated confidence tiers. Assignment couples the posterior mean with
/// the credible-interval half-width: a high mean on thin evidence stays
/// below Established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Uncertain,
    Tentative,
    Emerging,
    Established,
}

impl ConfidenceTier {
    /// Tier from posterior mean and CI half-width.
    pub fn assign(posterior_mean: f64, ci_half_width: f64) -> Self {
        if posterior_mean >= 0.85 && ci_half_width < 0.075 {
            Self::Established
        } else if posterior_mean >= 0.70 && ci_half_width < 0.125 {
            Self::Emerging
        } else if posterior_mean >= 0.50 {
            Self::Tentative
        } else {
            Self::Uncertain
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Established => "established",
            Self::Emerging => "emerging",
            Self::Tentative => "tentative",
            Self::Uncertain => "uncertain",
        }
    }

    /// One tier down, saturating at Uncertain.
    pub fn downgraded(&self) -> Self {
        match self {
            Self::Established => Self::Emerging,
            Self::Emerging => Self::Tentative,
            Self::Tentative | Self::Uncertain => Self::Uncertain,
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trend direction of a pattern's frequency across scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Rising,
    #[default]
    Stable,
    Falling,
}

impl Momentum {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Stable => "stable",
            Self::Falling => "falling",
        }
    }
}

/// A scored pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub alpha: f64,
    pub beta: f64,
    pub posterior_mean: f64,
    pub credible_interval: (f64, f64),
    pub tier: ConfidenceTier,
    pub momentum: Momentum,
    /// posterior×0.70 + consistency×0.15 + momentum×0.15.
    pub composite: f64,
}

impl ConfidenceScore {
    pub fn ci_half_width(&self) -> f64 {
        (self.credible_interval.1 - self.credible_interval.0) / 2.0
    }

    /// The no-evidence score: Beta(1, 1), widest interval, Uncertain.
    pub fn uniform() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            posterior_mean: 0.5,
            credible_interval: (0.025, 0.975),
            tier: ConfidenceTier::Uncertain,
            momentum: Momentum::Stable,
            composite: 0.5 * 0.70 + 0.5 * 0.15 + 0.5 * 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_requires_tight_interval() {
        // High mean, wide interval: evidence too thin for Established.
        assert_eq!(ConfidenceTier::assign(0.9, 0.2), ConfidenceTier::Tentative);
        assert_eq!(ConfidenceTier::assign(0.9, 0.05), ConfidenceTier::Established);
    }

    #[test]
    fn tier_monotonic_in_mean_at_fixed_width() {
        let width = 0.05;
        let tiers: Vec<ConfidenceTier> = [0.3, 0.55, 0.75, 0.9]
            .iter()
            .map(|&m| ConfidenceTier::assign(m, width))
            .collect();
        for pair in tiers.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn downgrade_saturates() {
        assert_eq!(ConfidenceTier::Uncertain.downgraded(), ConfidenceTier::Uncertain);
        assert_eq!(ConfidenceTier::Established.downgraded(), ConfidenceTier::Emerging);
    }
}
