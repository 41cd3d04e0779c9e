//! Outlier types.

use serde::{Deserialize, Serialize};

/// Normalized deviation in [0, 1], whatever the underlying statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation(f64);

impl Deviation {
    pub fn new(value: f64) -> Self {
        Self(if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Significance tiered by the normalized deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Low,
    Moderate,
    High,
    Critical,
}

impl Significance {
    pub fn from_deviation(deviation: Deviation) -> Self {
        let v = deviation.value();
        if v >= 0.90 {
            Self::Critical
        } else if v >= 0.75 {
            Self::High
        } else if v >= 0.55 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    ZScore,
    Grubbs,
    GeneralizedEsd,
    Iqr,
    Mad,
    RuleBased,
}

impl OutlierMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZScore => "z_score",
            Self::Grubbs => "grubbs",
            Self::GeneralizedEsd => "generalized_esd",
            Self::Iqr => "iqr",
            Self::Mad => "mad",
            Self::RuleBased => "rule_based",
        }
    }
}

/// One flagged sample point, indexed into the input slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierFinding {
    pub index: usize,
    pub value: f64,
    pub statistic: f64,
    pub deviation: Deviation,
    pub significance: Significance,
    pub method: OutlierMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_clamps_and_sanitizes() {
        assert_eq!(Deviation::new(1.7).value(), 1.0);
        assert_eq!(Deviation::new(-0.3).value(), 0.0);
        assert_eq!(Deviation::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn significance_tiers() {
        assert_eq!(
            Significance::from_deviation(Deviation::new(0.95)),
            Significance::Critical
        );
        assert_eq!(
            Significance::from_deviation(Deviation::new(0.8)),
            Significance::High
        );
        assert_eq!(
            Significance::from_deviation(Deviation::new(0.6)),
            Significance::Moderate
        );
        assert_eq!(
            Significance::from_deviation(Deviation::new(0.1)),
            Significance::Low
        );
    }
}
