//! Rule-based detection for samples too small for statistics (n < 10):
//! structural predicates with fixed deviation scores.

use super::types::{Deviation, OutlierFinding, OutlierMethod, Significance};

/// A structural predicate over a sample point, declared by detector
/// metadata.
pub struct Rule {
    pub name: &'static str,
    pub predicate: fn(f64, &SampleStats) -> bool,
    pub deviation: f64,
}

pub struct SampleStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl SampleStats {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { min, max, mean })
    }
}

/// The default rule set for small samples.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "order-of-magnitude",
            predicate: |v, stats| stats.mean > 0.0 && v > stats.mean * 10.0,
            deviation: 0.9,
        },
        Rule {
            name: "zero-among-nonzero",
            predicate: |v, stats| v == 0.0 && stats.min > 0.0,
            deviation: 0.6,
        },
        Rule {
            name: "negative-among-positive",
            predicate: |v, stats| v < 0.0 && stats.mean > 0.0,
            deviation: 0.7,
        },
    ]
}

pub fn detect(values: &[f64], rules: &[Rule]) -> Vec<OutlierFinding> {
    let Some(stats) = SampleStats::of(values) else {
        return Vec::new();
    };

    // `zero-among-nonzero` compares against the min of the rest, so a zero
    // point must not poison its own baseline.
    values
        .iter()
        .copied()
        .enumerate()
        .filter_map(|(index, value)| {
            let rest: Vec<f64> = values
                .iter()
                .copied()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, v)| v)
                .collect();
            let rest_stats = SampleStats::of(&rest).unwrap_or(SampleStats {
                min: stats.min,
                max: stats.max,
                mean: stats.mean,
            });

            rules
                .iter()
                .find(|rule| (rule.predicate)(value, &rest_stats))
                .map(|rule| {
                    let deviation = Deviation::new(rule.deviation);
                    OutlierFinding {
                        index,
                        value,
                        statistic: value,
                        deviation,
                        significance: Significance::from_deviation(deviation),
                        method: OutlierMethod::RuleBased,
                    }
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_of_magnitude_fires() {
        let findings = detect(&[2.0, 3.0, 2.5, 80.0], &default_rules());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, 3);
    }

    #[test]
    fn zero_among_nonzero_fires() {
        let findings = detect(&[5.0, 6.0, 0.0, 5.5], &default_rules());
        assert!(findings.iter().any(|f| f.value == 0.0));
    }

    #[test]
    fn uniform_small_sample_is_clean() {
        assert!(detect(&[3.0, 3.0, 3.0], &default_rules()).is_empty());
    }
}
