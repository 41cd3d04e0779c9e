//! Z-score with iterative masking (n ≥ 30). Masking re-estimates the
//! moments after each round so one extreme point cannot hide the rest by
//! inflating the standard deviation.

use super::types::{Deviation, OutlierFinding, OutlierMethod, Significance};

pub const DEFAULT_THRESHOLD: f64 = 2.5;
pub const MAX_ITERATIONS: usize = 3;

pub fn detect(values: &[f64], threshold: f64) -> Vec<OutlierFinding> {
    if values.len() < 2 {
        return Vec::new();
    }

    let mut masked = vec![false; values.len()];
    let mut findings = Vec::new();

    for _ in 0..MAX_ITERATIONS {
        let active: Vec<(usize, f64)> = values
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| !masked[*i])
            .collect();
        if active.len() < 2 {
            break;
        }

        let n = active.len() as f64;
        let mean = active.iter().map(|(_, v)| v).sum::<f64>() / n;
        let variance =
            active.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        if !variance.is_finite() || variance <= f64::EPSILON {
            break; // identical values - nothing can be an outlier
        }
        let stddev = variance.sqrt();

        let mut found = false;
        for (index, value) in active {
            let z = (value - mean) / stddev;
            if z.abs() > threshold {
                masked[index] = true;
                found = true;
                let deviation = normalize(z.abs(), threshold);
                findings.push(OutlierFinding {
                    index,
                    value,
                    statistic: z,
                    deviation,
                    significance: Significance::from_deviation(deviation),
                    method: OutlierMethod::ZScore,
                });
            }
        }
        if !found {
            break;
        }
    }
    findings
}

/// Map |z| ∈ [threshold, 3·threshold] onto [0, 1].
fn normalize(abs_z: f64, threshold: f64) -> Deviation {
    if abs_z <= threshold {
        return Deviation::new(0.0);
    }
    Deviation::new((abs_z - threshold) / (threshold * 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_values_yield_nothing() {
        let values = vec![4.0; 40];
        assert!(detect(&values, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn single_extreme_point_is_flagged() {
        let mut values = vec![10.0; 40];
        values[7] = 200.0;
        let findings = detect(&values, DEFAULT_THRESHOLD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, 7);
        assert!(findings[0].significance >= Significance::High);
    }

    #[test]
    fn masking_uncovers_shadowed_outliers() {
        let mut values = vec![10.0; 40];
        values[0] = 500.0; // dominates the stddev in round one
        values[1] = 120.0;
        let findings = detect(&values, DEFAULT_THRESHOLD);
        let indices: Vec<usize> = findings.iter().map(|f| f.index).collect();
        assert!(indices.contains(&0));
        assert!(indices.contains(&1), "masked outlier not recovered");
    }

    #[test]
    fn deviation_is_normalized() {
        let mut values = vec![10.0; 40];
        values[3] = 1000.0;
        let findings = detect(&values, DEFAULT_THRESHOLD);
        let d = findings[0].deviation.value();
        assert!((0.0..=1.0).contains(&d));
    }
}
