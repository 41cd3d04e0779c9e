//! Modified Z-score on the median absolute deviation, for heavy-tailed
//! samples where the mean and stddev are themselves distorted.

use super::types::{Deviation, OutlierFinding, OutlierMethod, Significance};

pub const DEFAULT_THRESHOLD: f64 = 3.5;

/// Consistency constant relating MAD to σ under normality.
const MAD_SCALE: f64 = 0.6745;

pub fn detect(values: &[f64], threshold: f64) -> Vec<OutlierFinding> {
    if values.len() < 3 {
        return Vec::new();
    }

    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    let mad = median(&deviations);
    if mad <= f64::EPSILON {
        return Vec::new();
    }

    values
        .iter()
        .copied()
        .enumerate()
        .filter_map(|(index, value)| {
            let modified_z = MAD_SCALE * (value - med) / mad;
            if modified_z.abs() <= threshold {
                return None;
            }
            let deviation =
                Deviation::new((modified_z.abs() - threshold) / (threshold * 2.0));
            Some(OutlierFinding {
                index,
                value,
                statistic: modified_z,
                deviation,
                significance: Significance::from_deviation(deviation),
                method: OutlierMethod::Mad,
            })
        })
        .collect()
}

/// Whether the sample's tail is extreme enough that MAD should supersede
/// moment-based methods: max deviation from median over MAD.
pub fn has_extreme_tail(values: &[f64]) -> bool {
    if values.len() < 3 {
        return false;
    }
    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    let mad = median(&deviations);
    if mad <= f64::EPSILON {
        return false;
    }
    let max_dev = deviations.iter().cloned().fold(0.0, f64::max);
    max_dev / mad > 10.0
}

fn median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robust_to_the_outlier_itself() {
        let mut values = vec![10.0, 11.0, 9.0, 10.5, 9.5, 10.2, 9.8, 10.1];
        values.push(500.0);
        let findings = detect(&values, DEFAULT_THRESHOLD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, 8);
    }

    #[test]
    fn identical_values_yield_nothing() {
        assert!(detect(&[4.0; 10], DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn extreme_tail_check() {
        let mut values = vec![10.0, 11.0, 9.0, 10.5, 9.5, 10.2, 9.8];
        assert!(!has_extreme_tail(&values));
        values.push(900.0);
        assert!(has_extreme_tail(&values));
    }
}
