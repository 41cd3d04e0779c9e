//! IQR with Tukey fences (1.5×), the non-normal fallback for 10 ≤ n < 30.

use super::types::{Deviation, OutlierFinding, OutlierMethod, Significance};

pub const DEFAULT_MULTIPLIER: f64 = 1.5;

pub fn detect(values: &[f64], multiplier: f64) -> Vec<OutlierFinding> {
    if values.len() < 4 {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    if iqr <= f64::EPSILON {
        return Vec::new();
    }

    let low_fence = q1 - multiplier * iqr;
    let high_fence = q3 + multiplier * iqr;

    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| *v < low_fence || *v > high_fence)
        .map(|(index, value)| {
            let distance = if value < low_fence {
                (low_fence - value) / iqr
            } else {
                (value - high_fence) / iqr
            };
            // One extra IQR beyond the fence saturates the score.
            let deviation = Deviation::new(distance / 1.0);
            OutlierFinding {
                index,
                value,
                statistic: distance,
                deviation,
                significance: Significance::from_deviation(deviation),
                method: OutlierMethod::Iqr,
            }
        })
        .collect()
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_beyond_fences() {
        let mut values: Vec<f64> = (1..=20).map(f64::from).collect();
        values.push(100.0);
        let findings = detect(&values, DEFAULT_MULTIPLIER);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, 20);
    }

    #[test]
    fn identical_values_yield_nothing() {
        assert!(detect(&[7.0; 20], DEFAULT_MULTIPLIER).is_empty());
    }

    #[test]
    fn low_side_outlier() {
        let mut values: Vec<f64> = (50..70).map(f64::from).collect();
        values.push(-40.0);
        let findings = detect(&values, DEFAULT_MULTIPLIER);
        assert!(findings.iter().any(|f| f.value < 0.0));
    }
}
