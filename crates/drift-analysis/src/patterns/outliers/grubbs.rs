//! Grubbs' test for 10 ≤ n < 25, capped at three iterations. The critical
//! value comes from the Student-t quantile at α/(2n).

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::types::{Deviation, OutlierFinding, OutlierMethod, Significance};

pub const DEFAULT_ALPHA: f64 = 0.05;
const MAX_ITERATIONS: usize = 3;

pub fn detect(values: &[f64], alpha: f64) -> Vec<OutlierFinding> {
    let mut working: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    let mut findings = Vec::new();

    for _ in 0..MAX_ITERATIONS {
        let n = working.len();
        if n < 3 {
            break;
        }
        let nf = n as f64;
        let mean = working.iter().map(|(_, v)| v).sum::<f64>() / nf;
        let variance =
            working.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
        if !variance.is_finite() || variance <= f64::EPSILON {
            break;
        }
        let stddev = variance.sqrt();

        // Most extreme point.
        let (position, &(index, value)) = working
            .iter()
            .enumerate()
            .max_by(|a, b| {
                let da = (a.1 .1 - mean).abs();
                let db = (b.1 .1 - mean).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("non-empty sample");

        let g = (value - mean).abs() / stddev;
        let critical = match critical_value(n, alpha) {
            Some(c) => c,
            None => break,
        };

        if g <= critical {
            break;
        }

        let deviation = Deviation::new((g - critical) / critical.max(f64::EPSILON));
        findings.push(OutlierFinding {
            index,
            value,
            statistic: g,
            deviation,
            significance: Significance::from_deviation(deviation),
            method: OutlierMethod::Grubbs,
        });
        working.remove(position);
    }
    findings
}

/// Grubbs critical value: ((n−1)/√n)·√(t² / (n−2+t²)) with
/// t = t-quantile(α/(2n), n−2).
fn critical_value(n: usize, alpha: f64) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let dof = nf - 2.0;
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    let t = dist.inverse_cdf(alpha / (2.0 * nf)).abs();
    let t2 = t * t;
    Some(((nf - 1.0) / nf.sqrt()) * (t2 / (dof + t2)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_sample_has_no_outliers() {
        let values: Vec<f64> = (0..15).map(|i| 10.0 + f64::from(i) * 0.2).collect();
        assert!(detect(&values, DEFAULT_ALPHA).is_empty());
    }

    #[test]
    fn one_extreme_point_in_fifteen() {
        let mut values = vec![10.0, 10.2, 9.9, 10.1, 10.0, 9.8, 10.3, 10.1, 9.9, 10.0, 10.2, 9.7, 10.1, 10.0];
        values.push(42.0);
        let findings = detect(&values, DEFAULT_ALPHA);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, 14);
    }

    #[test]
    fn iteration_cap_holds() {
        let mut values = vec![10.0; 12];
        values[0] = 100.0;
        values[1] = 90.0;
        values[2] = 80.0;
        values[3] = 70.0;
        let findings = detect(&values, DEFAULT_ALPHA);
        assert!(findings.len() <= 3);
    }

    #[test]
    fn identical_values_yield_nothing() {
        assert!(detect(&[5.0; 15], DEFAULT_ALPHA).is_empty());
    }
}
