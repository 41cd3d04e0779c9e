//! Generalized ESD for n ≥ 25 with multiple suspected outliers. Runs k
//! rounds of extreme-removal, then keeps the largest i whose statistic
//! exceeded its critical value λᵢ.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::types::{Deviation, OutlierFinding, OutlierMethod, Significance};

pub const DEFAULT_ALPHA: f64 = 0.05;

/// `max_outliers` bounds k; a reasonable default is n/10.
pub fn detect(values: &[f64], alpha: f64, max_outliers: usize) -> Vec<OutlierFinding> {
    let n = values.len();
    if n < 4 || max_outliers == 0 {
        return Vec::new();
    }
    let k = max_outliers.min(n / 2);

    let mut working: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    let mut rounds: Vec<(OutlierFinding, f64)> = Vec::new(); // (candidate, lambda)

    for i in 1..=k {
        let m = working.len();
        if m < 3 {
            break;
        }
        let mf = m as f64;
        let mean = working.iter().map(|(_, v)| v).sum::<f64>() / mf;
        let variance =
            working.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / (mf - 1.0);
        if !variance.is_finite() || variance <= f64::EPSILON {
            break;
        }
        let stddev = variance.sqrt();

        let (position, &(index, value)) = working
            .iter()
            .enumerate()
            .max_by(|a, b| {
                let da = (a.1 .1 - mean).abs();
                let db = (b.1 .1 - mean).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("non-empty sample");

        let r = (value - mean).abs() / stddev;
        let lambda = match lambda_critical(n, i, alpha) {
            Some(l) => l,
            None => break,
        };

        let deviation = Deviation::new((r - lambda) / lambda.max(f64::EPSILON));
        rounds.push((
            OutlierFinding {
                index,
                value,
                statistic: r,
                deviation,
                significance: Significance::from_deviation(deviation),
                method: OutlierMethod::GeneralizedEsd,
            },
            lambda,
        ));
        working.remove(position);
    }

    // Largest i with Rᵢ > λᵢ; everything up to it is an outlier.
    let confirmed = rounds
        .iter()
        .rposition(|(finding, lambda)| finding.statistic > *lambda)
        .map(|pos| pos + 1)
        .unwrap_or(0);

    rounds
        .into_iter()
        .take(confirmed)
        .map(|(finding, _)| finding)
        .collect()
}

fn lambda_critical(n: usize, i: usize, alpha: f64) -> Option<f64> {
    let nf = n as f64;
    let i_f = i as f64;
    let dof = nf - i_f - 1.0;
    if dof <= 0.0 {
        return None;
    }
    let p = 1.0 - alpha / (2.0 * (nf - i_f + 1.0));
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    let t = dist.inverse_cdf(p);
    let numerator = (nf - i_f) * t;
    let denominator = ((dof + t * t) * (nf - i_f + 1.0)).sqrt();
    Some(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_multiple_planted_outliers() {
        let mut values: Vec<f64> = (0..30).map(|i| 50.0 + f64::from(i % 5)).collect();
        values[3] = 500.0;
        values[17] = 480.0;
        let findings = detect(&values, DEFAULT_ALPHA, 5);
        let indices: Vec<usize> = findings.iter().map(|f| f.index).collect();
        assert!(indices.contains(&3));
        assert!(indices.contains(&17));
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn clean_sample_confirms_none() {
        let values: Vec<f64> = (0..30).map(|i| 50.0 + f64::from(i % 7)).collect();
        assert!(detect(&values, DEFAULT_ALPHA, 5).is_empty());
    }

    #[test]
    fn identical_values_yield_nothing() {
        assert!(detect(&[9.0; 30], DEFAULT_ALPHA, 5).is_empty());
    }
}
