//! Beta posterior arithmetic. Prior is uniform Beta(1, 1); every helper
//! guards against non-finite intermediates.

use statrs::distribution::{Beta, ContinuousCDF};

/// Posterior parameters for k conforming observations in n trials:
/// Beta(1 + k, 1 + n − k). Both parameters are always ≥ 1.
pub fn posterior_params(conforming: u64, trials: u64) -> (f64, f64) {
    let k = conforming.min(trials) as f64;
    let n = trials as f64;
    (1.0 + k, 1.0 + (n - k))
}

/// α / (α + β), clamped to [0, 1]; uniform fallback on degenerate input.
pub fn posterior_mean(alpha: f64, beta: f64) -> f64 {
    let total = alpha + beta;
    if !total.is_finite() || total <= 0.0 {
        return 0.5;
    }
    let mean = alpha / total;
    if mean.is_finite() {
        mean.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Central credible interval at `level` via the Beta inverse CDF.
pub fn credible_interval(alpha: f64, beta: f64, level: f64) -> (f64, f64) {
    if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
        return (0.0, 1.0);
    }
    // Very large parameters defeat the quantile solver; the interval has
    // effectively collapsed onto the mean by then.
    if alpha > 1e6 || beta > 1e6 {
        let mean = posterior_mean(alpha, beta);
        return ((mean - 1e-6).max(0.0), (mean + 1e-6).min(1.0));
    }

    let tail = (1.0 - level.clamp(0.5, 0.999)) / 2.0;
    match Beta::new(alpha, beta) {
        Ok(dist) => {
            let low = dist.inverse_cdf(tail);
            let high = dist.inverse_cdf(1.0 - tail);
            (
                if low.is_finite() { low.clamp(0.0, 1.0) } else { 0.0 },
                if high.is_finite() { high.clamp(0.0, 1.0) } else { 1.0 },
            )
        }
        Err(_) => (0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_observations_is_uniform() {
        let (alpha, beta) = posterior_params(0, 0);
        assert_eq!((alpha, beta), (1.0, 1.0));
        assert!((posterior_mean(alpha, beta) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_observation_edges() {
        assert_eq!(posterior_params(0, 1), (1.0, 2.0));
        assert_eq!(posterior_params(1, 1), (2.0, 1.0));
    }

    #[test]
    fn conforming_capped_at_trials() {
        let (alpha, beta) = posterior_params(10, 5);
        assert!(alpha >= 1.0 && beta >= 1.0);
    }

    #[test]
    fn interval_narrows_with_evidence() {
        let (lo1, hi1) = credible_interval(3.0, 3.0, 0.95);
        let (lo2, hi2) = credible_interval(30.0, 30.0, 0.95);
        assert!(hi2 - lo2 < hi1 - lo1);
    }

    #[test]
    fn interval_half_width_monotone_in_sample_size() {
        // Fixed mean 0.8, growing pseudo-sample: half-width must shrink.
        let mut last = f64::MAX;
        for scale in [10.0, 50.0, 250.0] {
            let (lo, hi) = credible_interval(0.8 * scale, 0.2 * scale, 0.95);
            let half = (hi - lo) / 2.0;
            assert!(half < last);
            last = half;
        }
    }

    #[test]
    fn degenerate_parameters_fall_back() {
        assert_eq!(credible_interval(0.0, 1.0, 0.95), (0.0, 1.0));
        assert_eq!(credible_interval(f64::NAN, 1.0, 0.95), (0.0, 1.0));
        assert!((posterior_mean(f64::INFINITY, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn huge_parameters_collapse_to_mean() {
        let (lo, hi) = credible_interval(2e6, 1e6, 0.95);
        assert!(hi - lo < 1e-3);
    }
}
