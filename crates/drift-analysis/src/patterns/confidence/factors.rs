//! The five factors shaping α/β updates between runs: frequency,
//! consistency, age, spread, momentum.

use super::types::Momentum;

/// Raw inputs for the factor model, all derived from aggregation state and
/// scan history.
#[derive(Debug, Clone)]
pub struct FactorInput {
    /// Conforming observations (pattern occurrences).
    pub occurrences: u64,
    /// All observations in the comparison population.
    pub population: u64,
    /// Coefficient of variation of per-file occurrence counts.
    pub per_file_cv: f64,
    pub days_since_first_seen: u64,
    pub file_spread: u64,
    pub total_files: u64,
    pub momentum: Momentum,
}

/// Factor values, each normalized into [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct Factors {
    pub frequency: f64,
    pub consistency: f64,
    pub age: f64,
    pub spread: f64,
    pub momentum: f64,
}

pub fn compute_factors(input: &FactorInput) -> Factors {
    Factors {
        frequency: ratio(input.occurrences, input.population),
        consistency: consistency(input.per_file_cv),
        age: age(input.days_since_first_seen),
        spread: ratio(input.file_spread, input.total_files),
        momentum: momentum(input.momentum),
    }
}

impl Factors {
    /// Evidence the factors add to the posterior. A strong factor profile
    /// contributes conforming pseudo-observations (α), a weak one
    /// non-conforming (β); the update strength ramps with sample size so a
    /// three-occurrence pattern cannot buy a tight interval.
    pub fn to_pseudo_observations(&self, sample_size: u64) -> (f64, f64) {
        let strength = self.frequency * 0.30
            + self.consistency * 0.25
            + self.age * 0.10
            + self.spread * 0.20
            + self.momentum * 0.15;
        let n = sample_size as f64;
        let ramp = n / (n + 10.0);
        ((strength * ramp * n).max(0.0), ((1.0 - strength) * ramp * n).max(0.0))
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64).clamp(0.0, 1.0)
}

/// Low dispersion across files reads as consistency. CV of 0 → 1.0;
/// CV ≥ 2 → 0.
fn consistency(cv: f64) -> f64 {
    if !cv.is_finite() || cv < 0.0 {
        return 0.5;
    }
    (1.0 - cv / 2.0).clamp(0.0, 1.0)
}

/// Linear ramp over 30 days with a floor so brand-new patterns retain some
/// standing.
fn age(days: u64) -> f64 {
    const FLOOR: f64 = 0.1;
    const FULL: f64 = 30.0;
    if days == 0 {
        return FLOOR;
    }
    let days = days as f64;
    if days >= FULL {
        1.0
    } else {
        FLOOR + (days / FULL) * (1.0 - FLOOR)
    }
}

fn momentum(direction: Momentum) -> f64 {
    match direction {
        Momentum::Rising => 0.8,
        Momentum::Stable => 0.5,
        Momentum::Falling => 0.2,
    }
}

/// Coefficient of variation of per-file counts, the consistency input.
pub fn per_file_cv(counts: &[u32]) -> f64 {
    if counts.len() < 2 {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().map(|&c| f64::from(c)).sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = counts
        .iter()
        .map(|&c| (f64::from(c) - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt() / mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_counts_are_perfectly_consistent() {
        assert!(per_file_cv(&[3, 3, 3, 3]) < 1e-12);
        assert!(consistency(0.0) > 0.99);
    }

    #[test]
    fn dispersed_counts_lose_consistency() {
        let cv = per_file_cv(&[1, 1, 1, 40]);
        assert!(consistency(cv) < 0.5);
    }

    #[test]
    fn age_ramps_and_saturates() {
        assert!(age(0) < age(10));
        assert!(age(10) < age(30));
        assert_eq!(age(30), age(300));
    }

    #[test]
    fn rising_beats_falling() {
        let base = FactorInput {
            occurrences: 50,
            population: 100,
            per_file_cv: 0.1,
            days_since_first_seen: 20,
            file_spread: 20,
            total_files: 50,
            momentum: Momentum::Rising,
        };
        let rising = compute_factors(&base);
        let falling = compute_factors(&FactorInput {
            momentum: Momentum::Falling,
            ..base
        });
        let (rise_alpha, _) = rising.to_pseudo_observations(50);
        let (fall_alpha, _) = falling.to_pseudo_observations(50);
        assert!(rise_alpha > fall_alpha);
    }

    #[test]
    fn small_samples_update_weakly() {
        let factors = Factors {
            frequency: 0.9,
            consistency: 0.9,
            age: 0.9,
            spread: 0.9,
            momentum: 0.8,
        };
        let (small_alpha, _) = factors.to_pseudo_observations(3);
        let (large_alpha, _) = factors.to_pseudo_observations(300);
        assert!(small_alpha < 3.0);
        assert!(large_alpha > 100.0);
    }
}
