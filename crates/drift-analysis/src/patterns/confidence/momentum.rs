//! Momentum: trend over the last scans, plus temporal decay for patterns
//! that stopped appearing.

use super::types::Momentum;

const HISTORY_LENGTH: usize = 10;
const RELATIVE_SLOPE_THRESHOLD: f64 = 0.10;

/// Frequency history of one pattern across consecutive scans.
#[derive(Debug, Clone, Default)]
pub struct MomentumTracker {
    history: Vec<u64>,
}

impl MomentumTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(history: impl IntoIterator<Item = u64>) -> Self {
        let mut tracker = Self::new();
        for count in history {
            tracker.record(count);
        }
        tracker
    }

    pub fn record(&mut self, occurrences: u64) {
        self.history.push(occurrences);
        if self.history.len() > HISTORY_LENGTH {
            self.history.remove(0);
        }
    }

    /// Direction from the least-squares slope, normalized by the mean so a
    /// pattern at 1000 occurrences needs the same relative change as one
    /// at 10.
    pub fn direction(&self) -> Momentum {
        if self.history.len() < 2 {
            return Momentum::Stable;
        }
        let mean = self.history.iter().sum::<u64>() as f64 / self.history.len() as f64;
        if mean <= 0.0 {
            return Momentum::Stable;
        }
        let relative = self.slope() / mean;
        if relative > RELATIVE_SLOPE_THRESHOLD {
            Momentum::Rising
        } else if relative < -RELATIVE_SLOPE_THRESHOLD {
            Momentum::Falling
        } else {
            Momentum::Stable
        }
    }

    fn slope(&self) -> f64 {
        let n = self.history.len() as f64;
        let (mut sx, mut sy, mut sxy, mut sxx) = (0.0, 0.0, 0.0, 0.0);
        for (i, &count) in self.history.iter().enumerate() {
            let (x, y) = (i as f64, count as f64);
            sx += x;
            sy += y;
            sxy += x * y;
            sxx += x * x;
        }
        let denom = n * sxx - sx * sx;
        if denom.abs() < f64::EPSILON {
            0.0
        } else {
            (n * sxy - sx * sy) / denom
        }
    }
}

/// Decay multiplier for α and β by days unseen. Symmetric decay preserves
/// the posterior mean while widening the interval; past 30 days the lost
/// interval tightness costs at least one tier.
pub fn temporal_decay(days_unseen: u64) -> f64 {
    const GRACE_DAYS: u64 = 7;
    const FLOOR_DAYS: u64 = 90;
    const FLOOR: f64 = 0.1;

    if days_unseen <= GRACE_DAYS {
        return 1.0;
    }
    if days_unseen >= FLOOR_DAYS {
        return FLOOR;
    }
    let window = (FLOOR_DAYS - GRACE_DAYS) as f64;
    let elapsed = (days_unseen - GRACE_DAYS) as f64;
    (1.0 - elapsed / window * (1.0 - FLOOR)).clamp(FLOOR, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_is_stable() {
        assert_eq!(MomentumTracker::from_history([5]).direction(), Momentum::Stable);
    }

    #[test]
    fn growth_is_rising() {
        let tracker = MomentumTracker::from_history((1..=10).map(|i| i * 10));
        assert_eq!(tracker.direction(), Momentum::Rising);
    }

    #[test]
    fn shrinkage_is_falling() {
        let tracker = MomentumTracker::from_history((1..=10).rev().map(|i| i * 10));
        assert_eq!(tracker.direction(), Momentum::Falling);
    }

    #[test]
    fn flat_is_stable() {
        let tracker = MomentumTracker::from_history([42; 10]);
        assert_eq!(tracker.direction(), Momentum::Stable);
    }

    #[test]
    fn decay_thresholds() {
        assert_eq!(temporal_decay(0), 1.0);
        assert_eq!(temporal_decay(7), 1.0);
        assert!(temporal_decay(30) < 0.8);
        assert!((temporal_decay(90) - 0.1).abs() < 1e-12);
        assert!((temporal_decay(400) - 0.1).abs() < 1e-12);
    }
}
