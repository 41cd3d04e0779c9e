//! Re-learning policy: the L3 invalidation rule. Over the changed-file
//! fraction threshold, incremental learning loses its statistical footing
//! and a full re-learn runs instead.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelearnMode {
    Incremental,
    #[default]
    Full,
}

/// Decide how to re-learn for a scan delta.
pub fn relearn_mode(changed_files: usize, total_files: usize, full_fraction: f64) -> RelearnMode {
    if total_files == 0 {
        return RelearnMode::Full;
    }
    let fraction = changed_files as f64 / total_files as f64;
    if fraction > full_fraction {
        RelearnMode::Full
    } else {
        RelearnMode::Incremental
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_delta_is_incremental() {
        assert_eq!(relearn_mode(5, 100, 0.10), RelearnMode::Incremental);
    }

    #[test]
    fn ten_percent_boundary() {
        // Exactly 10% stays incremental; over it goes full.
        assert_eq!(relearn_mode(10, 100, 0.10), RelearnMode::Incremental);
        assert_eq!(relearn_mode(11, 100, 0.10), RelearnMode::Full);
    }

    #[test]
    fn empty_project_relearns_fully() {
        assert_eq!(relearn_mode(0, 0, 0.10), RelearnMode::Full);
    }
}
