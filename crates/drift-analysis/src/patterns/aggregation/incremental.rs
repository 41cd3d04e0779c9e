//! Incremental re-aggregation: only patterns touching changed files are
//! reworked; everything else contributes its cached state.

use drift_core::types::collections::FxHashSet;

use super::types::AggregatedPattern;

/// Drop locations owned by changed files and mark the pattern dirty.
/// Returns true when anything was removed.
pub fn remove_stale_locations(
    pattern: &mut AggregatedPattern,
    changed_files: &FxHashSet<String>,
) -> bool {
    let before = pattern.locations.len();
    pattern
        .locations
        .retain(|location| !changed_files.contains(&location.file));
    let removed = pattern.locations.len() != before;
    if removed {
        pattern.needs_rescore = true;
        pattern.reconcile();
    }
    removed
}

/// Which existing patterns need re-aggregation for this delta.
pub fn affected_patterns<'a>(
    patterns: impl Iterator<Item = &'a AggregatedPattern>,
    changed_files: &FxHashSet<String>,
) -> FxHashSet<String> {
    patterns
        .filter(|p| p.locations.iter().any(|l| changed_files.contains(&l.file)))
        .map(|p| p.pattern_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;
    use crate::patterns::aggregation::types::PatternLocation;

    fn pattern_with(files: &[&str]) -> AggregatedPattern {
        let mut p = AggregatedPattern::new(
            "p".to_string(),
            "d".to_string(),
            PatternCategory::Structural,
        );
        for (i, file) in files.iter().enumerate() {
            p.locations.push(PatternLocation {
                file: file.to_string(),
                line: i as u32,
                column: 0,
                confidence: 0.8,
                is_outlier: false,
                snippet: None,
            });
        }
        p.reconcile();
        p
    }

    #[test]
    fn stale_locations_removed_and_counters_reconciled() {
        let mut pattern = pattern_with(&["a.ts", "a.ts", "b.ts"]);
        let changed: FxHashSet<String> = ["a.ts".to_string()].into_iter().collect();

        assert!(remove_stale_locations(&mut pattern, &changed));
        assert_eq!(pattern.occurrences, 1);
        assert_eq!(pattern.file_spread, 1);
    }

    #[test]
    fn untouched_pattern_is_not_dirty() {
        let mut pattern = pattern_with(&["b.ts"]);
        pattern.needs_rescore = false;
        let changed: FxHashSet<String> = ["a.ts".to_string()].into_iter().collect();
        assert!(!remove_stale_locations(&mut pattern, &changed));
        assert!(!pattern.needs_rescore);
    }
}
