//! Phases 1–2: group matches by pattern id and merge cross-file
//! occurrences, deduplicating repeated sites so re-ingesting the same
//! match twice leaves the aggregate unchanged.

use drift_core::types::collections::{FxHashMap, FxHashSet};

use crate::engine::PatternMatch;

use super::types::{AggregatedPattern, PatternLocation};

pub fn group_matches(matches: &[PatternMatch]) -> FxHashMap<String, AggregatedPattern> {
    let mut grouped: FxHashMap<String, AggregatedPattern> = FxHashMap::default();
    let mut seen_sites: FxHashMap<String, FxHashSet<(String, u32, u32)>> = FxHashMap::default();

    for m in matches {
        let pattern = grouped.entry(m.pattern_id.clone()).or_insert_with(|| {
            AggregatedPattern::new(m.pattern_id.clone(), m.detector_id.clone(), m.category)
        });

        let site = (m.file.clone(), m.line, m.column);
        let sites = seen_sites.entry(m.pattern_id.clone()).or_default();
        if !sites.insert(site) {
            continue; // identical observation - idempotent ingest
        }

        pattern.locations.push(PatternLocation {
            file: m.file.clone(),
            line: m.line,
            column: m.column,
            confidence: m.confidence,
            is_outlier: false,
            snippet: m.snippet.clone(),
        });
    }

    for pattern in grouped.values_mut() {
        pattern
            .locations
            .sort_by(|a, b| a.site_key().cmp(&b.site_key()));
        pattern.reconcile();
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;

    fn m(pattern: &str, file: &str, line: u32) -> PatternMatch {
        PatternMatch {
            pattern_id: pattern.to_string(),
            detector_id: "d".to_string(),
            category: PatternCategory::Structural,
            file: file.to_string(),
            line,
            column: 0,
            confidence: 0.8,
            snippet: None,
        }
    }

    #[test]
    fn duplicate_match_is_idempotent() {
        let matches = vec![m("p1", "a.ts", 3), m("p1", "a.ts", 3)];
        let grouped = group_matches(&matches);
        let pattern = &grouped["p1"];
        assert_eq!(pattern.occurrences, 1);
    }

    #[test]
    fn counters_match_locations() {
        let matches = vec![
            m("p1", "a.ts", 1),
            m("p1", "a.ts", 2),
            m("p1", "b.ts", 1),
            m("p2", "a.ts", 9),
        ];
        let grouped = group_matches(&matches);
        let p1 = &grouped["p1"];
        assert_eq!(p1.occurrences, 3);
        assert_eq!(p1.file_spread, 2);
        assert_eq!(p1.occurrences as usize, p1.locations.len());
    }
}
