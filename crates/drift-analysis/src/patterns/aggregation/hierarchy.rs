//! Phase 5: hierarchy and merging.
//!
//! Auto-merge candidates fold the smaller pattern into the larger with its
//! id preserved as an alias. A pattern whose locations sit inside another
//! same-category pattern at the coverage threshold becomes its child when
//! it is strictly the more specific of the two (fewer locations).

use drift_core::types::collections::FxHashMap;

use super::similarity::{location_keys, MergeCandidate, MergeDecision};
use super::types::AggregatedPattern;

/// Apply auto-merges, then assign parent/child links.
pub fn build_hierarchy(
    patterns: &mut FxHashMap<String, AggregatedPattern>,
    candidates: &[MergeCandidate],
    coverage_threshold: f64,
) {
    for candidate in candidates {
        if candidate.decision != MergeDecision::AutoMerge {
            continue;
        }
        let Some(merged) = patterns.remove(&candidate.merge) else {
            continue;
        };
        if let Some(keeper) = patterns.get_mut(&candidate.keep) {
            keeper.aliases.push(merged.pattern_id.clone());
            keeper.aliases.extend(merged.aliases);
            for location in merged.locations {
                let key = location.site_key();
                if !keeper.locations.iter().any(|l| l.site_key() == key) {
                    keeper.locations.push(location);
                }
            }
            keeper.reconcile();
        } else {
            // Keeper itself was merged away earlier; restore the orphan.
            patterns.insert(merged.pattern_id.clone(), merged);
        }
    }

    assign_parents(patterns, coverage_threshold);
}

fn assign_parents(patterns: &mut FxHashMap<String, AggregatedPattern>, coverage: f64) {
    let ids: Vec<String> = patterns.keys().cloned().collect();
    let keys: FxHashMap<&String, _> = ids
        .iter()
        .map(|id| (id, location_keys(&patterns[id])))
        .collect();

    let mut links: Vec<(String, String)> = Vec::new(); // (child, parent)
    for child_id in &ids {
        let child = &patterns[child_id];
        if child.locations.is_empty() {
            continue;
        }
        let child_keys = &keys[child_id];

        for parent_id in &ids {
            if parent_id == child_id {
                continue;
            }
            let parent = &patterns[parent_id];
            // Specialization: same category, strictly smaller extent.
            if parent.category != child.category
                || parent.locations.len() <= child.locations.len()
            {
                continue;
            }
            let parent_keys = &keys[parent_id];
            let covered = child_keys.intersection(parent_keys).count();
            if covered as f64 / child_keys.len() as f64 >= coverage {
                links.push((child_id.clone(), parent_id.clone()));
                break;
            }
        }
    }

    for (child_id, parent_id) in links {
        if let Some(child) = patterns.get_mut(&child_id) {
            child.parent_id = Some(parent_id.clone());
        }
        if let Some(parent) = patterns.get_mut(&parent_id) {
            if !parent.children.contains(&child_id) {
                parent.children.push(child_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;
    use crate::patterns::aggregation::types::PatternLocation;

    fn pattern(id: &str, sites: &[(&str, u32)]) -> AggregatedPattern {
        let mut p = AggregatedPattern::new(
            id.to_string(),
            "d".to_string(),
            PatternCategory::Structural,
        );
        for (file, line) in sites {
            p.locations.push(PatternLocation {
                file: file.to_string(),
                line: *line,
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
    fn auto_merge_preserves_alias_and_counts() {
        let sites: Vec<(&str, u32)> = (0..10).map(|i| ("a.ts", i)).collect();
        let mut patterns = FxHashMap::default();
        patterns.insert("big".to_string(), pattern("big", &sites));
        patterns.insert("dup".to_string(), pattern("dup", &sites));

        let candidates = vec![MergeCandidate {
            keep: "big".to_string(),
            merge: "dup".to_string(),
            similarity: 1.0,
            decision: MergeDecision::AutoMerge,
        }];
        build_hierarchy(&mut patterns, &candidates, 0.9);

        assert!(!patterns.contains_key("dup"));
        let big = &patterns["big"];
        assert_eq!(big.aliases, vec!["dup".to_string()]);
        assert_eq!(big.occurrences, 10);
    }

    #[test]
    fn subset_becomes_child() {
        let parent_sites: Vec<(&str, u32)> = (0..20).map(|i| ("a.ts", i)).collect();
        let child_sites: Vec<(&str, u32)> = (0..5).map(|i| ("a.ts", i)).collect();
        let mut patterns = FxHashMap::default();
        patterns.insert("parent".to_string(), pattern("parent", &parent_sites));
        patterns.insert("child".to_string(), pattern("child", &child_sites));

        build_hierarchy(&mut patterns, &[], 0.9);

        assert_eq!(patterns["child"].parent_id.as_deref(), Some("parent"));
        assert!(patterns["parent"].children.contains(&"child".to_string()));
    }
}
