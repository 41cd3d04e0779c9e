//! Phases 3–4: near-duplicate detection. Exact pairwise Jaccard for normal
//! populations; MinHash LSH above the configured size to bound cost.

use drift_core::types::collections::{FxHashMap, FxHashSet};

use crate::scanner::hash_bytes;

use super::types::AggregatedPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Similarity crossed the flag threshold; surface for review.
    Flag,
    /// Similarity crossed the auto-merge threshold; merge, keep aliases.
    AutoMerge,
}

#[derive(Debug, Clone)]
pub struct MergeCandidate {
    pub keep: String,
    pub merge: String,
    pub similarity: f64,
    pub decision: MergeDecision,
}

/// Location key set for similarity comparison.
pub fn location_keys(pattern: &AggregatedPattern) -> FxHashSet<u64> {
    pattern
        .locations
        .iter()
        .map(|l| hash_bytes(format!("{}:{}", l.file, l.line).as_bytes()))
        .collect()
}

pub fn jaccard(a: &FxHashSet<u64>, b: &FxHashSet<u64>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Exact pairwise comparison. Only patterns in the same category compete;
/// the larger pattern is kept, the smaller merges in.
pub fn find_candidates(
    patterns: &[&AggregatedPattern],
    flag_threshold: f64,
    auto_merge_threshold: f64,
) -> Vec<MergeCandidate> {
    let keys: Vec<FxHashSet<u64>> = patterns.iter().map(|p| location_keys(p)).collect();
    let mut candidates = Vec::new();

    for i in 0..patterns.len() {
        for j in (i + 1)..patterns.len() {
            if patterns[i].category != patterns[j].category {
                continue;
            }
            let similarity = jaccard(&keys[i], &keys[j]);
            if similarity < flag_threshold {
                continue;
            }
            let (keep, merge) = if patterns[i].occurrences >= patterns[j].occurrences {
                (i, j)
            } else {
                (j, i)
            };
            candidates.push(MergeCandidate {
                keep: patterns[keep].pattern_id.clone(),
                merge: patterns[merge].pattern_id.clone(),
                similarity,
                decision: if similarity >= auto_merge_threshold {
                    MergeDecision::AutoMerge
                } else {
                    MergeDecision::Flag
                },
            });
        }
    }
    candidates
}

/// MinHash signatures with banded LSH for large populations.
pub struct MinHashIndex {
    num_hashes: usize,
    num_bands: usize,
    signatures: FxHashMap<String, Vec<u64>>,
    buckets: FxHashMap<(usize, u64), Vec<String>>,
}

impl MinHashIndex {
    pub fn new(num_hashes: usize, num_bands: usize) -> Self {
        let num_hashes = num_hashes.max(16);
        Self {
            num_hashes,
            num_bands: num_bands.clamp(1, num_hashes),
            signatures: FxHashMap::default(),
            buckets: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, id: &str, keys: &FxHashSet<u64>) {
        let signature = self.signature(keys);
        let rows = self.num_hashes / self.num_bands;
        for band in 0..self.num_bands {
            let slice = &signature[band * rows..(band + 1) * rows];
            let band_hash = band_hash(slice);
            self.buckets
                .entry((band, band_hash))
                .or_default()
                .push(id.to_string());
        }
        self.signatures.insert(id.to_string(), signature);
    }

    /// Candidate pairs sharing at least one LSH bucket.
    pub fn candidate_pairs(&self) -> Vec<(String, String)> {
        let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
        let mut pairs = Vec::new();
        for ids in self.buckets.values() {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let pair = if ids[i] <= ids[j] {
                        (ids[i].clone(), ids[j].clone())
                    } else {
                        (ids[j].clone(), ids[i].clone())
                    };
                    if seen.insert(pair.clone()) {
                        pairs.push(pair);
                    }
                }
            }
        }
        pairs
    }

    /// Estimated Jaccard from signature agreement.
    pub fn estimate(&self, a: &str, b: &str) -> Option<f64> {
        let sa = self.signatures.get(a)?;
        let sb = self.signatures.get(b)?;
        let agreeing = sa.iter().zip(sb).filter(|(x, y)| x == y).count();
        Some(agreeing as f64 / self.num_hashes as f64)
    }

    fn signature(&self, keys: &FxHashSet<u64>) -> Vec<u64> {
        (0..self.num_hashes as u64)
            .map(|seed| {
                keys.iter()
                    .map(|&key| hash_bytes(&(key ^ seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)).to_le_bytes()))
                    .min()
                    .unwrap_or(u64::MAX)
            })
            .collect()
    }
}

fn band_hash(slice: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(slice.len() * 8);
    for value in slice {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    hash_bytes(&bytes)
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
    fn identical_location_sets_auto_merge() {
        let sites: Vec<(&str, u32)> = (0..20).map(|i| ("a.ts", i)).collect();
        let a = pattern("p1", &sites);
        let b = pattern("p2", &sites);
        let candidates = find_candidates(&[&a, &b], 0.85, 0.95);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].decision, MergeDecision::AutoMerge);
    }

    #[test]
    fn disjoint_sets_do_not_flag() {
        let a = pattern("p1", &[("a.ts", 1), ("a.ts", 2)]);
        let b = pattern("p2", &[("b.ts", 1), ("b.ts", 2)]);
        assert!(find_candidates(&[&a, &b], 0.85, 0.95).is_empty());
    }

    #[test]
    fn minhash_estimate_tracks_jaccard() {
        let mut index = MinHashIndex::new(128, 16);
        let base: FxHashSet<u64> = (0..100u64).collect();
        let mut near = base.clone();
        near.remove(&0);
        near.insert(1000);

        index.insert("a", &base);
        index.insert("b", &near);

        let estimate = index.estimate("a", "b").unwrap();
        assert!(
            (estimate - 0.98).abs() < 0.15,
            "estimate {estimate} too far from true similarity"
        );
    }
}
