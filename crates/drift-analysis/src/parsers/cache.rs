//! Content-addressed parse cache: a bounded in-memory layer over the
//! durable `parse_cache` table.
//!
//! The in-memory layer is a segmented admission + LRU design: new entries
//! land in a probation segment and are promoted on second hit, so one large
//! cold scan cannot flush the hot set.

use std::collections::VecDeque;
use std::sync::Mutex;

use drift_core::types::collections::FxHashMap;

use crate::scanner::Language;

use super::types::ParseResult;

const DEFAULT_CAPACITY: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    language: Language,
    content_hash: u64,
}

struct Segments {
    /// First-seen entries, evicted FIFO.
    probation: VecDeque<CacheKey>,
    /// Promoted entries, evicted LRU.
    protected: VecDeque<CacheKey>,
    entries: FxHashMap<CacheKey, ParseResult>,
}

pub struct ParseCache {
    inner: Mutex<Segments>,
    capacity: usize,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Segments {
                probation: VecDeque::new(),
                protected: VecDeque::new(),
                entries: FxHashMap::default(),
            }),
            capacity: capacity.max(16),
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    pub fn get(&self, language: Language, content_hash: u64) -> Option<ParseResult> {
        use std::sync::atomic::Ordering;
        let key = CacheKey {
            language,
            content_hash,
        };
        let mut inner = self.inner.lock().unwrap();
        if let Some(result) = inner.entries.get(&key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            promote(&mut inner, key);
            Some(result)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn put(&self, result: ParseResult) {
        let key = CacheKey {
            language: result.language,
            content_hash: result.content_hash,
        };
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.contains_key(&key) {
            return;
        }
        inner.entries.insert(key, result);
        inner.probation.push_back(key);

        while inner.entries.len() > self.capacity {
            // Evict probation first; fall back to the cold end of protected.
            let victim = inner
                .probation
                .pop_front()
                .or_else(|| inner.protected.pop_front());
            match victim {
                Some(victim) => {
                    inner.entries.remove(&victim);
                }
                None => break,
            }
        }
    }

    pub fn hit_rate(&self) -> f64 {
        use std::sync::atomic::Ordering;
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        if hits + misses == 0.0 {
            0.0
        } else {
            hits / (hits + misses)
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn promote(inner: &mut Segments, key: CacheKey) {
    if let Some(pos) = inner.probation.iter().position(|k| *k == key) {
        inner.probation.remove(pos);
        inner.protected.push_back(key);
    } else if let Some(pos) = inner.protected.iter().position(|k| *k == key) {
        // Refresh LRU position.
        inner.protected.remove(pos);
        inner.protected.push_back(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(hash: u64) -> ParseResult {
        ParseResult::empty(format!("f{hash}.ts"), Language::TypeScript, hash)
    }

    #[test]
    fn hit_after_put() {
        let cache = ParseCache::new(16);
        cache.put(result(1));
        assert!(cache.get(Language::TypeScript, 1).is_some());
        assert!(cache.get(Language::TypeScript, 2).is_none());
    }

    #[test]
    fn cached_result_is_identical() {
        let cache = ParseCache::new(16);
        let original = result(7);
        cache.put(original.clone());
        let fetched = cache.get(Language::TypeScript, 7).unwrap();
        assert_eq!(fetched, original);
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = ParseCache::new(16);
        for i in 0..100 {
            cache.put(result(i));
        }
        assert!(cache.len() <= 16);
    }

    #[test]
    fn promoted_entries_survive_cold_sweep() {
        let cache = ParseCache::new(16);
        cache.put(result(1));
        // Second hit promotes to the protected segment.
        cache.get(Language::TypeScript, 1);
        for i in 100..160 {
            cache.put(result(i));
        }
        assert!(
            cache.get(Language::TypeScript, 1).is_some(),
            "hot entry evicted by cold scan"
        );
    }
}
