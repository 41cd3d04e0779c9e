//! LRU cache for reachability results, keyed `(root, direction, depth)`.
//! Any call-graph mutation invalidates the whole cache - partial
//! invalidation is not worth tracking edge provenance for.

use std::collections::VecDeque;
use std::sync::Mutex;

use drift_core::types::collections::FxHashMap;

use super::bfs::{ReachabilityResult, TraversalDirection};

const DEFAULT_CAPACITY: usize = 256;

type Key = (String, TraversalDirection, u32);

pub struct ReachabilityCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

struct Inner {
    entries: FxHashMap<Key, ReachabilityResult>,
    order: VecDeque<Key>,
}

impl ReachabilityCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: FxHashMap::default(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(8),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    pub fn get(
        &self,
        root: &str,
        direction: TraversalDirection,
        depth: u32,
    ) -> Option<ReachabilityResult> {
        let key = (root.to_string(), direction, depth);
        let mut inner = self.inner.lock().unwrap();
        if let Some(result) = inner.entries.get(&key).cloned() {
            // Refresh recency.
            if let Some(pos) = inner.order.iter().position(|k| k == &key) {
                inner.order.remove(pos);
            }
            inner.order.push_back(key);
            Some(result)
        } else {
            None
        }
    }

    pub fn put(
        &self,
        root: &str,
        direction: TraversalDirection,
        depth: u32,
        result: ReachabilityResult,
    ) {
        let key = (root.to_string(), direction, depth);
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.insert(key.clone(), result).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(victim) => {
                    inner.entries.remove(&victim);
                }
                None => break,
            }
        }
    }

    /// Called on every call-graph mutation.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ReachabilityResult {
        ReachabilityResult {
            reached: FxHashMap::default(),
            predecessors: FxHashMap::default(),
            max_depth_reached: 3,
            saturated: true,
        }
    }

    #[test]
    fn round_trip_and_invalidate() {
        let cache = ReachabilityCache::new(8);
        cache.put("a.ts::f", TraversalDirection::Forward, 20, result());
        assert!(cache
            .get("a.ts::f", TraversalDirection::Forward, 20)
            .is_some());
        // Different key dimensions miss.
        assert!(cache.get("a.ts::f", TraversalDirection::Inverse, 20).is_none());
        assert!(cache.get("a.ts::f", TraversalDirection::Forward, 5).is_none());

        cache.invalidate_all();
        assert!(cache
            .get("a.ts::f", TraversalDirection::Forward, 20)
            .is_none());
    }

    #[test]
    fn lru_evicts_cold_entries() {
        let cache = ReachabilityCache::new(8);
        for i in 0..20 {
            cache.put(&format!("k{i}"), TraversalDirection::Forward, 20, result());
        }
        assert!(cache.len() <= 8);
        assert!(cache.get("k19", TraversalDirection::Forward, 20).is_some());
        assert!(cache.get("k0", TraversalDirection::Forward, 20).is_none());
    }
}
