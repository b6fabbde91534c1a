//! Bounded, thread-safe LRU of query text -> embedding.
//!
//! The cache only saves embedding calls: a hit returns exactly the vector a
//! miss would have computed, so retrieval results never depend on its state.
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Embedding = Arc<Vec<f32>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct QueryEmbeddingCache {
    /// `None` when capacity is 0: every lookup computes.
    entries: Option<Mutex<LruCache<String, Embedding>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryEmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached vector for `key`, or run `compute`, insert and return it.
    ///
    /// The lock is not held while `compute` runs; two concurrent misses on the
    /// same key both compute and the later insert wins with an identical value.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> anyhow::Result<Embedding>
    where
        F: FnOnce() -> anyhow::Result<Vec<f32>>,
    {
        let Some(entries) = &self.entries else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(compute()?));
        };
        if let Some(hit) = entries.lock().get(key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute()?);
        entries.lock().put(key.to_string(), Arc::clone(&value));
        Ok(value)
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (len, capacity) = match &self.entries {
            Some(entries) => {
                let guard = entries.lock();
                (guard.len(), guard.cap().get())
            }
            None => (0, 0),
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn hit_skips_compute() {
        let cache = QueryEmbeddingCache::new(4);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(vec![1.0, 2.0])
        };
        let first = cache.get_or_compute("q", compute).unwrap();
        let second = cache.get_or_compute("q", || panic!("should be cached")).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.len, stats.capacity), (1, 1, 1, 4));
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = QueryEmbeddingCache::new(2);
        cache.get_or_compute("a", || Ok(vec![1.0])).unwrap();
        cache.get_or_compute("b", || Ok(vec![2.0])).unwrap();
        cache.get_or_compute("a", || panic!("a is cached")).unwrap();
        cache.get_or_compute("c", || Ok(vec![3.0])).unwrap();
        assert_eq!(cache.stats().len, 2);
        let recomputed = Cell::new(false);
        cache
            .get_or_compute("b", || {
                recomputed.set(true);
                Ok(vec![2.0])
            })
            .unwrap();
        assert!(recomputed.get(), "b was least recently used and must have been evicted");
    }

    #[test]
    fn zero_capacity_always_computes() {
        let cache = QueryEmbeddingCache::new(0);
        let calls = Cell::new(0);
        for _ in 0..3 {
            cache
                .get_or_compute("q", || {
                    calls.set(calls.get() + 1);
                    Ok(vec![0.5])
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.stats().capacity, 0);
    }

    #[test]
    fn failed_compute_is_not_cached() {
        let cache = QueryEmbeddingCache::new(2);
        assert!(cache.get_or_compute("q", || anyhow::bail!("model offline")).is_err());
        assert_eq!(cache.stats().len, 0);
        assert_eq!(*cache.get_or_compute("q", || Ok(vec![7.0])).unwrap(), vec![7.0]);
    }

    #[test]
    fn concurrent_inserts_stay_bounded() {
        let cache = Arc::new(QueryEmbeddingCache::new(8));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let key = format!("q{}", (t * 7 + i) % 20);
                        let v = cache.get_or_compute(&key, || Ok(vec![i as f32])).unwrap();
                        assert_eq!(v.len(), 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let stats = cache.stats();
        assert!(stats.len <= 8);
        assert_eq!(stats.hits + stats.misses, 400);
    }
}
