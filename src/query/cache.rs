use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::core::types::PATH_SEPARATOR;
use crate::query::compiler::{Predicate, PredicateKey};
use crate::search::set_ops::IdSet;

/// Memoized sub-query results for one index.
///
/// Entries are evicted in insertion order: lookups use `peek`, which does
/// not refresh an entry's position.
pub struct QueryCache {
    cache: Mutex<Option<LruCache<QueryKey, IdSet>>>,
    pub size_limit: usize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
}

/// Sorted, de-duplicated predicate keys of one sub-query.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct QueryKey {
    pub predicates: Vec<PredicateKey>,
}

impl QueryKey {
    pub fn new(predicates: &[Predicate]) -> Self {
        let mut keys: Vec<PredicateKey> = predicates.iter().map(Predicate::key).collect();
        keys.sort();
        keys.dedup();
        QueryKey { predicates: keys }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (n, (path, target)) in self.predicates.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            for part in path {
                write!(f, "{}{}", part, PATH_SEPARATOR)?;
            }
            write!(f, "{}", target)?;
        }
        Ok(())
    }
}

impl QueryCache {
    pub fn new(size_limit: usize) -> Self {
        QueryCache {
            cache: Mutex::new(NonZeroUsize::new(size_limit).map(LruCache::new)),
            size_limit,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<IdSet> {
        let cache = self.cache.lock();
        let found = cache.as_ref().and_then(|c| c.peek(key)).cloned();
        self.record(found.is_some());
        found
    }

    pub fn put(&self, key: QueryKey, ids: IdSet) {
        let mut cache = self.cache.lock();
        if let Some(cache) = cache.as_mut() {
            Self::insert(cache, key, ids);
        }
    }

    /// Returns the cached ids for `key`, computing and storing them on a miss.
    ///
    /// The lock is held while `compute` runs, so concurrent callers resolve
    /// a given key once.
    pub fn get_or_compute<F>(&self, key: QueryKey, compute: F) -> IdSet
    where
        F: FnOnce() -> IdSet,
    {
        let mut guard = self.cache.lock();
        let Some(cache) = guard.as_mut() else {
            self.record(false);
            return compute();
        };

        if let Some(ids) = cache.peek(&key) {
            self.record(true);
            tracing::trace!(query = %key, "query cache hit");
            return ids.clone();
        }

        self.record(false);
        tracing::trace!(query = %key, "query cache miss");
        let ids = compute();
        Self::insert(cache, key, ids.clone());
        ids
    }

    fn insert(cache: &mut LruCache<QueryKey, IdSet>, key: QueryKey, ids: IdSet) {
        if let Some((evicted, _)) = cache.push(key.clone(), ids) {
            if evicted != key {
                tracing::debug!(query = %evicted, "evicted oldest query cache entry");
            }
        }
    }

    fn record(&self, hit: bool) {
        let counter = if hit { &self.hit_count } else { &self.miss_count };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        if let Some(cache) = self.cache.lock().as_mut() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.size_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
