use std::num::NonZeroUsize;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_128;
use crate::core::error::Result;
use crate::core::types::Entities;
use crate::index::inverted::InvertedIndex;
use crate::query::cache::QueryCache;

/// Identifies the collection an index was built from.
///
/// Engines sharing one [`IndexCache`] over collections that change should
/// pass explicit version tokens; a fingerprint only guards against
/// accidental reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    /// Caller-supplied version token.
    Version(String),
    /// XXH3-128 of the id field and the serialized collection, with its
    /// byte length and record count.
    Fingerprint { hash: u128, bytes: usize, records: usize },
}

impl CollectionKey {
    pub fn fingerprint(entities: &Entities, key: &str) -> Result<CollectionKey> {
        let mut bytes = Vec::with_capacity(key.len() + 1);
        bytes.extend_from_slice(key.as_bytes());
        bytes.push(0);
        serde_json::to_writer(&mut bytes, entities)?;

        Ok(CollectionKey::Fingerprint {
            hash: xxh3_128(&bytes),
            bytes: bytes.len(),
            records: entities.len(),
        })
    }
}

/// A built index together with the memoized queries run against it.
pub struct CachedIndex {
    pub index: InvertedIndex,
    pub queries: QueryCache,
}

impl CachedIndex {
    pub fn new(index: InvertedIndex, query_cache_size: usize) -> Self {
        CachedIndex {
            index,
            queries: QueryCache::new(query_cache_size),
        }
    }
}

type Slot = Arc<OnceLock<Arc<CachedIndex>>>;

/// Bounded cache of built indexes, one slot per collection.
///
/// Oldest-inserted slots are evicted first. A slot is created under the map
/// lock and filled outside of it, so each collection is indexed at most once
/// while it stays cached, even with concurrent callers.
pub struct IndexCache {
    slots: Mutex<Option<LruCache<CollectionKey, Slot>>>,
    max_size: usize,
    hit_count: AtomicUsize,
    build_count: AtomicUsize,
}

impl IndexCache {
    pub fn new(max_size: usize) -> Self {
        IndexCache {
            slots: Mutex::new(NonZeroUsize::new(max_size).map(LruCache::new)),
            max_size,
            hit_count: AtomicUsize::new(0),
            build_count: AtomicUsize::new(0),
        }
    }

    /// Get the cached index for `key`, or build and store it.
    pub fn get_or_build<F>(&self, key: &CollectionKey, build: F) -> Arc<CachedIndex>
    where
        F: FnOnce() -> CachedIndex,
    {
        let slot = {
            let mut slots = self.slots.lock();
            match slots.as_mut() {
                Some(slots) => match slots.peek(key) {
                    Some(slot) => slot.clone(),
                    None => {
                        let slot = Slot::default();
                        if let Some((evicted, _)) = slots.push(key.clone(), slot.clone()) {
                            tracing::debug!(collection = ?evicted, "evicted oldest cached index");
                        }
                        slot
                    }
                },
                None => Slot::default(),
            }
        };

        let mut built = false;
        let cached = slot
            .get_or_init(|| {
                built = true;
                self.build_count.fetch_add(1, Ordering::Relaxed);
                Arc::new(build())
            })
            .clone();

        if !built {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
        }
        cached
    }

    /// Already built index for `key`, if any.
    pub fn get(&self, key: &CollectionKey) -> Option<Arc<CachedIndex>> {
        let slots = self.slots.lock();
        slots.as_ref()?.peek(key)?.get().cloned()
    }

    pub fn contains(&self, key: &CollectionKey) -> bool {
        self.get(key).is_some()
    }

    /// Drop the index for `key` along with its memoized queries.
    pub fn invalidate(&self, key: &CollectionKey) {
        if let Some(slots) = self.slots.lock().as_mut() {
            slots.pop(key);
        }
    }

    pub fn clear(&self) {
        if let Some(slots) = self.slots.lock().as_mut() {
            slots.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().as_ref().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> IndexCacheStats {
        IndexCacheStats {
            size: self.len(),
            max_size: self.max_size,
            hit_count: self.hit_count.load(Ordering::Relaxed),
            build_count: self.build_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for IndexCache {
    fn default() -> Self {
        IndexCache::new(10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexCacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hit_count: usize,
    pub build_count: usize,
}
