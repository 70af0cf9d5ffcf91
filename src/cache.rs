//! Bounded least-recently-used cache for API pages.
//!
//! Wraps [`lru::LruCache`] with hit/miss/eviction counters. Not synchronized
//! on its own; the fetcher wraps it in a `Mutex`.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Key of one memoized page request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    /// ISO3 codes joined with `;`.
    pub countries: String,
    pub indicator: String,
    /// `start:end`.
    pub date_range: String,
    pub page: u32,
    pub per_page: u32,
}

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

#[derive(Debug)]
pub struct PageCache<K: Hash + Eq, V> {
    inner: LruCache<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> PageCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Capacity below 1 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(cap),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.inner.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(v.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or replace `key`, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: K, value: V) {
        let replacing = self.inner.contains(&key);
        // `push` hands back either the replaced value or the evicted entry.
        if self.inner.push(key, value).is_some() && !replacing {
            self.evictions += 1;
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.inner.len(),
            capacity: self.inner.cap().get(),
        }
    }
}
