//! Cache Store.
//!
//! Byte-bounded LRU store mapping request path to a complete cached
//! response body. A hash index points at slots in the recency list, so
//! lookup is O(1) and promote/evict never walk the list. Two limits
//! apply: a per-object maximum (larger bodies are never stored) and an
//! aggregate maximum (tail entries are evicted until a new body fits).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::entry::CacheEntry;
use crate::cache::list::RecencyList;
use crate::config::CacheConfig;

/// LRU cache of complete origin responses.
#[derive(Debug)]
pub struct CacheStore {
    /// Key → slot in the recency list.
    index: HashMap<String, usize>,
    /// Entries, parallel to the list's slot space.
    entries: Vec<Option<Arc<CacheEntry>>>,
    /// Recency order, most-recently-used first.
    list: RecencyList,
    /// Sum of all stored body lengths.
    total_bytes: usize,
    /// Aggregate size limit.
    max_total_bytes: usize,
    /// Single-object size limit.
    max_object_bytes: usize,
}

impl CacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
            list: RecencyList::new(),
            total_bytes: 0,
            max_total_bytes: config.max_total_bytes,
            max_object_bytes: config.max_object_bytes,
        }
    }

    /// Looks up an entry without touching recency order.
    pub fn find(&self, key: &str) -> Option<&Arc<CacheEntry>> {
        let slot = *self.index.get(key)?;
        self.entries[slot].as_ref()
    }

    /// Promotes an entry to most-recently-used. Returns whether the key
    /// was present. No-op when the entry is already at the head.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&slot) => {
                self.list.promote(slot);
                true
            }
            None => false,
        }
    }

    /// Inserts a body under `key`, evicting least-recently-used entries
    /// until it fits. Returns `false` (and stores nothing) when the body
    /// exceeds the per-object or aggregate maximum. An existing entry
    /// under the same key is replaced.
    pub fn insert(&mut self, key: String, body: Vec<u8>) -> bool {
        let size = body.len();
        if size > self.max_object_bytes || size > self.max_total_bytes {
            return false;
        }

        if self.index.contains_key(&key) {
            self.remove(&key);
        }

        while self.total_bytes + size > self.max_total_bytes {
            if self.evict_tail().is_none() {
                break;
            }
        }

        let slot = self.list.push_front();
        if slot >= self.entries.len() {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(Arc::new(CacheEntry::new(key.clone(), body)));
        self.index.insert(key, slot);
        self.total_bytes += size;

        debug_assert_eq!(self.total_bytes, self.sum_of_lengths());
        debug_assert!(self.total_bytes <= self.max_total_bytes);
        true
    }

    /// Removes an entry by key. Returns the entry if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Arc<CacheEntry>> {
        let slot = self.index.remove(key)?;
        self.list.detach(slot);
        let entry = self.entries[slot].take()?;
        self.total_bytes -= entry.len();
        Some(entry)
    }

    /// Evicts the least-recently-used entry.
    fn evict_tail(&mut self) -> Option<Arc<CacheEntry>> {
        let slot = self.list.tail()?;
        let entry = self.entries[slot].take()?;
        self.list.detach(slot);
        self.index.remove(entry.key());
        self.total_bytes -= entry.len();
        tracing::debug!(key = entry.key(), size = entry.len(), "cache entry evicted");
        Some(entry)
    }

    /// Whether a key is currently stored. Does not touch recency order.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Sum of stored body lengths.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn sum_of_lengths(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .map(|entry| entry.len())
            .sum()
    }
}

/// Cloneable handle to the cache shared by all workers.
///
/// The store is the only shared mutable state in the proxy. Every compound
/// operation (lookup + touch, replace + evict + insert) runs inside one
/// exclusive critical section, so two workers can never race a promote
/// against an eviction of the same entry. Critical sections are short and
/// never await; hit bodies leave the section as `Arc` clones and are
/// written to the client unlocked.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<CacheStore>>,
}

impl SharedCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheStore::new(config))),
        }
    }

    /// Looks up `key` and promotes it to most-recently-used in the same
    /// critical section. Returns a shared handle to the entry for writing
    /// to the client outside the lock.
    pub fn lookup(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let mut store = self.locked();
        let entry = store.find(key).cloned()?;
        store.touch(key);
        Some(entry)
    }

    /// Transfers ownership of a response body into the store.
    /// Returns whether the body was stored.
    pub fn store(&self, key: String, body: Vec<u8>) -> bool {
        self.locked().insert(key, body)
    }

    /// Whether a key is currently stored, without promoting it.
    pub fn contains(&self, key: &str) -> bool {
        self.locked().contains(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.locked().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().is_empty()
    }

    /// Sum of stored body lengths.
    pub fn total_bytes(&self) -> usize {
        self.locked().total_bytes()
    }

    fn locked(&self) -> MutexGuard<'_, CacheStore> {
        // A poisoned lock means a worker panicked mid-mutation; the store's
        // invariants are re-checked by debug asserts, so keep serving.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(max_total: usize, max_object: usize) -> CacheStore {
        CacheStore::new(&CacheConfig {
            max_total_bytes: max_total,
            max_object_bytes: max_object,
        })
    }

    #[test]
    fn find_does_not_promote() {
        let mut store = store_with(200, 200);
        assert!(store.insert("/a".into(), vec![1; 50]));
        assert!(store.insert("/b".into(), vec![2; 50]));

        // /a is the LRU entry; find must not change that.
        assert!(store.find("/a").is_some());
        assert!(store.insert("/c".into(), vec![3; 150]));
        assert!(!store.contains("/a"));
        assert!(store.contains("/b"));
        assert!(store.contains("/c"));
    }

    #[test]
    fn touch_protects_from_eviction() {
        let mut store = store_with(100, 60);
        assert!(store.insert("/a".into(), vec![1; 50]));
        assert!(store.insert("/b".into(), vec![2; 50]));

        assert!(store.touch("/a"));
        assert!(store.insert("/c".into(), vec![3; 50]));

        assert!(store.contains("/a"));
        assert!(!store.contains("/b"));
        assert!(store.contains("/c"));
    }

    #[test]
    fn touch_at_head_is_idempotent() {
        let mut store = store_with(200, 200);
        assert!(store.insert("/a".into(), vec![1; 10]));
        assert!(store.insert("/b".into(), vec![2; 10]));

        assert!(store.touch("/b"));
        assert!(store.touch("/b"));
        assert!(store.touch("/b"));

        // /a is still the eviction candidate.
        assert!(store.insert("/c".into(), vec![3; 185]));
        assert!(!store.contains("/a"));
        assert!(store.contains("/b"));
    }

    #[test]
    fn oversized_object_is_rejected() {
        let mut store = store_with(1000, 100);
        assert!(store.insert("/fits".into(), vec![0; 100]));
        assert!(!store.insert("/too-big".into(), vec![0; 101]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 100);
    }

    #[test]
    fn eviction_follows_recency_order() {
        // Scenario: /a (50) then /b (50) with an 80-byte aggregate limit;
        // inserting /b must evict /a, and a later /a request misses.
        let mut store = store_with(80, 60);
        assert!(store.insert("/a.html".into(), vec![1; 50]));
        assert!(store.insert("/b.html".into(), vec![2; 50]));

        assert!(!store.contains("/a.html"));
        assert!(store.contains("/b.html"));
        assert_eq!(store.total_bytes(), 50);
    }

    #[test]
    fn duplicate_key_replaces_old_entry() {
        let mut store = store_with(200, 100);
        assert!(store.insert("/a".into(), vec![1; 40]));
        assert!(store.insert("/a".into(), vec![2; 60]));

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 60);
        assert_eq!(store.find("/a").unwrap().body()[0], 2);
    }

    #[test]
    fn remove_updates_accounting() {
        let mut store = store_with(200, 100);
        assert!(store.insert("/a".into(), vec![1; 40]));
        let removed = store.remove("/a").unwrap();
        assert_eq!(removed.len(), 40);
        assert_eq!(store.total_bytes(), 0);
        assert!(store.is_empty());
        assert!(store.remove("/a").is_none());
    }

    #[test]
    fn shared_lookup_promotes() {
        let cache = SharedCache::new(&CacheConfig {
            max_total_bytes: 100,
            max_object_bytes: 60,
        });
        assert!(cache.store("/a".into(), vec![1; 50]));
        assert!(cache.store("/b".into(), vec![2; 50]));

        let hit = cache.lookup("/a").unwrap();
        assert_eq!(hit.len(), 50);

        assert!(cache.store("/c".into(), vec![3; 50]));
        assert!(cache.contains("/a"));
        assert!(!cache.contains("/b"));
    }

    #[test]
    fn shared_handles_see_one_store() {
        let cache = SharedCache::new(&CacheConfig {
            max_total_bytes: 100,
            max_object_bytes: 60,
        });
        let other = cache.clone();
        assert!(cache.store("/a".into(), vec![0; 10]));
        assert_eq!(other.len(), 1);
        assert_eq!(other.total_bytes(), 10);
    }
}
