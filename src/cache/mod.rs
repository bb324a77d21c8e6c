// src/cache/mod.rs
//
// Keyed TTL cache for query results. A key is the canonical tuple of
// everything that shaped the request; two requests with identical keys
// inside the freshness window share one fetch. Writing a new value for a
// key never touches entries under other keys, so pages cached for an older
// selection stay valid for that selection.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// The originals refetched a page after five seconds of staleness.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

/// Shared, clonable cache. All clones see the same entries.
pub struct QueryCache<K, V> {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        QueryCache {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        QueryCache {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Value for `key` iff it is younger than the freshness window.
    pub fn get_fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Stale-allowed lookup. Used as placeholder data while a refetch for
    /// the same key is in flight, so the caller never flickers to empty.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|e| e.value.clone())
    }

    /// Last write for a key wins; concurrent fetches for the same key are
    /// harmless because they store identical results.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Serve a fresh entry, or run `fetch` and cache its result. Errors are
    /// not cached; the next caller fetches again.
    pub async fn ensure<E, F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get_fresh(&key) {
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
