//! Bounded in-process cache store
//!
//! Holds at most `max_entries` addresses. When an insert would exceed that,
//! expired entries are purged first and then the oldest inserted entry is
//! evicted. Reads never reorder entries (FIFO, not LRU).

use crate::cache::{CacheEntry, CacheStore};
use crate::error::Result;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// In-memory store with FIFO eviction
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    max_entries: usize,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
}

impl Inner {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
        before - self.entries.len()
    }
}

impl MemoryStore {
    /// Create a store holding at most `max_entries` addresses
    ///
    /// A capacity of zero is bumped to one.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Maximum number of entries held
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Insert a fully formed entry
    ///
    /// Overwriting an existing key keeps its original insertion position.
    pub async fn insert(&self, entry: CacheEntry) {
        let mut inner = self.inner.lock().await;

        if let Some(existing) = inner.entries.get_mut(&entry.key) {
            *existing = entry;
            return;
        }

        if inner.entries.len() >= self.max_entries {
            inner.purge_expired();
        }
        while inner.entries.len() >= self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            tracing::debug!(key = %oldest, "Evicted oldest cache entry");
        }

        inner.order.push_back(entry.key.clone());
        inner.entries.insert(entry.key.clone(), entry);
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.inner.lock().await.purge_expired()
    }

    /// Number of physically held entries (expired ones included until purged)
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove all entries
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(crate::constants::cache::MAX_ENTRIES)
    }
}

impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut inner = self.inner.lock().await;

        let expired = match inner.entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_expired(),
        };

        if expired {
            inner.remove(key);
            return Ok(None);
        }

        Ok(inner.entries.get(key).cloned())
    }

    async fn put(&self, key: &str, address: &str, ttl_secs: u64) -> Result<()> {
        self.insert(CacheEntry::new(key, address, ttl_secs)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn expired_entry(key: &str) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            address: "Stale".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new(10);
        store.put("40.7128:-74.006", "123 Main St", 604_800).await.unwrap();

        let entry = store.get("40.7128:-74.006").await.unwrap().unwrap();
        assert_eq!(entry.address, "123 Main St");
        assert_eq!(entry.key, "40.7128:-74.006");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = MemoryStore::new(10);
        assert!(store.get("0:0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store = MemoryStore::new(10);
        store.insert(expired_entry("1:1")).await;
        assert_eq!(store.len().await, 1);

        assert!(store.get("1:1").await.unwrap().is_none());
        // Lazily removed on read
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_overwrite_last_write_wins() {
        let store = MemoryStore::new(10);
        store.put("k", "first", 60).await.unwrap();
        store.put("k", "second", 60).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().unwrap().address, "second");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_address_is_stored() {
        let store = MemoryStore::new(10);
        store.put("k", "", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap().address, "");
    }

    #[tokio::test]
    async fn test_fifo_eviction_when_full() {
        let store = MemoryStore::new(2);
        store.put("a", "A", 60).await.unwrap();
        store.put("b", "B", 60).await.unwrap();

        // Reading "a" must not protect it from eviction
        assert!(store.get("a").await.unwrap().is_some());

        store.put("c", "C", 60).await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_some());
        assert!(store.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let store = MemoryStore::new(2);
        store.put("a", "A", 60).await.unwrap();
        store.put("b", "B", 60).await.unwrap();
        store.put("a", "A2", 60).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("a").await.unwrap().unwrap().address, "A2");
        assert!(store.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_entries_purged_before_eviction() {
        let store = MemoryStore::new(2);
        store.put("live", "Live", 60).await.unwrap();
        store.insert(expired_entry("dead")).await;

        store.put("new", "New", 60).await.unwrap();

        // The expired entry made room; the oldest live entry survives
        assert!(store.get("live").await.unwrap().is_some());
        assert!(store.get("new").await.unwrap().is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let store = MemoryStore::new(10);
        store.insert(expired_entry("x")).await;
        store.insert(expired_entry("y")).await;
        store.put("z", "Z", 60).await.unwrap();

        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.len().await, 1);

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        assert_eq!(MemoryStore::new(0).capacity(), 1);
        assert_eq!(MemoryStore::default().capacity(), 100);
    }

    #[tokio::test]
    async fn test_concurrent_puts_distinct_keys() {
        let store = std::sync::Arc::new(MemoryStore::new(100));
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(&format!("{}:0", i), "addr", 60).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 20);
    }
}
