//! In-memory cache store
//!
//! Process-local map used when no SQLite path is configured. State is lost on
//! restart; a multi-instance deployment gets independent caches per instance.

use crate::cache::{CacheResult, CacheStore, CachedResponse};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of [`CacheStore`]
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl MemoryCache {
    /// Creates an empty in-memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the cache holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<CachedResponse>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.clone())),
            None => Ok(None),
        }
    }

    fn put(&self, entry: CachedResponse) -> CacheResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    fn purge_expired(&self) -> CacheResult<usize> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn entry(key: &str, ttl_secs: i64) -> CachedResponse {
        CachedResponse::new(key, "mock", json!({"n": 1}), Duration::seconds(ttl_secs))
    }

    #[test]
    fn test_put_then_get() {
        let cache = MemoryCache::new();
        cache.put(entry("a", 60)).unwrap();

        let found = cache.get("a").unwrap().unwrap();
        assert_eq!(found.provider, "mock");
        assert_eq!(found.payload, json!({"n": 1}));
    }

    #[test]
    fn test_get_missing_key() {
        let cache = MemoryCache::new();
        assert!(cache.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = MemoryCache::new();
        let mut stale = entry("a", 60);
        stale.expires_at = Utc::now() - Duration::seconds(1);
        cache.put(stale).unwrap();

        assert!(cache.get("a").unwrap().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MemoryCache::new();
        cache.put(entry("a", 60)).unwrap();

        let replacement =
            CachedResponse::new("a", "serpapi", json!({"n": 2}), Duration::seconds(60));
        cache.put(replacement).unwrap();

        let found = cache.get("a").unwrap().unwrap();
        assert_eq!(found.provider, "serpapi");
        assert_eq!(found.payload, json!({"n": 2}));
    }

    #[test]
    fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache.put(entry("fresh", 60)).unwrap();
        let mut stale = entry("stale", 60);
        stale.expires_at = Utc::now() - Duration::seconds(1);
        cache.put(stale).unwrap();

        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.len(), 1);
    }
}
