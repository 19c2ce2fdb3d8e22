//! Response cache for upstream provider payloads
//!
//! This module provides a generic put/get-with-expiry store used by the SERP
//! discovery client. Expiry is checked lazily at read time; an expired entry
//! behaves exactly like a missing one. Two backends are provided: an in-memory
//! map and a SQLite table.

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt cache entry for key {0}")]
    CorruptEntry(String),
}

/// Result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// A cached provider response
///
/// Entries are write-once: a later `put` under the same key replaces the whole
/// entry (last write wins), but an entry is never mutated in place.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The cache key this entry was stored under
    pub key: String,

    /// Name of the provider that produced the payload
    pub provider: String,

    /// The raw payload as JSON
    pub payload: serde_json::Value,

    /// When the entry was written
    pub created_at: DateTime<Utc>,

    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Builds a new entry expiring `ttl` from now
    pub fn new(key: &str, provider: &str, payload: serde_json::Value, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            key: key.to_string(),
            provider: provider.to_string(),
            payload,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the entry has passed its expiry time
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Trait for cache store backends
///
/// Implementations must be safe to share across tasks; reads of expired
/// entries return `None`. Concurrent writers to the same key are tolerated,
/// with the last write winning.
pub trait CacheStore: Send + Sync {
    /// Looks up a non-expired entry
    fn get(&self, key: &str) -> CacheResult<Option<CachedResponse>>;

    /// Stores an entry, replacing any previous entry under the same key
    fn put(&self, entry: CachedResponse) -> CacheResult<()>;

    /// Removes expired entries, returning how many were dropped
    ///
    /// Not required for correctness (expiry is enforced at read time); offered
    /// as an explicit maintenance call for long-lived processes.
    fn purge_expired(&self) -> CacheResult<usize>;
}

/// Builds a deterministic cache key from discovery parameters
///
/// The key is a hex-encoded SHA-256 over the prefix and all parts, so the same
/// domain/country/language/location always maps to the same entry.
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    for part in parts {
        hasher.update(b":");
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key("domain_keywords", &["example.com", "US", "en", ""]);
        let b = cache_key("domain_keywords", &["example.com", "US", "en", ""]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cache_key_varies_with_parts() {
        let a = cache_key("domain_keywords", &["example.com", "US", "en", ""]);
        let b = cache_key("domain_keywords", &["example.com", "DE", "de", ""]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CachedResponse::new(
            "k",
            "mock",
            serde_json::json!({"keywords": []}),
            Duration::hours(24),
        );
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_with_past_expiry_is_expired() {
        let mut entry =
            CachedResponse::new("k", "mock", serde_json::json!({}), Duration::hours(24));
        entry.expires_at = Utc::now() - Duration::seconds(1);
        assert!(entry.is_expired());
    }
}
