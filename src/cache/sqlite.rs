//! SQLite-backed cache store
//!
//! Persists provider responses in an `api_cache` table so repeated analyses of
//! the same domain survive process restarts. Timestamps are stored as RFC 3339
//! strings and payloads as JSON text.

use crate::cache::{CacheError, CacheResult, CacheStore, CachedResponse};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS api_cache (
    cache_key  TEXT PRIMARY KEY,
    provider   TEXT NOT NULL,
    payload    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
";

/// SQLite implementation of [`CacheStore`]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Opens (or creates) a cache database at the given path
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a throwaway in-memory database
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn parse_timestamp(key: &str, raw: &str) -> CacheResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| CacheError::CorruptEntry(key.to_string()))
    }
}

impl CacheStore for SqliteCache {
    fn get(&self, key: &str) -> CacheResult<Option<CachedResponse>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT provider, payload, created_at, expires_at
                 FROM api_cache WHERE cache_key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                },
            )
            .optional()?;

        let (provider, payload, created_at, expires_at) = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let entry = CachedResponse {
            key: key.to_string(),
            provider,
            payload: serde_json::from_str(&payload)?,
            created_at: Self::parse_timestamp(key, &created_at)?,
            expires_at: Self::parse_timestamp(key, &expires_at)?,
        };

        if entry.is_expired() {
            conn.execute("DELETE FROM api_cache WHERE cache_key = ?1", params![key])?;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn put(&self, entry: CachedResponse) -> CacheResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO api_cache
             (cache_key, provider, payload, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.key,
                entry.provider,
                serde_json::to_string(&entry.payload)?,
                entry.created_at.to_rfc3339(),
                entry.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn purge_expired(&self) -> CacheResult<usize> {
        let conn = self.conn.lock().unwrap();
        let dropped = conn.execute(
            "DELETE FROM api_cache WHERE expires_at <= ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(dropped)
    }
}
