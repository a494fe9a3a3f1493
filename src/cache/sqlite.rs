use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::{expiry_from, CacheStats, ListingCache};
use crate::core::FileCandidate;
use crate::error::{Result, SearchError};

/// SQLite-backed listing cache, shared by every process pointed at the same file
///
/// Schema:
/// ```sql
/// CREATE TABLE listing_cache (
///     cache_key TEXT PRIMARY KEY,
///     files_json TEXT NOT NULL,
///     hit_count INTEGER DEFAULT 0,
///     cached_at INTEGER NOT NULL,   -- unix millis
///     expires_at INTEGER NOT NULL   -- unix millis
/// );
/// ```
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    /// Create new SQLite cache
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS listing_cache (
                cache_key TEXT PRIMARY KEY,
                files_json TEXT NOT NULL,
                hit_count INTEGER DEFAULT 0,
                cached_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_listing_expires_at ON listing_cache(expires_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SearchError::Cache("connection lock poisoned".to_string()))
    }
}

fn millis_to_datetime(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::from_timestamp_millis)
}

#[async_trait]
impl ListingCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<FileCandidate>>> {
        let conn = self.lock()?;
        let now = Utc::now().timestamp_millis();

        let files_json: Option<String> = conn
            .query_row(
                "SELECT files_json FROM listing_cache WHERE cache_key = ?1 AND expires_at > ?2",
                params![key, now],
                |row| row.get(0),
            )
            .optional()?;

        let Some(files_json) = files_json else {
            return Ok(None);
        };

        conn.execute(
            "UPDATE listing_cache SET hit_count = hit_count + 1 WHERE cache_key = ?1",
            params![key],
        )?;

        Ok(Some(serde_json::from_str(&files_json)?))
    }

    async fn put(&self, key: &str, files: &[FileCandidate], ttl: Duration) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now();
        let files_json = serde_json::to_string(files)?;

        conn.execute(
            "INSERT OR REPLACE INTO listing_cache (cache_key, files_json, hit_count, cached_at, expires_at)
             VALUES (?1, ?2, COALESCE((SELECT hit_count FROM listing_cache WHERE cache_key = ?1), 0), ?3, ?4)",
            params![
                key,
                files_json,
                now.timestamp_millis(),
                expiry_from(now, ttl).timestamp_millis(),
            ],
        )?;

        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;

        let (total_entries, total_hits, oldest, newest): (u64, u64, Option<i64>, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(hit_count), 0), MIN(cached_at), MAX(cached_at) FROM listing_cache",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(CacheStats {
            total_entries,
            total_hits,
            avg_hit_count: CacheStats::avg(total_hits, total_entries),
            oldest_entry: millis_to_datetime(oldest),
            newest_entry: millis_to_datetime(newest),
        })
    }

    async fn cleanup(&self) -> Result<u64> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM listing_cache WHERE expires_at <= ?1",
            params![Utc::now().timestamp_millis()],
        )?;

        Ok(deleted as u64)
    }
}
