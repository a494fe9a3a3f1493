pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::core::FileCandidate;
use crate::error::Result;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Default lifetime of a cached file listing
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(60);

/// Cache key for a drive folder listing
pub fn listing_key(folder_id: &str) -> String {
    format!("drive:{}", folder_id.trim())
}

/// Trait for TTL-bounded file listing caches, injected into listing providers
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Get a listing that has not expired yet
    async fn get(&self, key: &str) -> Result<Option<Vec<FileCandidate>>>;

    /// Store a listing for `ttl`
    async fn put(&self, key: &str, files: &[FileCandidate], ttl: Duration) -> Result<()>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Drop expired entries, returning how many were removed
    async fn cleanup(&self) -> Result<u64>;
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_hits: u64,
    pub avg_hit_count: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

impl CacheStats {
    pub(crate) fn avg(total_hits: u64, total_entries: u64) -> f64 {
        if total_entries > 0 {
            total_hits as f64 / total_entries as f64
        } else {
            0.0
        }
    }
}

pub(crate) fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
