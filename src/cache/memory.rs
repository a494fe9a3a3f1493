use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::cache::{expiry_from, CacheStats, ListingCache};
use crate::core::FileCandidate;
use crate::error::Result;

struct MemoryEntry {
    files: Vec<FileCandidate>,
    hit_count: u64,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// In-process listing cache for a single server instance
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<FileCandidate>>> {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();

        Ok(entries
            .get_mut(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| {
                entry.hit_count += 1;
                entry.files.clone()
            }))
    }

    async fn put(&self, key: &str, files: &[FileCandidate], ttl: Duration) -> Result<()> {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;
        let hit_count = entries.get(key).map(|e| e.hit_count).unwrap_or(0);

        entries.insert(
            key.to_string(),
            MemoryEntry {
                files: files.to_vec(),
                hit_count,
                cached_at: now,
                expires_at: expiry_from(now, ttl),
            },
        );
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.entries.lock().await;
        let total_entries = entries.len() as u64;
        let total_hits = entries.values().map(|e| e.hit_count).sum();

        Ok(CacheStats {
            total_entries,
            total_hits,
            avg_hit_count: CacheStats::avg(total_hits, total_entries),
            oldest_entry: entries.values().map(|e| e.cached_at).min(),
            newest_entry: entries.values().map(|e| e.cached_at).max(),
        })
    }

    async fn cleanup(&self) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<FileCandidate> {
        vec![
            FileCandidate::new("f1", "427520.zip"),
            FileCandidate::new("f2", "892970.zip"),
        ]
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = MemoryCache::new();
        cache.put("drive:a", &listing(), Duration::from_secs(60)).await.unwrap();

        let files = cache.get("drive:a").await.unwrap().unwrap();
        assert_eq!(files.len(), 2);
        assert!(cache.get("drive:b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.put("drive:a", &listing(), Duration::ZERO).await.unwrap();

        assert!(cache.get("drive:a").await.unwrap().is_none());
        assert_eq!(cache.cleanup().await.unwrap(), 1);
        assert_eq!(cache.stats().await.unwrap().total_entries, 0);
    }

    #[tokio::test]
    async fn test_stats_count_hits() {
        let cache = MemoryCache::new();
        cache.put("a", &listing(), Duration::from_secs(60)).await.unwrap();
        cache.put("b", &[], Duration::from_secs(60)).await.unwrap();

        cache.get("a").await.unwrap();
        cache.get("a").await.unwrap();
        cache.get("b").await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_hits, 3);
        assert_eq!(stats.avg_hit_count, 1.5);
        assert!(stats.oldest_entry.is_some());
    }
}
