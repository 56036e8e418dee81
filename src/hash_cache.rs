//! In-memory infohash cache shared between producers and resolution
//!
//! Content producers (scrapers, feed watchers) record what they learn about
//! an infohash here: a pre-resolved usenet (NZB) link, a blacklist mark, or
//! a downloaded mark. The resolution engine only ever *reads* the usenet
//! link; it never writes back.
//!
//! Entries expire a fixed TTL after their last write and the map is bounded:
//! when full, expired entries are dropped first, then the oldest entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::config::HashCacheConfig;

#[derive(Clone, Debug)]
struct CacheEntry {
    usenet_link: Option<String>,
    blacklisted: bool,
    downloaded: bool,
    written_at: Instant,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            usenet_link: None,
            blacklisted: false,
            downloaded: false,
            written_at: Instant::now(),
        }
    }
}

/// Bounded, TTL-expiring map from infohash to per-hash metadata
///
/// Keys are normalized to lowercase on every access, so producers and the
/// resolution engine never have to agree on hash casing. Safe for concurrent
/// use; intended to be shared as an `Arc<HashCache>`.
#[derive(Debug)]
pub struct HashCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
    ttl: Duration,
}

impl HashCache {
    /// Create a cache sized by `config`
    pub fn new(config: HashCacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: config.max_entries,
            ttl: config.ttl,
        }
    }

    /// The pre-resolved usenet link for `infohash`, if one is cached
    ///
    /// This is the only cache operation the resolution engine performs.
    /// Expired entries read as absent.
    pub async fn usenet_link(&self, infohash: &str) -> Option<String> {
        self.read_entry(infohash, |entry| entry.usenet_link.clone())
            .await
            .flatten()
    }

    /// Record a pre-resolved usenet link for `infohash`
    pub async fn set_usenet_link(&self, infohash: &str, link: impl Into<String>) {
        let link = link.into();
        self.write_entry(infohash, |entry| entry.usenet_link = Some(link))
            .await;
    }

    /// Mark `infohash` as not worth resolving again
    pub async fn blacklist(&self, infohash: &str) {
        self.write_entry(infohash, |entry| entry.blacklisted = true)
            .await;
    }

    /// Whether `infohash` carries an unexpired blacklist mark
    pub async fn is_blacklisted(&self, infohash: &str) -> bool {
        self.read_entry(infohash, |entry| entry.blacklisted)
            .await
            .unwrap_or(false)
    }

    /// Mark `infohash` as already downloaded
    pub async fn mark_downloaded(&self, infohash: &str) {
        self.write_entry(infohash, |entry| entry.downloaded = true)
            .await;
    }

    /// Whether `infohash` carries an unexpired downloaded mark
    pub async fn is_downloaded(&self, infohash: &str) -> bool {
        self.read_entry(infohash, |entry| entry.downloaded)
            .await
            .unwrap_or(false)
    }

    /// Drop everything known about `infohash`
    pub async fn remove(&self, infohash: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(&infohash.to_lowercase());
    }

    /// Drop all entries
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Number of unexpired entries
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|entry| !self.is_expired(entry))
            .count()
    }

    /// Whether the cache holds no unexpired entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        entry.written_at.elapsed() > self.ttl
    }

    async fn read_entry<T>(&self, infohash: &str, f: impl FnOnce(&CacheEntry) -> T) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(&infohash.to_lowercase())?;
        if self.is_expired(entry) {
            return None;
        }
        Some(f(entry))
    }

    /// Upsert under the write lock; every write refreshes the entry's TTL
    /// clock and may trigger eviction when inserting a new hash at capacity.
    async fn write_entry(&self, infohash: &str, f: impl FnOnce(&mut CacheEntry)) {
        let key = infohash.to_lowercase();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            entries.retain(|_, entry| !self.is_expired(entry));
            if entries.len() >= self.max_entries {
                // Still full after pruning: drop the entry written longest ago
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.written_at)
                    .map(|(hash, _)| hash.clone());
                if let Some(hash) = oldest {
                    entries.remove(&hash);
                }
            }
        }

        let entry = entries.entry(key).or_insert_with(CacheEntry::new);
        f(entry);
        entry.written_at = Instant::now();
    }
}
