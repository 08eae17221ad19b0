//! Short-lived memo of normalized query to recall results.
//!
//! Entries are stamped at write time and checked against a TTL on read, so
//! eviction is lazy: an expired entry is dropped by the read that finds it.
//! [`ResultCache::purge_expired`] is available for callers that want to
//! reclaim dead entries eagerly.
//!
//! Timestamps use [`tokio::time::Instant`] so that cache freshness follows
//! the runtime clock, including paused test time.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A cached result list with its write timestamp.
#[derive(Debug, Clone)]
struct CacheEntry<R> {
    stored_at: Instant,
    results: R,
}

/// TTL-bounded result cache keyed by normalized query.
#[derive(Debug)]
pub struct ResultCache<R> {
    entries: HashMap<String, CacheEntry<R>>,
}

impl<R> ResultCache<R> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up a query, treating entries older than `ttl` as absent.
    ///
    /// An expired entry found by this read is removed.
    pub fn get(&mut self, query: &str, ttl: Duration) -> Option<&R> {
        let fresh = self
            .entries
            .get(query)
            .is_some_and(|entry| entry.stored_at.elapsed() < ttl);
        if !fresh {
            self.entries.remove(query);
            return None;
        }
        self.entries.get(query).map(|entry| &entry.results)
    }

    /// Store results for a query, stamped now.
    ///
    /// Overwrites any previous entry for the same query.
    pub fn insert(&mut self, query: String, results: R) {
        self.entries.insert(
            query,
            CacheEntry {
                stored_at: Instant::now(),
                results,
            },
        );
    }

    /// Drop every entry older than `ttl`, returning how many were removed
    pub fn purge_expired(&mut self, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries currently held, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let mut cache = ResultCache::new();
        cache.insert("react hooks".into(), vec!["a", "b"]);

        advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get("react hooks", TTL), Some(&vec!["a", "b"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_after_ttl() {
        let mut cache = ResultCache::new();
        cache.insert("react hooks".into(), vec!["a"]);

        advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("react hooks", TTL), None);
        // The expired entry was dropped by the read that found it.
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_refreshes_timestamp() {
        let mut cache = ResultCache::new();
        cache.insert("q".into(), 1);

        advance(Duration::from_secs(50)).await;
        cache.insert("q".into(), 2);

        advance(Duration::from_secs(50)).await;
        // 100s since the first write, 50s since the second: still fresh.
        assert_eq!(cache.get("q", TTL), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let mut cache = ResultCache::new();
        cache.insert("old".into(), 1);
        advance(Duration::from_secs(45)).await;
        cache.insert("new".into(), 2);
        advance(Duration::from_secs(30)).await;

        assert_eq!(cache.purge_expired(TTL), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("new", TTL), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let mut cache = ResultCache::new();
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a", TTL), None);
    }
}
