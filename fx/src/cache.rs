//! Rate caching with TTL support.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rateway_common::{CurrencyCode, RateTable};
use std::sync::Arc;
use tracing::debug;

use crate::error::FxResult;

/// Cache key for a base currency's rate table.
pub fn cache_key(base: &CurrencyCode) -> String {
    format!("rates:{}", base.lower())
}

/// Key-value store of rate tables keyed by base currency.
///
/// Implementations normalize the key with [`cache_key`]. A miss is
/// `Ok(None)`; errors are reserved for backend failures.
#[async_trait]
pub trait RateCache: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Get the rate table for a base currency if present and not expired.
    async fn get(&self, base: &CurrencyCode) -> FxResult<Option<RateTable>>;

    /// Store the rate table for a base currency with the given TTL.
    async fn put(&self, base: &CurrencyCode, rates: &RateTable, ttl: Duration) -> FxResult<()>;
}

/// Shared rate cache.
pub type SharedRateCache = Arc<dyn RateCache>;

/// Cached rate table entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    rates: RateTable,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(rates: RateTable, ttl: Duration) -> Self {
        Self {
            rates,
            cached_at: Utc::now(),
            ttl,
        }
    }

    fn is_valid(&self) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age < self.ttl
    }
}

/// In-process rate cache backed by a concurrent map.
///
/// Expired entries read as absent and are dropped on access. There is no
/// capacity bound.
pub struct InMemoryRateCache {
    cache: DashMap<String, CacheEntry>,
}

impl InMemoryRateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Get the number of entries in cache, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }

    /// Drop `key` only if it is still expired; a concurrent `put` may have
    /// replaced it since it was read.
    fn remove_if_expired(&self, key: &str) {
        self.cache.remove_if(key, |_, entry| !entry.is_valid());
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.cache.len();
        let valid = self.cache.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total.saturating_sub(valid),
        }
    }
}

impl Default for InMemoryRateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateCache for InMemoryRateCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, base: &CurrencyCode) -> FxResult<Option<RateTable>> {
        let key = cache_key(base);

        if let Some(entry) = self.cache.get(&key) {
            if entry.is_valid() {
                debug!(key = %key, "Cache hit");
                return Ok(Some(entry.rates.clone()));
            }
            debug!(key = %key, "Cache entry expired");
            drop(entry);
            self.remove_if_expired(&key);
        }

        debug!(key = %key, "Cache miss");
        Ok(None)
    }

    async fn put(&self, base: &CurrencyCode, rates: &RateTable, ttl: Duration) -> FxResult<()> {
        let key = cache_key(base);
        debug!(key = %key, rates = rates.len(), ttl_secs = ttl.num_seconds(), "Caching rate table");
        self.cache.insert(key, CacheEntry::new(rates.clone(), ttl));
        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rateway_common::constants;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    fn make_table() -> RateTable {
        RateTable::new()
            .with_rate("eur", 0.91)
            .with_rate("gbp", 0.78)
            .with_rate("jpy", 151.2)
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(&CurrencyCode::from("USD")), "rates:usd");
    }

    #[tokio::test]
    async fn test_cache_put_and_get() {
        let cache = InMemoryRateCache::new();
        let usd = CurrencyCode::from("usd");
        let table = make_table();

        cache.put(&usd, &table, constants::rate_cache_ttl()).await.unwrap();

        let cached = cache.get(&usd).await.unwrap().unwrap();
        assert_eq!(cached, table);
    }

    #[tokio::test]
    async fn test_cache_key_is_case_insensitive() {
        let cache = InMemoryRateCache::new();
        let table = make_table();

        cache
            .put(&CurrencyCode::from("USD"), &table, constants::rate_cache_ttl())
            .await
            .unwrap();

        for spelling in ["usd", "Usd", "USD"] {
            let cached = cache.get(&CurrencyCode::from(spelling)).await.unwrap();
            assert_eq!(cached.as_ref(), Some(&table));
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = InMemoryRateCache::new();

        assert!(cache.get(&CurrencyCode::from("usd")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_expiry() {
        let cache = InMemoryRateCache::new();
        let usd = CurrencyCode::from("usd");

        cache
            .put(&usd, &make_table(), Duration::milliseconds(50))
            .await
            .unwrap();

        // Should be valid immediately
        assert!(cache.get(&usd).await.unwrap().is_some());

        sleep(StdDuration::from_millis(60));

        assert!(cache.get(&usd).await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = InMemoryRateCache::new();
        let usd = CurrencyCode::from("usd");

        cache
            .put(&usd, &RateTable::new().with_rate("eur", 0.9), constants::rate_cache_ttl())
            .await
            .unwrap();
        cache
            .put(&usd, &RateTable::new().with_rate("eur", 0.95), constants::rate_cache_ttl())
            .await
            .unwrap();

        let cached = cache.get(&usd).await.unwrap().unwrap();
        assert_eq!(cached.rate_for(&CurrencyCode::from("eur")), Some(0.95));
    }

    #[tokio::test]
    async fn test_stats_and_eviction() {
        let cache = InMemoryRateCache::new();

        cache
            .put(&CurrencyCode::from("usd"), &make_table(), constants::rate_cache_ttl())
            .await
            .unwrap();
        cache
            .put(&CurrencyCode::from("gbp"), &make_table(), Duration::milliseconds(10))
            .await
            .unwrap();

        sleep(StdDuration::from_millis(20));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);

        cache.evict_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expired_entries, 0);
    }

    #[tokio::test]
    async fn test_expired_cleanup_keeps_fresh_replacement() {
        let cache = InMemoryRateCache::new();
        let usd = CurrencyCode::from("usd");

        cache
            .put(&usd, &make_table(), Duration::milliseconds(10))
            .await
            .unwrap();
        sleep(StdDuration::from_millis(20));

        // A reader saw the stale entry; a writer replaces it before cleanup.
        let fresh = RateTable::new().with_rate("eur", 0.93);
        cache.put(&usd, &fresh, constants::rate_cache_ttl()).await.unwrap();
        cache.remove_if_expired(&cache_key(&usd));

        assert_eq!(cache.get(&usd).await.unwrap(), Some(fresh));
    }
}
