//! Redis-backed rate cache.

use async_trait::async_trait;
use chrono::Duration;
use rateway_common::{CurrencyCode, RateTable};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::{debug, info};

use crate::cache::{cache_key, RateCache};
use crate::error::{FxError, FxResult};

/// Rate cache stored in Redis as `rates:{base}` -> JSON rate table.
///
/// Entries are written with `SETEX`, so expiry is enforced by Redis.
pub struct RedisRateCache {
    connection: ConnectionManager,
}

impl RedisRateCache {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> FxResult<Self> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| FxError::Cache(format!("Failed to create Redis client: {}", e)))?;

        // Only the address is logged; the URL may carry credentials.
        let addr = format!("{:?}", client.get_connection_info().addr);

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| FxError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        info!(addr = %addr, "Connected to Redis");

        Ok(Self { connection })
    }
}

#[async_trait]
impl RateCache for RedisRateCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, base: &CurrencyCode) -> FxResult<Option<RateTable>> {
        let key = cache_key(base);
        let mut conn = self.connection.clone();

        let cached: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| FxError::Cache(format!("Redis GET failed: {}", e)))?;

        match cached {
            Some(json) => {
                let rates = RateTable::from_json(&json).map_err(|e| {
                    FxError::Cache(format!("Corrupt rate table under {}: {}", key, e))
                })?;
                debug!(key = %key, "Cache hit");
                Ok(Some(rates))
            }
            None => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, base: &CurrencyCode, rates: &RateTable, ttl: Duration) -> FxResult<()> {
        let key = cache_key(base);
        let json = rates
            .to_json()
            .map_err(|e| FxError::Cache(format!("Failed to serialize rate table: {}", e)))?;
        let ttl_secs = ttl.num_seconds().max(1) as u64;

        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(&key, json, ttl_secs)
            .await
            .map_err(|e| FxError::Cache(format!("Redis SETEX failed: {}", e)))?;

        debug!(key = %key, rates = rates.len(), ttl_secs, "Cached rate table in Redis");
        Ok(())
    }
}
