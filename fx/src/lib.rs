//! Rateway FX
//!
//! Exchange rate retrieval for the conversion service.
//!
//! # Features
//!
//! - Read-through rate cache keyed by base currency with a fixed TTL
//! - Redis and in-process cache backends
//! - Upstream rate fetcher with a single bounded HTTP call per miss
//!
//! # Example
//!
//! ```rust,ignore
//! use rateway_fx::{HttpRateFetcher, HttpRateFetcherConfig, InMemoryRateCache, RateCache, RateFetcher};
//! use rateway_common::{constants, CurrencyCode};
//!
//! let cache = InMemoryRateCache::new();
//! let fetcher = HttpRateFetcher::new(HttpRateFetcherConfig::default())?;
//!
//! let usd = CurrencyCode::from("USD");
//! let rates = match cache.get(&usd).await? {
//!     Some(rates) => rates,
//!     None => {
//!         let rates = fetcher.fetch(&usd).await?;
//!         cache.put(&usd, &rates, constants::rate_cache_ttl()).await?;
//!         rates
//!     }
//! };
//! ```

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod redis_cache;

pub use cache::{cache_key, InMemoryRateCache, RateCache, SharedRateCache};
pub use error::{FxError, FxResult};
pub use fetcher::{HttpRateFetcher, HttpRateFetcherConfig, RateFetcher, SharedRateFetcher};
pub use redis_cache::RedisRateCache;

#[cfg(any(test, feature = "test-utils"))]
pub use fetcher::MockRateFetcher;
