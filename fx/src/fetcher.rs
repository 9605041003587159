//! Upstream rate fetcher.

use async_trait::async_trait;
use rateway_common::{constants, CurrencyCode, DurationExt, RateTable};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Default upstream rate source.
pub const CURRENCY_API_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies";

/// Source of full rate tables for a base currency.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Fetcher name, used in logs.
    fn name(&self) -> &str;

    /// Fetch every rate quoted against `base`.
    async fn fetch(&self, base: &CurrencyCode) -> FxResult<RateTable>;
}

/// Shared rate fetcher.
pub type SharedRateFetcher = Arc<dyn RateFetcher>;

/// Configuration for [`HttpRateFetcher`].
#[derive(Debug, Clone)]
pub struct HttpRateFetcherConfig {
    /// Base URL; `/{base}.json` is appended per request.
    pub base_url: String,
    /// Bound on the whole request, connect through body.
    pub timeout: Duration,
}

impl Default for HttpRateFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: CURRENCY_API_URL.to_string(),
            timeout: constants::upstream_timeout().as_std(),
        }
    }
}

/// Fetches rate tables over HTTP. One attempt per call, no retry.
pub struct HttpRateFetcher {
    http: Client,
    base_url: String,
}

impl HttpRateFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: HttpRateFetcherConfig) -> FxResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("rateway/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| FxError::UpstreamUnavailable {
                base: String::new(),
                status: None,
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the rate document for a base currency.
    pub fn url_for(&self, base: &CurrencyCode) -> String {
        format!("{}/{}.json", self.base_url, base.lower())
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, base: &CurrencyCode) -> FxResult<RateTable> {
        let url = self.url_for(base);
        debug!(url = %url, "Fetching rates from upstream");

        let resp = self.http.get(&url).send().await.map_err(|e| {
            debug!(url = %url, timeout = e.is_timeout(), "Upstream request failed");
            FxError::UpstreamUnavailable {
                base: base.lower().to_string(),
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FxError::UpstreamUnavailable {
                base: base.lower().to_string(),
                status: Some(status.as_u16()),
                message: format!("Failed to fetch rates: {}", status),
            });
        }

        let body = resp.bytes().await.map_err(|e| FxError::UpstreamUnavailable {
            base: base.lower().to_string(),
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
        })?;

        let payload: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| FxError::UpstreamFormat {
                base: base.lower().to_string(),
                message: format!("Invalid JSON: {}", e),
            })?;

        let rates = parse_payload(base, payload)?;
        debug!(url = %url, rates = rates.len(), "Fetched rate table");
        Ok(rates)
    }
}

/// Extract the rate table for `base` from an upstream document.
///
/// The document is an object holding a key equal to the lowercase base
/// code, whose value maps lowercase target codes to numeric rates. Other
/// top-level keys (such as `date`) are ignored.
pub fn parse_payload(base: &CurrencyCode, mut payload: serde_json::Value) -> FxResult<RateTable> {
    let rates = payload
        .get_mut(base.lower())
        .map(serde_json::Value::take)
        .ok_or_else(|| FxError::UpstreamFormat {
            base: base.lower().to_string(),
            message: format!("Payload has no \"{}\" key", base.lower()),
        })?;

    serde_json::from_value(rates).map_err(|e| FxError::UpstreamFormat {
        base: base.lower().to_string(),
        message: format!("Rates are not a map of numbers: {}", e),
    })
}

/// Mock rate fetcher for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateFetcher {
    tables: dashmap::DashMap<String, RateTable>,
    /// Upstream status to fail with; zero means succeed.
    failing_status: std::sync::atomic::AtomicU16,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateFetcher {
    /// Create a mock with no tables.
    pub fn new() -> Self {
        Self {
            tables: dashmap::DashMap::new(),
            failing_status: std::sync::atomic::AtomicU16::new(0),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set the table returned for a base currency.
    pub fn set_table(&self, base: &str, table: RateTable) {
        self.tables.insert(CurrencyCode::new(base).lower().to_string(), table);
    }

    /// Make every fetch fail with the given upstream status, or succeed again with `None`.
    pub fn fail_with_status(&self, status: Option<u16>) {
        self.failing_status
            .store(status.unwrap_or(0), std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of fetches performed.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockRateFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateFetcher for MockRateFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, base: &CurrencyCode) -> FxResult<RateTable> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let status = self.failing_status.load(std::sync::atomic::Ordering::SeqCst);
        if status != 0 {
            return Err(FxError::UpstreamUnavailable {
                base: base.lower().to_string(),
                status: Some(status),
                message: format!("Failed to fetch rates: {}", status),
            });
        }

        self.tables
            .get(base.lower())
            .map(|t| t.clone())
            .ok_or_else(|| FxError::UpstreamUnavailable {
                base: base.lower().to_string(),
                status: Some(404),
                message: "Failed to fetch rates: 404 Not Found".to_string(),
            })
    }
}
