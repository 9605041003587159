//! Conversion workflow.

use chrono::Duration;
use rateway_common::{constants, CurrencyCode, NewConversionRecord, RateTable};
use rateway_fx::{SharedRateCache, SharedRateFetcher};
use rateway_ledger::SharedConversionLog;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::ConvertError;
use crate::metrics::SharedMetrics;
use crate::models::{ConversionRequest, ConversionResponse};

/// Converts amounts using cached rates and records every conversion.
///
/// Holds shared handles only; one instance serves all requests. Concurrent
/// misses on the same base currency each fetch upstream and overwrite the
/// same cache entry.
pub struct ConversionService {
    cache: SharedRateCache,
    fetcher: SharedRateFetcher,
    log: SharedConversionLog,
    metrics: SharedMetrics,
    cache_ttl: Duration,
}

impl ConversionService {
    /// Create a service with the default cache TTL.
    pub fn new(
        cache: SharedRateCache,
        fetcher: SharedRateFetcher,
        log: SharedConversionLog,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            cache,
            fetcher,
            log,
            metrics,
            cache_ttl: constants::rate_cache_ttl(),
        }
    }

    /// Override the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the metrics handle.
    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    /// Rate table for `base`, read through the cache.
    pub async fn rates_for(&self, base: &CurrencyCode) -> Result<RateTable, ConvertError> {
        if let Some(rates) = self.cache.get(base).await.map_err(ConvertError::Cache)? {
            self.metrics.cache_hit();
            debug!(base = %base, cache = self.cache.name(), "Using cached rates");
            return Ok(rates);
        }
        self.metrics.cache_miss();

        self.metrics.upstream_fetch();
        let rates = self.fetcher.fetch(base).await.map_err(|e| {
            self.metrics.upstream_failure();
            warn!(
                base = %base,
                kind = e.kind(),
                status = ?e.upstream_status(),
                error = %e,
                "Rate fetch failed"
            );
            ConvertError::Upstream(e)
        })?;

        self.cache
            .put(base, &rates, self.cache_ttl)
            .await
            .map_err(ConvertError::Cache)?;

        Ok(rates)
    }

    /// Convert an amount and record the conversion.
    ///
    /// The result is only returned once the record is durably written.
    #[instrument(skip(self, request), fields(
        request_id = %Uuid::new_v4(),
        base = %request.base_currency,
        target = %request.target_currency,
    ))]
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionResponse, ConvertError> {
        self.metrics.conversion_started();

        let result = self.run(request).await;
        match &result {
            Ok(_) => self.metrics.conversion_success(),
            Err(e) if e.is_client_error() => {
                self.metrics.conversion_rejected();
                warn!(code = e.error_code(), "Conversion rejected");
            }
            // Already logged with its status or format detail in `rates_for`.
            Err(ConvertError::Upstream(_)) => self.metrics.conversion_failed(),
            Err(e) => {
                self.metrics.conversion_failed();
                error!(code = e.error_code(), error = %e, "Conversion failed");
            }
        }
        result
    }

    async fn run(&self, request: ConversionRequest) -> Result<ConversionResponse, ConvertError> {
        let base = CurrencyCode::new(&request.base_currency);
        let target = CurrencyCode::new(&request.target_currency);

        let rates = self.rates_for(&base).await?;

        let rate = rates
            .rate_for(&target)
            .ok_or(ConvertError::InvalidTargetCurrency)?;

        let converted_amount = request.amount * rate;
        if !request.amount.is_finite() || !converted_amount.is_finite() {
            return Err(ConvertError::InvalidAmount);
        }

        let record = self
            .log
            .append(NewConversionRecord::new(
                &base,
                &target,
                request.amount,
                converted_amount,
            ))
            .await?;

        info!(
            record_id = record.id,
            amount = request.amount,
            converted_amount,
            rate,
            "Conversion completed"
        );

        Ok(ConversionResponse {
            base_currency: base.upper(),
            target_currency: target.upper(),
            amount: request.amount,
            converted_amount,
            rate,
        })
    }
}
