//! Rateway Server Binary
//!
//! Serves `POST /convert` backed by the rate cache, the upstream fetcher
//! and the Postgres conversion log.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rateway_fx::{
    HttpRateFetcher, HttpRateFetcherConfig, InMemoryRateCache, RedisRateCache, SharedRateCache,
};
use rateway_ledger::{PgConversionLog, PgConversionLogConfig};
use rateway_server::config::CacheBackend;
use rateway_server::metrics::Metrics;
use rateway_server::{create_router, server, AppState, ConversionService, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Rateway");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let log_config = PgConversionLogConfig::new(config.database_url.clone())
        .with_max_connections(config.db_max_connections)
        .with_acquire_timeout(config.conn_timeout);
    let conversion_log = PgConversionLog::connect(&log_config)
        .await
        .context("connecting to conversion log database")?;
    conversion_log
        .ensure_schema()
        .await
        .context("creating conversion log schema")?;
    let conversion_log = Arc::new(conversion_log);

    let cache: SharedRateCache = match config.cache_backend {
        CacheBackend::Redis => Arc::new(
            RedisRateCache::connect(&config.redis_url)
                .await
                .context("connecting to redis")?,
        ),
        CacheBackend::Memory => Arc::new(InMemoryRateCache::new()),
    };
    info!(backend = %config.cache_backend, "Rate cache ready");

    let fetcher = HttpRateFetcher::new(HttpRateFetcherConfig {
        base_url: config.currency_api_url.clone(),
        timeout: config.upstream_timeout,
    })
    .context("building upstream http client")?;

    let metrics = Arc::new(Metrics::new());
    let service = ConversionService::new(
        cache,
        Arc::new(fetcher),
        conversion_log.clone(),
        metrics,
    )
    .with_cache_ttl(config.cache_ttl);

    let router = create_router(AppState::new(Arc::new(service)), config.metrics_enabled);

    let listener = server::bind(&config.bind_addr()).await?;
    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        metrics_enabled = config.metrics_enabled,
        "Rateway running"
    );

    let result = server::run(listener, router, server::shutdown_signal()).await;

    conversion_log.close().await;
    result?;

    info!("Rateway shutdown complete");
    Ok(())
}
