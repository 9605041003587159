//! Server configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rateway_common::{constants, DurationExt};
use rateway_fx::fetcher::CURRENCY_API_URL;

/// Which rate cache backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// Shared Redis instance.
    Redis,
    /// Per-process map; entries are not shared between replicas.
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(format!("Unknown cache backend: {}", other)),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Database URL for the conversion log.
    pub database_url: String,
    /// Maximum pooled database connections.
    pub db_max_connections: u32,
    /// Database connection acquire timeout.
    pub conn_timeout: Duration,
    /// Redis URL for the rate cache.
    pub redis_url: String,
    /// Rate cache backend.
    pub cache_backend: CacheBackend,
    /// Upstream rate source base URL.
    pub currency_api_url: String,
    /// Upstream request timeout.
    pub upstream_timeout: Duration,
    /// Rate cache entry lifetime.
    pub cache_ttl: chrono::Duration,
    /// Expose the metrics endpoint.
    pub metrics_enabled: bool,
    /// Log level, used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8000,
            database_url: String::new(),
            db_max_connections: 10,
            conn_timeout: constants::connection_timeout().as_std(),
            redis_url: "redis://localhost:6379".to_string(),
            cache_backend: CacheBackend::Redis,
            currency_api_url: CURRENCY_API_URL.to_string(),
            upstream_timeout: constants::upstream_timeout().as_std(),
            cache_ttl: constants::rate_cache_ttl(),
            metrics_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable values keep their defaults; [`ServerConfig::validate`]
    /// catches the ones that matter.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("LISTEN_PORT").and_then(|p| p.parse().ok()) {
            config.listen_port = port;
        }

        if let Some(url) = lookup("DB_URL").or_else(|| lookup("DATABASE_URL")) {
            config.database_url = url;
        }

        if let Some(max) = lookup("DB_MAX_CONNECTIONS").and_then(|m| m.parse().ok()) {
            config.db_max_connections = max;
        }

        if let Some(ms) = lookup("CONN_TIMEOUT").and_then(|t| t.parse().ok()) {
            config.conn_timeout = Duration::from_millis(ms);
        }

        if let Some(url) = lookup("REDIS_URL") {
            config.redis_url = url;
        }

        if let Some(backend) = lookup("CACHE_BACKEND").and_then(|b| b.parse().ok()) {
            config.cache_backend = backend;
        }

        if let Some(enabled) = lookup("METRICS_ENABLED") {
            config.metrics_enabled = !matches!(enabled.as_str(), "0" | "false" | "no" | "off");
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.database_url.is_empty() {
            return Err("Database URL cannot be empty (set DB_URL)".to_string());
        }

        if self.cache_backend == CacheBackend::Redis && self.redis_url.is_empty() {
            return Err("Redis URL cannot be empty with the redis cache backend".to_string());
        }

        if self.conn_timeout.is_zero() {
            return Err("Connection timeout cannot be zero".to_string());
        }

        if self.db_max_connections == 0 {
            return Err("Database pool needs at least one connection".to_string());
        }

        Ok(())
    }
}
