//! Postgres-backed conversion log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rateway_common::{constants, ConversionRecord, DurationExt, NewConversionRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{LedgerError, LedgerResult};
use crate::log::ConversionLog;

/// Dedicated schema holding the conversion log.
pub const SCHEMA: &str = "rate";

/// Statements run at startup; each is idempotent.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS rate",
    r#"CREATE TABLE IF NOT EXISTS rate.conversion_logs (
        id BIGSERIAL PRIMARY KEY,
        base_currency VARCHAR NOT NULL,
        target_currency VARCHAR NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        converted_amount DOUBLE PRECISION NOT NULL,
        "timestamp" TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS ix_rate_conversion_logs_id ON rate.conversion_logs (id)",
];

const INSERT_RECORD: &str = r#"
    INSERT INTO rate.conversion_logs (base_currency, target_currency, amount, converted_amount)
    VALUES ($1, $2, $3, $4)
    RETURNING id, base_currency, target_currency, amount, converted_amount, "timestamp"
"#;

const SELECT_RECENT: &str = r#"
    SELECT id, base_currency, target_currency, amount, converted_amount, "timestamp"
    FROM rate.conversion_logs
    ORDER BY id DESC
    LIMIT $1
"#;

const COUNT_RECORDS: &str = "SELECT COUNT(*) FROM rate.conversion_logs";

/// Pool settings for [`PgConversionLog::connect`].
#[derive(Debug, Clone)]
pub struct PgConversionLogConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    pub acquire_timeout: Duration,
}

impl PgConversionLogConfig {
    /// Create config with database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: constants::connection_timeout().as_std(),
        }
    }

    /// Set maximum pooled connections.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversionLogRow {
    id: i64,
    base_currency: String,
    target_currency: String,
    amount: f64,
    converted_amount: f64,
    timestamp: DateTime<Utc>,
}

impl From<ConversionLogRow> for ConversionRecord {
    fn from(row: ConversionLogRow) -> Self {
        Self {
            id: row.id,
            base_currency: row.base_currency,
            target_currency: row.target_currency,
            amount: row.amount,
            converted_amount: row.converted_amount,
            timestamp: row.timestamp,
        }
    }
}

/// Conversion log stored in `rate.conversion_logs`.
pub struct PgConversionLog {
    pool: PgPool,
}

impl PgConversionLog {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool.
    pub async fn connect(config: &PgConversionLogConfig) -> LedgerResult<Self> {
        info!(
            max_connections = config.max_connections,
            acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
            "Connecting to conversion log database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| LedgerError::Connection(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Create the schema, table and index if absent.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!(schema = SCHEMA, "Conversion log schema ready");
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ConversionLog for PgConversionLog {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn append(&self, record: NewConversionRecord) -> LedgerResult<ConversionRecord> {
        // Returned to the pool on drop, on every exit path.
        let mut conn = self.pool.acquire().await?;

        let row: ConversionLogRow = sqlx::query_as(INSERT_RECORD)
            .bind(&record.base_currency)
            .bind(&record.target_currency)
            .bind(record.amount)
            .bind(record.converted_amount)
            .fetch_one(&mut *conn)
            .await?;

        debug!(id = row.id, "Conversion record appended");
        Ok(row.into())
    }

    async fn count(&self) -> LedgerResult<u64> {
        let count: i64 = sqlx::query_scalar(COUNT_RECORDS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn recent(&self, limit: u32) -> LedgerResult<Vec<ConversionRecord>> {
        let rows: Vec<ConversionLogRow> = sqlx::query_as(SELECT_RECENT)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
