//! Ledger error types.

use thiserror::Error;

/// Errors raised by the conversion log.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Storage layer failure. The conversion must not be reported as done.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Could not reach the database.
    #[error("Database connection error: {0}")]
    Connection(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                LedgerError::Connection(err.to_string())
            }
            _ => LedgerError::Persistence(err.to_string()),
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
