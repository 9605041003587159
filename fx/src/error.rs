//! FX error types.

use thiserror::Error;

/// Errors that can occur while retrieving exchange rates.
#[derive(Debug, Error)]
pub enum FxError {
    /// Upstream answered with a non-success status, or could not be reached.
    #[error("Rate source unavailable for {base}: {message}")]
    UpstreamUnavailable {
        base: String,
        status: Option<u16>,
        message: String,
    },

    /// Upstream payload could not be parsed or lacks the base currency key.
    #[error("Malformed rate payload for {base}: {message}")]
    UpstreamFormat { base: String, message: String },

    /// Cache backend failure.
    #[error("Rate cache error: {0}")]
    Cache(String),
}

impl FxError {
    /// Upstream HTTP status, if one was received.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FxError::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }

    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FxError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            FxError::UpstreamFormat { .. } => "UPSTREAM_FORMAT",
            FxError::Cache(_) => "CACHE",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
