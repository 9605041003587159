//! Conversion errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rateway_fx::FxError;
use rateway_ledger::LedgerError;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors returned by the conversion workflow.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Target currency is not in the base currency's rate table.
    #[error("Invalid target currency")]
    InvalidTargetCurrency,

    /// Amount or converted amount is not a finite number.
    #[error("Invalid amount")]
    InvalidAmount,

    /// Rate source failed or returned an unusable payload.
    #[error("Failed to fetch exchange rates: {0}")]
    Upstream(#[source] FxError),

    /// Rate cache backend failed.
    #[error("Rate cache failure: {0}")]
    Cache(#[source] FxError),

    /// Conversion log write failed; no result may be returned.
    #[error("Failed to record conversion: {0}")]
    Persistence(#[from] LedgerError),
}

impl ConvertError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConvertError::InvalidTargetCurrency | ConvertError::InvalidAmount => {
                StatusCode::BAD_REQUEST
            }
            ConvertError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ConvertError::Cache(_) | ConvertError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller. Internal details stay in the logs.
    pub fn detail(&self) -> &'static str {
        match self {
            ConvertError::InvalidTargetCurrency => "Invalid target currency",
            ConvertError::InvalidAmount => "Invalid amount",
            ConvertError::Upstream(_) => "Failed to fetch exchange rates",
            ConvertError::Cache(_) | ConvertError::Persistence(_) => "Internal Server Error",
        }
    }

    /// Get error code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvertError::InvalidTargetCurrency => "INVALID_TARGET_CURRENCY",
            ConvertError::InvalidAmount => "INVALID_AMOUNT",
            ConvertError::Upstream(_) => "UPSTREAM_ERROR",
            ConvertError::Cache(_) => "CACHE_ERROR",
            ConvertError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Check if the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.detail().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> FxError {
        FxError::UpstreamUnavailable {
            base: "usd".into(),
            status: Some(500),
            message: "500 Internal Server Error".into(),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ConvertError::InvalidTargetCurrency.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ConvertError::Upstream(upstream()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ConvertError::Upstream(FxError::UpstreamFormat {
                base: "usd".into(),
                message: "missing key".into(),
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ConvertError::Cache(FxError::Cache("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ConvertError::Persistence(LedgerError::Persistence("disk full".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_hide_internals() {
        let err = ConvertError::Persistence(LedgerError::Persistence("relation missing".into()));

        assert_eq!(err.detail(), "Internal Server Error");
        assert!(err.to_string().contains("relation missing"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_upstream_detail() {
        assert_eq!(
            ConvertError::Upstream(upstream()).detail(),
            "Failed to fetch exchange rates"
        );
    }
}
