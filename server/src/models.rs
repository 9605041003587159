//! Request and response bodies.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Body of `POST /convert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub amount: f64,
    pub base_currency: String,
    pub target_currency: String,
}

impl ConversionRequest {
    pub fn new(
        amount: f64,
        base_currency: impl Into<String>,
        target_currency: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            base_currency: base_currency.into(),
            target_currency: target_currency.into(),
        }
    }
}

/// Accepts `100`, `100.5` or `"100.5"`; rejects other strings and
/// non-finite values.
fn amount_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    let amount = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid amount {:?}", s)))?,
    };

    if !amount.is_finite() {
        return Err(de::Error::custom("amount must be finite"));
    }
    Ok(amount)
}

/// Successful conversion. Currency codes are uppercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub base_currency: String,
    pub target_currency: String,
    pub amount: f64,
    pub converted_amount: f64,
    pub rate: f64,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}
