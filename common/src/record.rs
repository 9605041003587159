//! Conversion log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

/// A conversion that has not been persisted yet.
///
/// Currency codes are taken from [`CurrencyCode`] so they are always
/// stored uppercase regardless of how the caller spelled them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConversionRecord {
    pub base_currency: String,
    pub target_currency: String,
    pub amount: f64,
    pub converted_amount: f64,
}

impl NewConversionRecord {
    /// Create a record from normalized codes.
    pub fn new(
        base: &CurrencyCode,
        target: &CurrencyCode,
        amount: f64,
        converted_amount: f64,
    ) -> Self {
        Self {
            base_currency: base.upper(),
            target_currency: target.upper(),
            amount,
            converted_amount,
        }
    }
}

/// A persisted conversion log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Base currency, uppercase.
    pub base_currency: String,
    /// Target currency, uppercase.
    pub target_currency: String,
    /// Amount in the base currency.
    pub amount: f64,
    /// Amount in the target currency.
    pub converted_amount: f64,
    /// Creation time, defaulted by the store.
    pub timestamp: DateTime<Utc>,
}

impl ConversionRecord {
    /// Attach store-assigned fields to a new record.
    pub fn from_new(id: i64, record: NewConversionRecord, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            base_currency: record.base_currency,
            target_currency: record.target_currency,
            amount: record.amount,
            converted_amount: record.converted_amount,
            timestamp,
        }
    }
}
