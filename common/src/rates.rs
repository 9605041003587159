//! Rate tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::CurrencyCode;

/// Exchange rates for one base currency, keyed by lowercase target code.
///
/// Serializes as a flat JSON object, e.g. `{"eur": 0.9, "gbp": 0.78}`,
/// which is also the shape stored in the rate cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(BTreeMap<String, f64>);

impl RateTable {
    /// Create an empty rate table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rate. The target code is lowercased.
    pub fn insert(&mut self, target: impl AsRef<str>, rate: f64) {
        self.0.insert(target.as_ref().to_lowercase(), rate);
    }

    /// Builder-style insert.
    pub fn with_rate(mut self, target: impl AsRef<str>, rate: f64) -> Self {
        self.insert(target, rate);
        self
    }

    /// Look up the rate for a target currency.
    pub fn rate_for(&self, target: &CurrencyCode) -> Option<f64> {
        self.0.get(target.lower()).copied()
    }

    /// Number of target currencies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to the JSON blob stored in the cache.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a JSON blob previously produced by [`RateTable::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
