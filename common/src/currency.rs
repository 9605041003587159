//! Currency code normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A currency code as supplied by a caller, trimmed and case-folded.
///
/// Rate lookups and cache keys use the lowercase form; persisted records
/// and responses use the uppercase form. The code is not checked against
/// any registry: an unknown code simply never matches a rate table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Normalize a raw code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    /// Lowercase form, used for lookups and cache keys.
    pub fn lower(&self) -> &str {
        &self.0
    }

    /// Uppercase form, used for storage and responses.
    pub fn upper(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.upper())
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}
