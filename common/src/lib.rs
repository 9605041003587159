//! Rateway Common Types
//!
//! Shared types used across the Rateway workspace: currency codes,
//! rate tables, conversion log records and time constants.

pub mod currency;
pub mod rates;
pub mod record;
pub mod time;

pub use currency::*;
pub use rates::*;
pub use record::*;
pub use time::*;
