//! Rateway Ledger
//!
//! Durable, append-only log of performed conversions.

pub mod error;
pub mod log;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use error::{LedgerError, LedgerResult};
pub use log::{ConversionLog, SharedConversionLog};
pub use postgres::{PgConversionLog, PgConversionLogConfig};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryConversionLog;
