//! Conversion log trait.

use async_trait::async_trait;
use rateway_common::{ConversionRecord, NewConversionRecord};
use std::sync::Arc;

use crate::error::LedgerResult;

/// Append-only store of conversion records.
#[async_trait]
pub trait ConversionLog: Send + Sync {
    /// Store name, used in logs.
    fn name(&self) -> &str;

    /// Durably append a record and return it with its store-assigned id
    /// and timestamp. Returns only after the write is committed.
    async fn append(&self, record: NewConversionRecord) -> LedgerResult<ConversionRecord>;

    /// Number of records stored.
    async fn count(&self) -> LedgerResult<u64>;

    /// Most recent records, newest first.
    async fn recent(&self, limit: u32) -> LedgerResult<Vec<ConversionRecord>>;
}

/// Shared conversion log.
pub type SharedConversionLog = Arc<dyn ConversionLog>;
