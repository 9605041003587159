//! In-memory conversion log for tests.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rateway_common::{ConversionRecord, NewConversionRecord};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{LedgerError, LedgerResult};
use crate::log::ConversionLog;

/// Conversion log kept in a vector, with sequential ids.
pub struct InMemoryConversionLog {
    records: Mutex<Vec<ConversionRecord>>,
    failing: AtomicBool,
}

impl InMemoryConversionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every append fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All records, oldest first.
    pub fn records(&self) -> Vec<ConversionRecord> {
        self.records.lock().clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if no records were written.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for InMemoryConversionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionLog for InMemoryConversionLog {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, record: NewConversionRecord) -> LedgerResult<ConversionRecord> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerError::Persistence("simulated storage failure".to_string()));
        }

        let mut records = self.records.lock();
        let id = records.len() as i64 + 1;
        let stored = ConversionRecord::from_new(id, record, Utc::now());
        records.push(stored.clone());
        Ok(stored)
    }

    async fn count(&self) -> LedgerResult<u64> {
        Ok(self.records.lock().len() as u64)
    }

    async fn recent(&self, limit: u32) -> LedgerResult<Vec<ConversionRecord>> {
        let records = self.records.lock();
        Ok(records.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rateway_common::CurrencyCode;

    fn new_record(amount: f64) -> NewConversionRecord {
        NewConversionRecord::new(
            &CurrencyCode::from("usd"),
            &CurrencyCode::from("eur"),
            amount,
            amount * 0.9,
        )
    }

    #[tokio::test]
    async fn test_append_assigns_ids() {
        let log = InMemoryConversionLog::new();

        let first = log.append(new_record(100.0)).await.unwrap();
        let second = log.append(new_record(100.0)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(log.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let log = InMemoryConversionLog::new();
        for amount in [1.0, 2.0, 3.0] {
            log.append(new_record(amount)).await.unwrap();
        }

        let recent = log.recent(2).await.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].amount, 3.0);
        assert_eq!(recent[1].amount, 2.0);
    }

    #[tokio::test]
    async fn test_failing_append_writes_nothing() {
        let log = InMemoryConversionLog::new();
        log.set_failing(true);

        let result = log.append(new_record(100.0)).await;

        assert!(matches!(result, Err(LedgerError::Persistence(_))));
        assert!(log.is_empty());
    }
}
