//! Metrics collection for service monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Conversion service metrics.
pub struct Metrics {
    /// Total conversions requested.
    pub conversions_total: AtomicU64,
    /// Conversions returned to the caller.
    pub conversions_success: AtomicU64,
    /// Conversions refused as client errors.
    pub conversions_rejected: AtomicU64,
    /// Conversions that failed server-side.
    pub conversions_failed: AtomicU64,
    /// Rate table served from cache.
    pub cache_hits: AtomicU64,
    /// Rate table absent from cache.
    pub cache_misses: AtomicU64,
    /// Upstream fetches attempted.
    pub upstream_fetches: AtomicU64,
    /// Upstream fetches that failed.
    pub upstream_failures: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            conversions_total: AtomicU64::new(0),
            conversions_success: AtomicU64::new(0),
            conversions_rejected: AtomicU64::new(0),
            conversions_failed: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            upstream_fetches: AtomicU64::new(0),
            upstream_failures: AtomicU64::new(0),
        }
    }

    /// Increment conversions requested.
    pub fn conversion_started(&self) {
        self.conversions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record conversion success.
    pub fn conversion_success(&self) {
        self.conversions_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record conversion rejection.
    pub fn conversion_rejected(&self) {
        self.conversions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record conversion failure.
    pub fn conversion_failed(&self) {
        self.conversions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record cache hit.
    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record cache miss.
    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record upstream fetch attempt.
    pub fn upstream_fetch(&self) {
        self.upstream_fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record upstream fetch failure.
    pub fn upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            conversions_total: self.conversions_total.load(Ordering::Relaxed),
            conversions_success: self.conversions_success.load(Ordering::Relaxed),
            conversions_rejected: self.conversions_rejected.load(Ordering::Relaxed),
            conversions_failed: self.conversions_failed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            upstream_fetches: self.upstream_fetches.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP rateway_conversions_total Total conversions requested
# TYPE rateway_conversions_total counter
rateway_conversions_total {}

# HELP rateway_conversions_success Total conversions returned
# TYPE rateway_conversions_success counter
rateway_conversions_success {}

# HELP rateway_conversions_rejected Total conversions refused as client errors
# TYPE rateway_conversions_rejected counter
rateway_conversions_rejected {}

# HELP rateway_conversions_failed Total conversions failed server-side
# TYPE rateway_conversions_failed counter
rateway_conversions_failed {}

# HELP rateway_rate_cache_hits Total rate cache hits
# TYPE rateway_rate_cache_hits counter
rateway_rate_cache_hits {}

# HELP rateway_rate_cache_misses Total rate cache misses
# TYPE rateway_rate_cache_misses counter
rateway_rate_cache_misses {}

# HELP rateway_upstream_fetches Total upstream rate fetches
# TYPE rateway_upstream_fetches counter
rateway_upstream_fetches {}

# HELP rateway_upstream_failures Total failed upstream rate fetches
# TYPE rateway_upstream_failures counter
rateway_upstream_failures {}
"#,
            snapshot.conversions_total,
            snapshot.conversions_success,
            snapshot.conversions_rejected,
            snapshot.conversions_failed,
            snapshot.cache_hits,
            snapshot.cache_misses,
            snapshot.upstream_fetches,
            snapshot.upstream_failures,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub conversions_total: u64,
    pub conversions_success: u64,
    pub conversions_rejected: u64,
    pub conversions_failed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub upstream_fetches: u64,
    pub upstream_failures: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;
