//! Global atomic counters for triage observability.
//!
//! Counters are incremented silently by [`TriageService`](crate::service::TriageService).
//! Call [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    runs: AtomicU64,
    source_failures: AtomicU64,
    records_skipped: AtomicU64,
    auto_converted: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            source_failures: AtomicU64::new(0),
            records_skipped: AtomicU64::new(0),
            auto_converted: AtomicU64::new(0),
        }
    }

    /// Increment the completed-runs counter by one.
    pub fn inc_runs(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs", "counter incremented");
    }

    /// Increment the source-failures counter by one.
    pub fn inc_source_failures(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "source_failures", "counter incremented");
    }

    /// Add `n` records set aside before partitioning.
    pub fn add_records_skipped(&self, n: u64) {
        self.records_skipped.fetch_add(n, Ordering::Relaxed);
    }

    /// Add `n` reception participants moved to the waitlist.
    pub fn add_auto_converted(&self, n: u64) {
        self.auto_converted.fetch_add(n, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs = self.runs(),
            source_failures = self.source_failures(),
            records_skipped = self.records_skipped(),
            auto_converted = self.auto_converted(),
        );
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn source_failures(&self) -> u64 {
        self.source_failures.load(Ordering::Relaxed)
    }

    pub fn records_skipped(&self) -> u64 {
        self.records_skipped.load(Ordering::Relaxed)
    }

    pub fn auto_converted(&self) -> u64 {
        self.auto_converted.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs.store(0, Ordering::Relaxed);
        self.source_failures.store(0, Ordering::Relaxed);
        self.records_skipped.store(0, Ordering::Relaxed);
        self.auto_converted.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_runs();
        m.inc_runs();
        assert_eq!(m.runs(), 2);

        m.inc_source_failures();
        assert_eq!(m.source_failures(), 1);

        m.add_records_skipped(3);
        m.add_auto_converted(4);
        assert_eq!(m.records_skipped(), 3);
        assert_eq!(m.auto_converted(), 4);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_runs();
        m.inc_source_failures();
        m.add_records_skipped(2);
        m.add_auto_converted(1);
        m.reset();
        assert_eq!(m.runs(), 0);
        assert_eq!(m.source_failures(), 0);
        assert_eq!(m.records_skipped(), 0);
        assert_eq!(m.auto_converted(), 0);
    }
}
