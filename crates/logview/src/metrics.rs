//! Parse metrics, updated lock-free from the hot path.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one parse session. Relaxed ordering everywhere: the
/// counts feed diagnostics, not control flow.
#[derive(Debug, Default)]
pub struct ParseMetrics {
    // Line flow
    lines_fed: AtomicU64,
    continuation_lines: AtomicU64,
    orphan_continuations: AtomicU64,

    // Record flow
    records_started: AtomicU64,
    records_completed: AtomicU64,

    // Field anomalies
    date_failures: AtomicU64,
    oversized_fragments: AtomicU64,
    custom_fields: AtomicU64,
}

impl ParseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line_fed(&self) {
        self.lines_fed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_continuation_line(&self) {
        self.continuation_lines.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_orphan_continuation(&self) {
        self.orphan_continuations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_started(&self) {
        self.records_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_completed(&self) {
        self.records_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_date_failure(&self) {
        self.date_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_oversized_fragment(&self) {
        self.oversized_fragments.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_custom_field(&self) {
        self.custom_fields.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_fed: self.lines_fed.load(Ordering::Relaxed),
            continuation_lines: self.continuation_lines.load(Ordering::Relaxed),
            orphan_continuations: self.orphan_continuations.load(Ordering::Relaxed),
            records_started: self.records_started.load(Ordering::Relaxed),
            records_completed: self.records_completed.load(Ordering::Relaxed),
            date_failures: self.date_failures.load(Ordering::Relaxed),
            oversized_fragments: self.oversized_fragments.load(Ordering::Relaxed),
            custom_fields: self.custom_fields.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`ParseMetrics`] for diagnostics output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lines_fed: u64,
    pub continuation_lines: u64,
    pub orphan_continuations: u64,
    pub records_started: u64,
    pub records_completed: u64,
    pub date_failures: u64,
    pub oversized_fragments: u64,
    pub custom_fields: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let snapshot = ParseMetrics::new().snapshot();
        assert_eq!(snapshot.lines_fed, 0);
        assert_eq!(snapshot.records_started, 0);
        assert_eq!(snapshot.records_completed, 0);
        assert_eq!(snapshot.date_failures, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = ParseMetrics::new();
        metrics.record_line_fed();
        metrics.record_line_fed();
        metrics.record_started();
        metrics.record_continuation_line();
        metrics.record_completed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_fed, 2);
        assert_eq!(snapshot.records_started, 1);
        assert_eq!(snapshot.continuation_lines, 1);
        assert_eq!(snapshot.records_completed, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = ParseMetrics::new();
        metrics.record_line_fed();
        metrics.record_date_failure();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["lines_fed"], 1);
        assert_eq!(json["date_failures"], 1);
        assert_eq!(json["custom_fields"], 0);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(ParseMetrics::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let metrics = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    metrics.record_line_fed();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().lines_fed, 4000);
    }
}
