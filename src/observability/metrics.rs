//! Engine counters
//!
//! Counters only, monotonic, reset on process start. Relaxed ordering is
//! enough: readers only ever want an approximate point-in-time view.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the query engine
#[derive(Debug, Default)]
pub struct EngineMetrics {
    plans_accepted: AtomicU64,
    plans_rejected: AtomicU64,
    pages_fetched: AtomicU64,
    dimension_lookups: AtomicU64,
    data_source_failures: AtomicU64,
    persistence_failures: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_plans_accepted(&self) {
        self.plans_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_rejected(&self) {
        self.plans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pages_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dimension_lookups(&self) {
        self.dimension_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_data_source_failures(&self) {
        self.data_source_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persistence_failures(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_accepted: self.plans_accepted.load(Ordering::Relaxed),
            plans_rejected: self.plans_rejected.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            dimension_lookups: self.dimension_lookups.load(Ordering::Relaxed),
            data_source_failures: self.data_source_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`EngineMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_accepted: u64,
    pub plans_rejected: u64,
    pub pages_fetched: u64,
    pub dimension_lookups: u64,
    pub data_source_failures: u64,
    pub persistence_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        assert_eq!(EngineMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment_independently() {
        let metrics = EngineMetrics::new();
        metrics.increment_plans_accepted();
        metrics.increment_plans_accepted();
        metrics.increment_plans_rejected();
        metrics.increment_pages_fetched();
        metrics.increment_data_source_failures();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.plans_accepted, 2);
        assert_eq!(snapshot.plans_rejected, 1);
        assert_eq!(snapshot.pages_fetched, 1);
        assert_eq!(snapshot.dimension_lookups, 0);
        assert_eq!(snapshot.data_source_failures, 1);
        assert_eq!(snapshot.persistence_failures, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = EngineMetrics::new();
        metrics.increment_dimension_lookups();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["dimension_lookups"], 1);
    }
}
