use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::ports::DispatchOutcome;

/// Point-in-time view of a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub workers: usize,
    pub capacity: usize,
    pub queued: usize,
    pub accepted: u64,
    pub rejected: u64,
    pub dispatched: u64,
    pub io_failures: u64,
    pub panics: u64,
}

/// Live counters shared between the pool handle and its workers.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    accepted: AtomicU64,
    rejected: AtomicU64,
    dispatched: AtomicU64,
    io_failures: AtomicU64,
    panics: AtomicU64,
}

impl PoolStats {
    pub(crate) fn record_submit(&self, accepted: bool) {
        let counter = if accepted {
            &self.accepted
        } else {
            &self.rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatch(&self, outcome: DispatchOutcome) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        if outcome == DispatchOutcome::IoFailed {
            self.io_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_panic(&self) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, workers: usize, capacity: usize, queued: usize) -> PoolCounts {
        PoolCounts {
            workers,
            capacity,
            queued,
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            io_failures: self.io_failures.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_recorded_events() {
        let stats = PoolStats::default();
        stats.record_submit(true);
        stats.record_submit(true);
        stats.record_submit(false);
        stats.record_dispatch(DispatchOutcome::Processed);
        stats.record_dispatch(DispatchOutcome::IoFailed);
        stats.record_panic();

        let counts = stats.snapshot(4, 16, 1);
        assert_eq!(counts.accepted, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.dispatched, 2);
        assert_eq!(counts.io_failures, 1);
        assert_eq!(counts.panics, 1);
        assert_eq!(counts.queued, 1);
    }

    #[test]
    fn counts_serialize_as_flat_json() {
        let counts = PoolCounts {
            workers: 2,
            capacity: 8,
            ..Default::default()
        };
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["workers"], 2);
        assert_eq!(json["capacity"], 8);
        assert_eq!(json["rejected"], 0);
    }
}
