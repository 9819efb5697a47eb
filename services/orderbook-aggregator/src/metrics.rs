//! Aggregation counters
//!
//! Shared across passes for monitoring. Nothing in here feeds back into
//! aggregation output.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated by every aggregation pass.
#[derive(Debug, Default)]
pub struct AggregatorMetrics {
    pub passes: AtomicU64,
    pub orders_evaluated: AtomicU64,
    pub orders_expired: AtomicU64,
    pub orders_clipped: AtomicU64,
    pub orders_unfillable: AtomicU64,
    pub orders_rejected: AtomicU64,
    pub oracle_batches: AtomicU64,
}

impl AggregatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self, count: usize) {
        self.orders_expired.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_oracle_batches(&self, count: usize) {
        self.oracle_batches.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record the outcome of one fold step followed by the request filter.
    pub fn record_evaluation(&self, outcome: FillOutcome, accepted: bool) {
        self.orders_evaluated.fetch_add(1, Ordering::Relaxed);
        match outcome {
            FillOutcome::Covered => {}
            FillOutcome::Clipped => {
                self.orders_clipped.fetch_add(1, Ordering::Relaxed);
            }
            FillOutcome::Unfillable => {
                self.orders_unfillable.fetch_add(1, Ordering::Relaxed);
            }
        }
        if !accepted {
            self.orders_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            orders_evaluated: self.orders_evaluated.load(Ordering::Relaxed),
            orders_expired: self.orders_expired.load(Ordering::Relaxed),
            orders_clipped: self.orders_clipped.load(Ordering::Relaxed),
            orders_unfillable: self.orders_unfillable.load(Ordering::Relaxed),
            orders_rejected: self.orders_rejected.load(Ordering::Relaxed),
            oracle_batches: self.oracle_batches.load(Ordering::Relaxed),
        }
    }
}

/// How the fold treated one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Collateral covered the full remaining size.
    Covered,
    /// Remaining size was scaled down to the available collateral.
    Clipped,
    /// No collateral left; remaining size forced to zero.
    Unfillable,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub passes: u64,
    pub orders_evaluated: u64,
    pub orders_expired: u64,
    pub orders_clipped: u64,
    pub orders_unfillable: u64,
    pub orders_rejected: u64,
    pub oracle_batches: u64,
}
