//! Per-relay counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single relay invocation
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Signals taken from the source (items and the failure, if any)
    pulled: AtomicU64,
    /// Items accepted by the sink
    written: AtomicU64,
    /// Times the relay paused on a full sink
    pauses: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulled(&self) -> u64 {
        self.pulled.load(Ordering::Relaxed)
    }

    pub fn inc_pulled(&self) {
        self.pulled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn inc_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pauses(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }

    pub fn inc_pauses(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> RelayMetricsSnapshot {
        RelayMetricsSnapshot {
            pulled: self.pulled(),
            written: self.written(),
            pauses: self.pauses(),
        }
    }
}

/// Snapshot of relay metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayMetricsSnapshot {
    pub pulled: u64,
    pub written: u64,
    pub pauses: u64,
}
