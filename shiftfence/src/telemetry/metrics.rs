//! Atomic counters for the sample-processing path.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::TelemetrySnapshot;

/// Lock-free counters shared between the tracker and its watch task.
///
/// Relaxed ordering throughout: the counters are monotone tallies, not
/// synchronization points.
#[derive(Debug, Default)]
pub struct TrackerMetrics {
    samples_processed: AtomicU64,
    samples_rejected: AtomicU64,
    events_emitted: AtomicU64,
    transitions_suppressed: AtomicU64,
    observer_failures: AtomicU64,
}

impl TrackerMetrics {
    /// Create metrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sample was accepted and evaluated against the zone list.
    pub fn sample_processed(&self) {
        self.samples_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// A malformed sample was rejected at the boundary.
    pub fn sample_rejected(&self) {
        self.samples_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Events delivered to observers.
    pub fn events_emitted(&self, count: u64) {
        self.events_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Transitions that happened but were silenced by the cooldown.
    pub fn transitions_suppressed(&self, count: u64) {
        self.transitions_suppressed.fetch_add(count, Ordering::Relaxed);
    }

    /// An observer callback panicked and was isolated.
    pub fn observer_failure(&self) {
        self.observer_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            samples_processed: self.samples_processed.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            transitions_suppressed: self.transitions_suppressed.load(Ordering::Relaxed),
            observer_failures: self.observer_failures.load(Ordering::Relaxed),
        }
    }
}
