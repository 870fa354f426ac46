//! Point-in-time view of tracker counters.

use serde::Serialize;

/// A copy of the tracker's counters at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Samples accepted and evaluated.
    pub samples_processed: u64,
    /// Malformed samples rejected at the boundary.
    pub samples_rejected: u64,
    /// Events delivered to observers.
    pub events_emitted: u64,
    /// Transitions silenced by the per-zone cooldown.
    pub transitions_suppressed: u64,
    /// Observer callbacks that panicked.
    pub observer_failures: u64,
}

impl std::fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "samples: {} processed, {} rejected; events: {} emitted, {} suppressed; observer failures: {}",
            self.samples_processed,
            self.samples_rejected,
            self.events_emitted,
            self.transitions_suppressed,
            self.observer_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_summarizes_counts() {
        let snapshot = TelemetrySnapshot {
            samples_processed: 10,
            samples_rejected: 1,
            events_emitted: 4,
            transitions_suppressed: 2,
            observer_failures: 0,
        };
        let text = snapshot.to_string();
        assert!(text.contains("10 processed"));
        assert!(text.contains("4 emitted"));
    }
}
