//! Tracker telemetry for observability and diagnostics.
//!
//! Lock-free atomic counters recorded on the sample-processing path, with
//! point-in-time snapshots for display.
//!
//! # Architecture
//!
//! ```text
//! GeofenceTracker ─────► TrackerMetrics ─────► TelemetrySnapshot ─────► Views
//!                        (atomic counters)    (point-in-time copy)     (CLI, etc.)
//! ```

mod metrics;
mod snapshot;

pub use metrics::TrackerMetrics;
pub use snapshot::TelemetrySnapshot;
