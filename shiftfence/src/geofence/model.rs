//! Core data types for geofence tracking.
//!
//! Types here carry what the location source actually reported and what the
//! tracker emitted about it. Nothing is persisted — events are consumed by
//! observers and dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::zone::Zone;

/// A single position report from the location source.
///
/// Produced at an unspecified, possibly irregular cadence; the tracker
/// makes no assumptions about the interval between samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    /// Reported position.
    #[serde(flatten)]
    pub coord: Coordinate,
    /// When the source captured the fix.
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    /// Create a sample captured now.
    pub fn new(coord: Coordinate) -> Self {
        Self {
            coord,
            captured_at: Utc::now(),
        }
    }

    /// Create a sample with an explicit capture time.
    pub fn with_captured_at(coord: Coordinate, captured_at: DateTime<Utc>) -> Self {
        Self { coord, captured_at }
    }
}

impl std::fmt::Display for LocationSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.coord, self.captured_at.to_rfc3339())
    }
}

/// Direction of a perimeter transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceEventKind {
    /// The worker crossed into the zone's buffered perimeter.
    Enter,
    /// The worker left the zone's buffered perimeter.
    Exit,
}

impl GeofenceEventKind {
    /// Wire/display name, matching the external event sink's vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceEventKind::Enter => "enter",
            GeofenceEventKind::Exit => "exit",
        }
    }
}

impl std::fmt::Display for GeofenceEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A perimeter transition delivered to observers.
///
/// Created transiently on a state change that survives the per-zone
/// cooldown; the host decides what to do with it (push notification,
/// UI update, reminder email).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    /// Enter or exit.
    pub kind: GeofenceEventKind,
    /// The zone whose perimeter was crossed (snapshot at emission time).
    pub zone: Zone,
    /// The sample that triggered the transition.
    pub sample: LocationSample,
    /// When the tracker emitted the event.
    pub emitted_at: DateTime<Utc>,
}

impl GeofenceEvent {
    pub(crate) fn new(kind: GeofenceEventKind, zone: Zone, sample: LocationSample) -> Self {
        Self {
            kind,
            zone,
            sample,
            emitted_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for GeofenceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} at {}", self.kind, self.zone.name, self.sample.coord)
    }
}
