//! Per-zone membership tracking with debounced transitions.
//!
//! The engine is the synchronous core of the tracker: it consumes one
//! sample at a time, keeps the set of zones the last sample was inside,
//! and decides which transitions are allowed to emit events.
//!
//! # State machine
//!
//! Per zone: `OUTSIDE` (initial) ⇄ `INSIDE`, driven solely by the buffered
//! containment predicate. Location sources are noisy near a boundary, so a
//! per-zone cooldown suppresses rapid enter/exit oscillation: a transition
//! inside the cooldown window still updates membership (state stays
//! truthful) but emits no event and does not advance the throttle
//! timestamp. The cooldown is per-zone — activity in one zone never
//! silences events in another.
//!
//! Timestamps are passed in explicitly (`Instant`), so tests drive the
//! clock deterministically.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::coord::CoordError;
use crate::perimeter::{is_within_perimeter_with_tolerance, DEFAULT_TOLERANCE_KM};
use crate::zone::{validate_zones, Zone, ZoneError};

use super::model::{GeofenceEvent, GeofenceEventKind, LocationSample};

/// Default minimum time between emitted events for one zone.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Tuning knobs for membership tracking.
#[derive(Debug, Clone, Copy)]
pub struct GeofenceConfig {
    /// Minimum time between emitted events for the same zone.
    pub cooldown: Duration,

    /// Containment tolerance in kilometers, added to each zone's radius.
    /// Defaults to the shared admission-check buffer.
    pub tolerance_km: f64,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            tolerance_km: DEFAULT_TOLERANCE_KM,
        }
    }
}

impl GeofenceConfig {
    /// Set the per-zone cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the containment tolerance.
    pub fn with_tolerance_km(mut self, tolerance_km: f64) -> Self {
        self.tolerance_km = tolerance_km;
        self
    }
}

/// What processing one sample produced.
#[derive(Debug, Default)]
pub struct SampleOutcome {
    /// Events that survived the cooldown, in zone-list order.
    pub events: Vec<GeofenceEvent>,
    /// Transitions that happened but were suppressed by the cooldown.
    pub suppressed: usize,
}

/// Membership state machine, replicated across the zone set.
///
/// Owns the "inside" set and the per-zone throttle timestamps exclusively;
/// both mutate only on receipt of a sample and are cleared together by
/// [`MembershipEngine::clear`].
#[derive(Debug)]
pub struct MembershipEngine {
    config: GeofenceConfig,
    zones: Vec<Zone>,
    inside: HashSet<String>,
    last_fired: HashMap<String, Instant>,
}

impl MembershipEngine {
    /// Create an engine with the given configuration and no zones.
    pub fn new(config: GeofenceConfig) -> Self {
        Self {
            config,
            zones: Vec::new(),
            inside: HashSet::new(),
            last_fired: HashMap::new(),
        }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GeofenceConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    /// Replace the working zone list.
    ///
    /// Validates the whole list first; on any invalid entry the current
    /// list is kept untouched. No retroactive events fire for zones added
    /// or removed — membership for new zones is evaluated from the next
    /// sample. Membership entries for removed zones are dropped so the set
    /// stays consistent with the current list; throttle timestamps are
    /// kept, so removing and re-adding a zone cannot sidestep its cooldown.
    pub fn set_zones(&mut self, zones: Vec<Zone>) -> Result<(), ZoneError> {
        validate_zones(&zones)?;
        let ids: HashSet<&str> = zones.iter().map(|z| z.id.as_str()).collect();
        self.inside.retain(|id| ids.contains(id.as_str()));
        self.zones = zones;
        Ok(())
    }

    /// The current zone list.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Process one sample against every zone.
    ///
    /// A malformed sample (NaN or out-of-range coordinate) is rejected
    /// whole: neither membership nor throttle state changes.
    pub fn record_sample(
        &mut self,
        sample: &LocationSample,
        now: Instant,
    ) -> Result<SampleOutcome, CoordError> {
        sample.coord.validate()?;

        let mut outcome = SampleOutcome::default();
        for zone in &self.zones {
            let inside_now =
                is_within_perimeter_with_tolerance(&sample.coord, zone, self.config.tolerance_km);
            let was_inside = self.inside.contains(&zone.id);
            if inside_now == was_inside {
                continue;
            }

            // Membership always tracks the latest sample, even when the
            // cooldown blocks the event below.
            if inside_now {
                self.inside.insert(zone.id.clone());
            } else {
                self.inside.remove(&zone.id);
            }

            let can_fire = self
                .last_fired
                .get(&zone.id)
                .map_or(true, |last| now.duration_since(*last) >= self.config.cooldown);
            if !can_fire {
                debug!(zone = %zone.id, inside = inside_now, "transition suppressed by cooldown");
                outcome.suppressed += 1;
                continue;
            }

            let kind = if inside_now {
                GeofenceEventKind::Enter
            } else {
                GeofenceEventKind::Exit
            };
            self.last_fired.insert(zone.id.clone(), now);
            outcome
                .events
                .push(GeofenceEvent::new(kind, zone.clone(), *sample));
        }

        Ok(outcome)
    }

    /// Zone ids the most recent sample was inside.
    pub fn membership(&self) -> &HashSet<String> {
        &self.inside
    }

    /// Is the last sample inside this zone?
    pub fn is_inside(&self, zone_id: &str) -> bool {
        self.inside.contains(zone_id)
    }

    /// Zones (from the current list) the last sample was inside.
    pub fn zones_inside(&self) -> Vec<Zone> {
        self.zones
            .iter()
            .filter(|z| self.inside.contains(&z.id))
            .cloned()
            .collect()
    }

    /// Drop all membership and throttle state. Zone list is kept.
    pub fn clear(&mut self) {
        self.inside.clear();
        self.last_fired.clear();
    }
}
