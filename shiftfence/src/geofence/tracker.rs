//! Continuous geofence tracking with debounced event delivery.
//!
//! [`GeofenceTracker`] owns a [`MembershipEngine`] and a watch task fed by
//! a [`LocationSource`]. Samples are processed one at a time, to
//! completion, before the next is taken from the channel — there is no
//! overlapping sample processing and no reentrancy.
//!
//! Each tracker instance owns its membership and throttle state
//! exclusively; independent trackers can coexist (one per signed-in
//! worker, or many in tests).
//!
//! # Lifecycle
//!
//! ```text
//! STOPPED --start()--> RUNNING --stop()/source loss--> STOPPED
//! ```
//!
//! `start` and `stop` are idempotent and safe from any point in the
//! lifecycle. A generation counter makes stop-during-start deterministic:
//! the stop wins, the resolved start leaves the tracker STOPPED, and
//! samples delivered after the stop are discarded.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shiftfence::geofence::{GeofenceTracker, PushSource};
//!
//! let source = Arc::new(PushSource::new());
//! let tracker = GeofenceTracker::new(Arc::clone(&source) as _);
//! tracker.set_zones(zones)?;
//! tracker.add_observer(|event| println!("{}", event));
//! tracker.start().await?;
//! // host geolocation callback:
//! source.push(sample);
//! ```

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::coord::CoordError;
use crate::telemetry::{TelemetrySnapshot, TrackerMetrics};
use crate::zone::{Zone, ZoneError};

use super::membership::{GeofenceConfig, MembershipEngine};
use super::model::{GeofenceEvent, GeofenceEventKind, LocationSample};
use super::source::{LocationSource, SourceError, SourceUpdate};

/// Tracker-level lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not tracking. Initial state, and where every failure lands.
    Stopped,
    /// Watch task running, samples being processed.
    Running,
}

impl TrackerState {
    /// Short description for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerState::Stopped => "Stopped",
            TrackerState::Running => "Running",
        }
    }

    /// Is the tracker currently tracking?
    pub fn is_running(&self) -> bool {
        matches!(self, TrackerState::Running)
    }
}

impl std::fmt::Display for TrackerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors surfaced by the tracker.
///
/// `start()` returns source errors synchronously; conditions that arise
/// mid-session (malformed samples, source loss, observer panics) are
/// reported through [`GeofenceTracker::error_stream`] and logged. Nothing
/// here is fatal to the host — every failure degrades to "tracking
/// stopped" or "sample ignored".
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The location source refused or lost the watch.
    #[error("location source error: {0}")]
    Source(#[from] SourceError),

    /// A sample with out-of-range coordinates was rejected.
    #[error("invalid location sample: {0}")]
    InvalidSample(#[from] CoordError),

    /// An observer callback panicked while handling an event.
    #[error("observer panicked while handling {kind} event for zone '{zone_id}'")]
    ObserverPanicked {
        kind: GeofenceEventKind,
        zone_id: String,
    },
}

/// Handle for unregistering an observer.
pub type ObserverId = u64;

type ObserverFn = Arc<dyn Fn(&GeofenceEvent) + Send + Sync>;

/// State guarded by the tracker's mutex.
struct TrackerInner {
    engine: MembershipEngine,
    state: TrackerState,
    /// Bumped by every stop() and every start attempt. A watch task or an
    /// in-flight start holding a stale generation stands down.
    epoch: u64,
    last_sample: Option<LocationSample>,
    watch: Option<JoinHandle<()>>,
}

/// State shared between the tracker handle and its watch task.
struct Shared {
    inner: Mutex<TrackerInner>,
    observers: Mutex<Vec<(ObserverId, ObserverFn)>>,
    metrics: TrackerMetrics,
    error_tx: Mutex<Option<mpsc::UnboundedSender<TrackerError>>>,
}

impl Shared {
    /// Watch task: drains the source channel until it closes, fails, or
    /// the generation moves on.
    async fn run_watch(
        self: Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<SourceUpdate>,
        epoch: u64,
    ) {
        loop {
            let update = rx.recv().await;
            if self.inner.lock().epoch != epoch {
                // stop() or a newer session took over; discard and leave.
                return;
            }
            match update {
                Some(SourceUpdate::Sample(sample)) => self.process_sample(sample, epoch),
                Some(SourceUpdate::Failed(error)) => {
                    self.source_lost(error, epoch);
                    return;
                }
                None => {
                    self.source_lost(
                        SourceError::Lost("location watch closed".into()),
                        epoch,
                    );
                    return;
                }
            }
        }
    }

    /// Evaluate one sample; synchronous to completion.
    fn process_sample(&self, sample: LocationSample, epoch: u64) {
        let mut inner = self.inner.lock();
        if inner.epoch != epoch || !inner.state.is_running() {
            return;
        }
        let outcome = match inner.engine.record_sample(&sample, Instant::now()) {
            Ok(outcome) => {
                inner.last_sample = Some(sample);
                outcome
            }
            Err(error) => {
                drop(inner);
                self.metrics.sample_rejected();
                warn!(%error, "rejected malformed location sample");
                self.report(TrackerError::InvalidSample(error));
                return;
            }
        };
        drop(inner);

        self.metrics.sample_processed();
        self.metrics.transitions_suppressed(outcome.suppressed as u64);
        for event in &outcome.events {
            self.dispatch(event);
        }
    }

    /// Deliver one event to every observer, isolating panics.
    fn dispatch(&self, event: &GeofenceEvent) {
        self.metrics.events_emitted(1);
        debug!(kind = %event.kind, zone = %event.zone.id, "geofence event");

        // Snapshot the list so an observer may add/remove observers.
        let observers: Vec<(ObserverId, ObserverFn)> = self.observers.lock().clone();
        for (id, callback) in observers {
            let result = catch_unwind(AssertUnwindSafe(|| callback(event)));
            if result.is_err() {
                self.metrics.observer_failure();
                warn!(observer = id, zone = %event.zone.id, "observer panicked; continuing");
                self.report(TrackerError::ObserverPanicked {
                    kind: event.kind,
                    zone_id: event.zone.id.clone(),
                });
            }
        }
    }

    /// Mid-session source failure: stop tracking, keep the membership
    /// snapshot readable until the next successful start.
    fn source_lost(&self, error: SourceError, epoch: u64) {
        {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.epoch += 1;
            inner.state = TrackerState::Stopped;
            inner.watch = None;
        }
        warn!(%error, "location source lost; tracking stopped");
        self.report(TrackerError::Source(error));
    }

    fn report(&self, error: TrackerError) {
        let mut guard = self.error_tx.lock();
        let receiver_gone = match guard.as_ref() {
            Some(tx) => tx.send(error).is_err(),
            None => false,
        };
        if receiver_gone {
            *guard = None;
        }
    }
}

/// Stateful watcher: consumes location samples, tracks zone membership,
/// emits debounced enter/exit events to registered observers.
pub struct GeofenceTracker {
    source: Arc<dyn LocationSource>,
    shared: Arc<Shared>,
    next_observer_id: AtomicU64,
}

impl std::fmt::Debug for GeofenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("GeofenceTracker")
            .field("state", &inner.state)
            .field("zones", &inner.engine.zones().len())
            .field("inside", &inner.engine.membership().len())
            .finish()
    }
}

impl GeofenceTracker {
    /// Create a tracker with default configuration.
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self::with_config(source, GeofenceConfig::default())
    }

    /// Create a tracker with custom cooldown/tolerance.
    pub fn with_config(source: Arc<dyn LocationSource>, config: GeofenceConfig) -> Self {
        Self {
            source,
            shared: Arc::new(Shared {
                inner: Mutex::new(TrackerInner {
                    engine: MembershipEngine::new(config),
                    state: TrackerState::Stopped,
                    epoch: 0,
                    last_sample: None,
                    watch: None,
                }),
                observers: Mutex::new(Vec::new()),
                metrics: TrackerMetrics::new(),
                error_tx: Mutex::new(None),
            }),
            next_observer_id: AtomicU64::new(1),
        }
    }

    /// Replace the working zone list, at any time, including while
    /// running.
    ///
    /// The whole list is validated first; on error the current list stays
    /// active. No events fire retroactively for added or removed zones.
    pub fn set_zones(&self, zones: Vec<Zone>) -> Result<(), ZoneError> {
        self.shared.inner.lock().engine.set_zones(zones)
    }

    /// The current zone list.
    pub fn zones(&self) -> Vec<Zone> {
        self.shared.inner.lock().engine.zones().to_vec()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackerState {
        self.shared.inner.lock().state
    }

    /// Zone ids the most recently processed sample was inside.
    pub fn current_membership(&self) -> HashSet<String> {
        self.shared.inner.lock().engine.membership().clone()
    }

    /// Is the worker inside any zone right now?
    pub fn is_inside_any(&self) -> bool {
        !self.shared.inner.lock().engine.membership().is_empty()
    }

    /// Zones the worker is currently inside.
    pub fn zones_inside(&self) -> Vec<Zone> {
        self.shared.inner.lock().engine.zones_inside()
    }

    /// The most recently accepted sample, if any.
    pub fn last_sample(&self) -> Option<LocationSample> {
        self.shared.inner.lock().last_sample
    }

    /// Point-in-time counters for diagnostics.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.shared.metrics.snapshot()
    }

    /// Register an observer; events reach every registered observer, in
    /// registration order.
    pub fn add_observer(
        &self,
        callback: impl Fn(&GeofenceEvent) + Send + Sync + 'static,
    ) -> ObserverId {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.shared.observers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Unregister an observer.
    ///
    /// # Returns
    ///
    /// `true` if the id was registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.shared.observers.lock();
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    /// Subscribe to mid-session error reports.
    ///
    /// Replaces any previous subscription. Errors are also logged via
    /// `tracing`, so subscribing is optional.
    pub fn error_stream(&self) -> mpsc::UnboundedReceiver<TrackerError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.shared.error_tx.lock() = Some(tx);
        rx
    }

    /// Probe the location permission without starting tracking.
    ///
    /// Does not mutate tracker state.
    pub async fn request_permission(&self) -> Result<bool, SourceError> {
        self.source.request_permission().await
    }

    /// Begin tracking: STOPPED → RUNNING.
    ///
    /// Asks the source to start its watch; on `PermissionDenied` or
    /// `Unavailable` the tracker stays STOPPED and the error is returned.
    /// Idempotent — starting a running tracker is a no-op success. A
    /// successful start begins a fresh session: membership and throttle
    /// state are cleared.
    ///
    /// If `stop()` is called while the watch request is in flight, the
    /// stop wins: this call resolves `Ok`, the tracker ends STOPPED, and
    /// the stillborn watch is dropped.
    pub async fn start(&self) -> Result<(), TrackerError> {
        let my_epoch = {
            let mut inner = self.shared.inner.lock();
            if inner.state.is_running() {
                return Ok(());
            }
            inner.epoch += 1;
            inner.epoch
        };

        let rx = self.source.start_watch().await.map_err(TrackerError::Source)?;

        let mut inner = self.shared.inner.lock();
        if inner.epoch != my_epoch {
            // Superseded while the watch request was in flight; drop the
            // receiver and leave state as the superseding call set it.
            debug!("start superseded before watch came up");
            return Ok(());
        }

        inner.engine.clear();
        inner.last_sample = None;
        inner.state = TrackerState::Running;
        inner.watch = Some(tokio::spawn(Shared::run_watch(
            Arc::clone(&self.shared),
            rx,
            my_epoch,
        )));
        info!(zones = inner.engine.zones().len(), "geofence tracking started");
        Ok(())
    }

    /// Stop tracking: RUNNING → STOPPED.
    ///
    /// Clears all membership and throttle state unconditionally. No exit
    /// events fire for zones the worker was inside — leaving tracking is
    /// not leaving a zone. Safe to call at any point, including while a
    /// `start()` is still resolving.
    pub fn stop(&self) {
        let was_running;
        {
            let mut inner = self.shared.inner.lock();
            inner.epoch += 1;
            was_running = inner.state.is_running();
            inner.state = TrackerState::Stopped;
            inner.engine.clear();
            inner.last_sample = None;
            if let Some(handle) = inner.watch.take() {
                handle.abort();
            }
        }
        if was_running {
            info!("geofence tracking stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::geofence::source::PushSource;

    fn zone(id: &str, lat: f64, lon: f64, radius_km: f64) -> Zone {
        Zone::new(id, format!("Zone {}", id), Coordinate::new(lat, lon).unwrap(), radius_km)
            .unwrap()
    }

    #[test]
    fn test_tracker_state_display() {
        assert_eq!(TrackerState::Stopped.as_str(), "Stopped");
        assert_eq!(TrackerState::Running.as_str(), "Running");
        assert!(TrackerState::Running.is_running());
        assert!(!TrackerState::Stopped.is_running());
    }

    #[test]
    fn test_new_tracker_is_stopped_and_empty() {
        let tracker = GeofenceTracker::new(Arc::new(PushSource::new()));
        assert_eq!(tracker.state(), TrackerState::Stopped);
        assert!(tracker.current_membership().is_empty());
        assert!(tracker.last_sample().is_none());
        assert!(!tracker.is_inside_any());
    }

    #[test]
    fn test_set_zones_validates() {
        let tracker = GeofenceTracker::new(Arc::new(PushSource::new()));
        let bad = Zone {
            id: "b".to_string(),
            name: "Bad".to_string(),
            center: Coordinate::new(0.0, 0.0).unwrap(),
            radius_km: -1.0,
        };
        assert!(tracker.set_zones(vec![bad]).is_err());
        assert!(tracker.zones().is_empty());

        tracker.set_zones(vec![zone("a", 40.0, -73.0, 1.0)]).unwrap();
        assert_eq!(tracker.zones().len(), 1);
    }

    #[test]
    fn test_observer_registration_and_removal() {
        let tracker = GeofenceTracker::new(Arc::new(PushSource::new()));
        let id = tracker.add_observer(|_| {});
        assert!(tracker.remove_observer(id));
        assert!(!tracker.remove_observer(id), "second removal is a no-op");
    }

    #[tokio::test]
    async fn test_stop_before_start_is_safe() {
        let tracker = GeofenceTracker::new(Arc::new(PushSource::new()));
        tracker.stop();
        assert_eq!(tracker.state(), TrackerState::Stopped);
        tracker.start().await.unwrap();
        assert_eq!(tracker.state(), TrackerState::Running);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let tracker = GeofenceTracker::new(Arc::new(PushSource::new()));
        tracker.start().await.unwrap();
        tracker.start().await.unwrap();
        assert_eq!(tracker.state(), TrackerState::Running);
    }
}
