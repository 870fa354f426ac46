//! Geofence tracking (membership, debouncing, lifecycle).
//!
//! This module maintains the worker's membership in a set of workplace
//! zones from a stream of location samples, and delivers debounced
//! enter/exit events to observers.
//!
//! # Design
//!
//! - [`MembershipEngine`] is the synchronous core: zones in, samples in,
//!   events out. Deterministic — timestamps are passed explicitly.
//! - [`GeofenceTracker`] wraps the engine with lifecycle (start/stop),
//!   the [`LocationSource`] seam, observer multicast, and telemetry.
//! - One-shot admission checks do NOT go through this module; they call
//!   [`crate::admission`] directly, sharing the same perimeter math.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shiftfence::geofence::{GeofenceTracker, PushSource};
//!
//! let source = Arc::new(PushSource::new());
//! let tracker = Arc::new(GeofenceTracker::new(Arc::clone(&source) as _));
//! tracker.set_zones(catalog)?;
//! tracker.add_observer(|event| notify(event));
//! tracker.start().await?;
//! ```

mod membership;
mod model;
mod source;
mod tracker;

pub use membership::{GeofenceConfig, MembershipEngine, SampleOutcome, DEFAULT_COOLDOWN};
pub use model::{GeofenceEvent, GeofenceEventKind, LocationSample};
pub use source::{
    BoxFuture, DeniedSource, LocationSource, PushSource, SourceError, SourceUpdate,
    UnavailableSource,
};
pub use tracker::{GeofenceTracker, ObserverId, TrackerError, TrackerState};
