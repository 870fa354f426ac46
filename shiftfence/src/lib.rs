//! ShiftFence - geofenced shift tracking core
//!
//! This library gates healthcare shift clock-in/out actions on physical
//! proximity to a registered workplace, and tracks perimeter enter/exit
//! transitions continuously while a worker is on the move.
//!
//! Two cooperating pieces:
//!
//! - Pure perimeter math ([`perimeter`], [`admission`]): great-circle
//!   distance and the buffered containment predicate behind one-shot
//!   clock-in/out authorization.
//! - The stateful tracker ([`geofence`]): consumes a stream of location
//!   samples, maintains the set of zones the worker is inside, and emits
//!   debounced enter/exit events to registered observers.
//!
//! Rendering, persistence and notification delivery live in the host
//! application; this crate only consumes a zone catalog and a location
//! source, and hands events back.

pub mod admission;
pub mod coord;
pub mod geofence;
pub mod perimeter;
pub mod telemetry;
pub mod zone;

pub use admission::{check_admission, AdmissionDecision};
pub use coord::Coordinate;
pub use geofence::{GeofenceEvent, GeofenceTracker, LocationSample};
pub use zone::Zone;
