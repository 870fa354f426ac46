//! Admission gate for clock-in/out authorization.
//!
//! A single-shot, stateless decision: given one coordinate and one zone,
//! may the worker clock in (or out) here? Distinct from the continuous
//! tracker — request-handling code calls this directly when a clock-in
//! mutation arrives.
//!
//! The check reuses the perimeter predicate at [`DEFAULT_TOLERANCE_KM`],
//! the same constant the tracker's membership math uses. A worker the
//! tracker reports as "inside" is therefore never denied admission by this
//! separate check, and vice versa.
//!
//! # Example
//!
//! ```
//! use shiftfence::admission::check_admission;
//! use shiftfence::coord::Coordinate;
//! use shiftfence::zone::Zone;
//!
//! let zone = Zone::new(
//!     "org-1",
//!     "Sunrise Care Home",
//!     Coordinate::new(40.7589, -73.9851).unwrap(),
//!     0.5,
//! )
//! .unwrap();
//!
//! let decision = check_admission(&zone.center, &zone);
//! assert!(decision.allowed);
//! ```

use serde::Serialize;

use crate::coord::Coordinate;
use crate::perimeter::{distance_km, DEFAULT_TOLERANCE_KM};
use crate::zone::Zone;

/// Outcome of an admission check.
///
/// Carries the raw distance so a denial can be rendered as
/// "you are X km away from the location".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionDecision {
    /// Whether the point lies within the zone's buffered radius.
    pub allowed: bool,
    /// Great-circle distance from the point to the zone center, in km.
    pub distance_km: f64,
}

impl std::fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.allowed {
            write!(f, "allowed ({:.2} km from center)", self.distance_km)
        } else {
            write!(f, "denied ({:.2} km from center)", self.distance_km)
        }
    }
}

/// Check whether `point` may be admitted to `zone`, at the default
/// tolerance shared with the tracker.
pub fn check_admission(point: &Coordinate, zone: &Zone) -> AdmissionDecision {
    check_admission_with_tolerance(point, zone, DEFAULT_TOLERANCE_KM)
}

/// Admission check with an explicit tolerance buffer.
///
/// The distance is computed once and reused for both the verdict and the
/// reported value, so the two can never drift apart.
pub fn check_admission_with_tolerance(
    point: &Coordinate,
    zone: &Zone,
    tolerance_km: f64,
) -> AdmissionDecision {
    let distance = distance_km(point, &zone.center);
    AdmissionDecision {
        allowed: distance <= zone.radius_km + tolerance_km,
        distance_km: distance,
    }
}
