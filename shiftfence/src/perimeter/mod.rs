//! Perimeter math: great-circle distance and buffered containment.
//!
//! This is the single authority for "how far" and "inside or not". The
//! continuous tracker and the one-shot admission gate both call into this
//! module with the same tolerance constant, so a worker standing on a
//! perimeter boundary gets the same answer from every surface.
//!
//! # Design
//!
//! - Haversine great-circle distance on a spherical Earth (R = 6371 km)
//! - Double precision throughout; stable out to antipodal distances
//! - A tolerance buffer (default 100 m) absorbs consumer-grade GPS error

use crate::coord::Coordinate;
use crate::zone::Zone;

/// Mean Earth radius in kilometers, as used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default containment tolerance in kilometers (100 m).
///
/// Absorbs GPS error near a perimeter boundary. Applied uniformly to the
/// live admission check and to membership tracking — the two must never
/// disagree on a borderline point.
pub const DEFAULT_TOLERANCE_KM: f64 = 0.1;

/// Great-circle distance between two coordinates in kilometers.
///
/// Symmetric, and zero (within floating-point tolerance) iff the points
/// are equal.
#[inline]
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for near-antipodal points.
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Is `point` inside the zone's buffered perimeter, at the default
/// tolerance?
#[inline]
pub fn is_within_perimeter(point: &Coordinate, zone: &Zone) -> bool {
    is_within_perimeter_with_tolerance(point, zone, DEFAULT_TOLERANCE_KM)
}

/// Is `point` inside `zone.radius_km + tolerance_km` of the zone center?
#[inline]
pub fn is_within_perimeter_with_tolerance(
    point: &Coordinate,
    zone: &Zone,
    tolerance_km: f64,
) -> bool {
    distance_km(point, &zone.center) <= zone.radius_km + tolerance_km
}
