//! Geographic coordinate module
//!
//! Provides the validated [`Coordinate`] value type used throughout the
//! crate. Validation happens once at the boundary — everything downstream
//! (distance math, membership tracking, admission checks) can assume
//! finite, in-range values.

mod types;

pub use types::{Coordinate, CoordError, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_valid_range_always_accepted(
            lat in MIN_LAT..=MAX_LAT,
            lon in MIN_LON..=MAX_LON
        ) {
            let coord = Coordinate::new(lat, lon);
            prop_assert!(coord.is_ok());
        }

        #[test]
        fn test_reject_latitude_above_range(
            lat in 90.001..1_000.0_f64,
            lon in MIN_LON..=MAX_LON
        ) {
            let result = Coordinate::new(lat, lon);
            prop_assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
        }

        #[test]
        fn test_reject_longitude_below_range(
            lat in MIN_LAT..=MAX_LAT,
            lon in -1_000.0..-180.001_f64
        ) {
            let result = Coordinate::new(lat, lon);
            prop_assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
        }

        #[test]
        fn test_validate_matches_constructor(
            lat in -200.0..200.0_f64,
            lon in -400.0..400.0_f64
        ) {
            // Constructing and re-validating raw fields must agree.
            let raw = Coordinate { latitude: lat, longitude: lon };
            prop_assert_eq!(Coordinate::new(lat, lon).is_ok(), raw.validate().is_ok());
        }
    }
}
