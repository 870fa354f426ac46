//! Workplace zone catalog types.
//!
//! A [`Zone`] is a circular geofence: a named center point with a radius in
//! kilometers. Zones are supplied by an external catalog (an organizations
//! store) and treated as a point-in-time snapshot — the tracker never
//! manages their lifecycle, it only evaluates positions against whatever
//! list it was last given.
//!
//! The serde representation matches the external catalog wire shape:
//!
//! ```json
//! { "id": "org-1", "name": "Sunrise Care Home",
//!   "latitude": 40.7589, "longitude": -73.9851, "radiusKm": 0.5 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{CoordError, Coordinate};

/// Errors from zone validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    /// Zone id is empty.
    #[error("zone id must not be empty")]
    EmptyId,

    /// Radius is negative or not a finite number. A radius of zero is
    /// legal (exact-point zone); a negative radius is an input error and
    /// is never silently clamped.
    #[error("invalid radius for zone '{id}': {radius_km} km (must be finite and >= 0)")]
    InvalidRadius { id: String, radius_km: f64 },

    /// Center coordinate is out of range.
    #[error("invalid center for zone '{id}': {source}")]
    InvalidCenter {
        id: String,
        #[source]
        source: CoordError,
    },

    /// Two zones in one catalog share an id.
    #[error("duplicate zone id '{0}'")]
    DuplicateId(String),

    /// Catalog JSON could not be parsed.
    #[error("malformed zone catalog: {0}")]
    MalformedCatalog(String),
}

/// A circular geofence around a registered workplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Unique id within a catalog.
    pub id: String,
    /// Human-readable workplace name.
    pub name: String,
    /// Center of the perimeter.
    #[serde(flatten)]
    pub center: Coordinate,
    /// Perimeter radius in kilometers. Zero is legal (exact-point zone).
    pub radius_km: f64,
}

impl Zone {
    /// Create a validated zone.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Self, ZoneError> {
        let zone = Self {
            id: id.into(),
            name: name.into(),
            center,
            radius_km,
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Check id, center and radius.
    ///
    /// Values deserialized from an external catalog bypass `new`, so the
    /// tracker re-validates every zone it is handed.
    pub fn validate(&self) -> Result<(), ZoneError> {
        if self.id.is_empty() {
            return Err(ZoneError::EmptyId);
        }
        self.center
            .validate()
            .map_err(|source| ZoneError::InvalidCenter {
                id: self.id.clone(),
                source,
            })?;
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(ZoneError::InvalidRadius {
                id: self.id.clone(),
                radius_km: self.radius_km,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} @ {}, r={} km)",
            self.name, self.id, self.center, self.radius_km
        )
    }
}

/// Validate a whole catalog: every zone individually, plus id uniqueness.
///
/// Returns the first problem found; on error the caller should reject the
/// entire list rather than apply a partial catalog.
pub fn validate_zones(zones: &[Zone]) -> Result<(), ZoneError> {
    let mut seen = std::collections::HashSet::with_capacity(zones.len());
    for zone in zones {
        zone.validate()?;
        if !seen.insert(zone.id.as_str()) {
            return Err(ZoneError::DuplicateId(zone.id.clone()));
        }
    }
    Ok(())
}

/// Parse and validate a zone catalog from its JSON wire form.
///
/// Accepts the external store's array shape (see module docs). The whole
/// catalog is rejected if any entry fails validation.
pub fn catalog_from_json(json: &str) -> Result<Vec<Zone>, ZoneError> {
    let zones: Vec<Zone> =
        serde_json::from_str(json).map_err(|e| ZoneError::MalformedCatalog(e.to_string()))?;
    validate_zones(&zones)?;
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Coordinate {
        Coordinate::new(40.7589, -73.9851).unwrap()
    }

    #[test]
    fn test_new_valid_zone() {
        let zone = Zone::new("org-1", "Sunrise Care Home", center(), 0.5).unwrap();
        assert_eq!(zone.id, "org-1");
        assert_eq!(zone.name, "Sunrise Care Home");
    }

    #[test]
    fn test_zero_radius_is_legal() {
        assert!(Zone::new("org-1", "Point", center(), 0.0).is_ok());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let result = Zone::new("org-1", "Bad", center(), -0.5);
        assert!(matches!(result, Err(ZoneError::InvalidRadius { .. })));
    }

    #[test]
    fn test_nan_radius_rejected() {
        let result = Zone::new("org-1", "Bad", center(), f64::NAN);
        assert!(matches!(result, Err(ZoneError::InvalidRadius { .. })));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = Zone::new("", "Nameless", center(), 1.0);
        assert!(matches!(result, Err(ZoneError::EmptyId)));
    }

    #[test]
    fn test_invalid_center_rejected() {
        let raw = Zone {
            id: "org-1".to_string(),
            name: "Offworld".to_string(),
            center: Coordinate {
                latitude: 200.0,
                longitude: 0.0,
            },
            radius_km: 1.0,
        };
        assert!(matches!(raw.validate(), Err(ZoneError::InvalidCenter { .. })));
    }

    #[test]
    fn test_huge_radius_is_legal() {
        // Continent-sized "test" zones show up in real catalogs.
        assert!(Zone::new("test", "Everywhere", center(), 20_000.0).is_ok());
    }

    mod catalog {
        use super::*;

        #[test]
        fn test_duplicate_ids_rejected() {
            let zones = vec![
                Zone::new("org-1", "A", center(), 1.0).unwrap(),
                Zone::new("org-1", "B", center(), 2.0).unwrap(),
            ];
            assert_eq!(
                validate_zones(&zones),
                Err(ZoneError::DuplicateId("org-1".to_string()))
            );
        }

        #[test]
        fn test_catalog_wire_shape_round_trip() {
            let json = r#"[
                { "id": "org-1", "name": "Sunrise Care Home",
                  "latitude": 40.7589, "longitude": -73.9851, "radiusKm": 0.5 }
            ]"#;

            let zones = catalog_from_json(json).unwrap();
            assert_eq!(zones.len(), 1);
            assert_eq!(zones[0].id, "org-1");
            assert!((zones[0].radius_km - 0.5).abs() < f64::EPSILON);
            assert!((zones[0].center.latitude - 40.7589).abs() < 1e-9);

            // Serialization goes back out in the same camelCase shape.
            let out = serde_json::to_string(&zones[0]).unwrap();
            assert!(out.contains("\"radiusKm\""));
            assert!(out.contains("\"latitude\""));
        }

        #[test]
        fn test_catalog_with_invalid_entry_rejected_whole() {
            let json = r#"[
                { "id": "org-1", "name": "Good",
                  "latitude": 40.0, "longitude": -73.0, "radiusKm": 0.5 },
                { "id": "org-2", "name": "Bad",
                  "latitude": 40.0, "longitude": -73.0, "radiusKm": -1.0 }
            ]"#;
            assert!(matches!(
                catalog_from_json(json),
                Err(ZoneError::InvalidRadius { .. })
            ));
        }

        #[test]
        fn test_malformed_json_reports_parse_error() {
            assert!(matches!(
                catalog_from_json("not json"),
                Err(ZoneError::MalformedCatalog(_))
            ));
        }
    }
}
