//! CLI error types.

use std::fmt;

use shiftfence::coord::CoordError;
use shiftfence::geofence::TrackerError;
use shiftfence::zone::ZoneError;

/// Errors that can occur while running a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// Failed to read an input file.
    Io(std::io::Error),

    /// The zone catalog failed to parse or validate.
    Catalog(ZoneError),

    /// The requested zone id is not in the catalog.
    ZoneNotFound(String),

    /// A position argument is out of range.
    Coordinate(CoordError),

    /// A sample trace line failed to parse.
    Trace(String),

    /// Failed to serialize output.
    Serialize(String),

    /// Failed to create the Tokio runtime.
    Runtime(String),

    /// The tracker failed to start or run.
    Tracking(TrackerError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "failed to read input: {}", e),
            CliError::Catalog(e) => write!(f, "invalid zone catalog: {}", e),
            CliError::ZoneNotFound(id) => write!(f, "zone '{}' not found in catalog", id),
            CliError::Coordinate(e) => write!(f, "invalid position: {}", e),
            CliError::Trace(msg) => write!(f, "invalid sample trace: {}", msg),
            CliError::Serialize(msg) => write!(f, "failed to serialize output: {}", msg),
            CliError::Runtime(msg) => write!(f, "failed to create Tokio runtime: {}", msg),
            CliError::Tracking(e) => write!(f, "tracking failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Coordinate(e) => Some(e),
            CliError::Tracking(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<ZoneError> for CliError {
    fn from(e: ZoneError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinate(e)
    }
}

impl From<TrackerError> for CliError {
    fn from(e: TrackerError) -> Self {
        CliError::Tracking(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zone_not_found() {
        let err = CliError::ZoneNotFound("org-9".to_string());
        assert!(err.to_string().contains("org-9"));
    }

    #[test]
    fn test_from_coord_error() {
        let err: CliError = CoordError::InvalidLatitude(200.0).into();
        assert!(matches!(err, CliError::Coordinate(_)));
    }
}
