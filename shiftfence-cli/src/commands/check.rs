//! One-shot admission check against a zone catalog.

use std::path::PathBuf;

use clap::Args;
use shiftfence::admission::{check_admission, check_admission_with_tolerance, AdmissionDecision};
use shiftfence::coord::Coordinate;
use shiftfence::zone::{self, Zone};

use crate::error::CliError;

/// Arguments for `shiftfence check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the zone catalog JSON file
    #[arg(long)]
    pub zones: PathBuf,

    /// Zone id to check against
    #[arg(long)]
    pub zone: String,

    /// Latitude of the position, in degrees
    #[arg(long)]
    pub lat: f64,

    /// Longitude of the position, in degrees
    #[arg(long)]
    pub lon: f64,

    /// Override the tolerance buffer, in kilometers
    #[arg(long)]
    pub tolerance_km: Option<f64>,

    /// Emit the decision as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the admission check and print the verdict.
pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let catalog = zone::catalog_from_json(&std::fs::read_to_string(&args.zones)?)?;
    let zone = find_zone(catalog, &args.zone)?;
    let point = Coordinate::new(args.lat, args.lon)?;

    let decision = match args.tolerance_km {
        Some(tolerance) => check_admission_with_tolerance(&point, &zone, tolerance),
        None => check_admission(&point, &zone),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&decision)
            .map_err(|e| CliError::Serialize(e.to_string()))?;
        println!("{}", json);
    } else {
        print_verdict(&zone, &decision);
    }
    Ok(())
}

fn find_zone(catalog: Vec<Zone>, id: &str) -> Result<Zone, CliError> {
    catalog
        .into_iter()
        .find(|z| z.id == id)
        .ok_or_else(|| CliError::ZoneNotFound(id.to_string()))
}

fn print_verdict(zone: &Zone, decision: &AdmissionDecision) {
    if decision.allowed {
        println!(
            "Within the perimeter of {} ({:.2} km from center, allowed: {} km)",
            zone.name, decision.distance_km, zone.radius_km
        );
    } else {
        println!(
            "Outside allowed perimeter. You are {:.2} km away from {} (allowed: {} km)",
            decision.distance_km, zone.name, zone.radius_km
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_zone_by_id() {
        let catalog = vec![
            Zone::new("a", "A", Coordinate::new(0.0, 0.0).unwrap(), 1.0).unwrap(),
            Zone::new("b", "B", Coordinate::new(1.0, 1.0).unwrap(), 1.0).unwrap(),
        ];
        assert_eq!(find_zone(catalog, "b").unwrap().name, "B");
    }

    #[test]
    fn test_find_zone_missing() {
        let result = find_zone(Vec::new(), "nope");
        assert!(matches!(result, Err(CliError::ZoneNotFound(_))));
    }
}
