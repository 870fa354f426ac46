//! Replay a recorded sample trace through a geofence tracker.
//!
//! The trace is JSON lines, one sample per line:
//!
//! ```text
//! {"latitude": 40.7702, "longitude": -73.9851}
//! {"latitude": 40.7589, "longitude": -73.9851, "capturedAt": "2024-03-01T09:30:00Z"}
//! ```
//!
//! Events are printed as they fire; the final membership and telemetry
//! counters follow. Useful for checking a zone catalog against a real
//! commute before rolling it out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;
use tracing::info;

use shiftfence::coord::Coordinate;
use shiftfence::geofence::{
    GeofenceConfig, GeofenceTracker, LocationSample, LocationSource, PushSource,
};
use shiftfence::zone;

use crate::error::CliError;

/// Arguments for `shiftfence replay`.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the zone catalog JSON file
    #[arg(long)]
    pub zones: PathBuf,

    /// Path to the JSON-lines sample trace
    #[arg(long)]
    pub samples: PathBuf,

    /// Per-zone event cooldown, in seconds
    #[arg(long, default_value_t = 300)]
    pub cooldown_secs: u64,

    /// Delay between replayed samples, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub interval_ms: u64,
}

/// One line of the sample trace.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TraceRecord {
    latitude: f64,
    longitude: f64,
    captured_at: Option<DateTime<Utc>>,
}

impl TraceRecord {
    fn into_sample(self) -> LocationSample {
        // No validation here: malformed positions flow through the
        // tracker's boundary check and surface on its error stream.
        let coord = Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        match self.captured_at {
            Some(at) => LocationSample::with_captured_at(coord, at),
            None => LocationSample::new(coord),
        }
    }
}

/// Run the replay to completion.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let catalog = zone::catalog_from_json(&std::fs::read_to_string(&args.zones)?)?;
    let records = parse_trace(&std::fs::read_to_string(&args.samples)?)?;
    info!(
        zones = catalog.len(),
        samples = records.len(),
        "replaying trace"
    );

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime.block_on(replay(args, catalog, records))
}

fn parse_trace(text: &str) -> Result<Vec<TraceRecord>, CliError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| CliError::Trace(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}

async fn replay(
    args: ReplayArgs,
    catalog: Vec<shiftfence::Zone>,
    records: Vec<TraceRecord>,
) -> Result<(), CliError> {
    let source = Arc::new(PushSource::new());
    let tracker = Arc::new(GeofenceTracker::with_config(
        Arc::clone(&source) as Arc<dyn LocationSource>,
        GeofenceConfig::default().with_cooldown(Duration::from_secs(args.cooldown_secs)),
    ));
    tracker.set_zones(catalog)?;
    tracker.add_observer(|event| println!("{}", event));
    let mut errors = tracker.error_stream();

    tracker.start().await?;
    for record in records {
        source.push(record.into_sample());
        if args.interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
    }
    // Let the watch task drain the queue.
    tokio::time::sleep(Duration::from_millis(100)).await;

    while let Ok(error) = errors.try_recv() {
        eprintln!("warning: {}", error);
    }

    let inside = tracker.zones_inside();
    if inside.is_empty() {
        println!("Final position: outside all perimeters");
    } else {
        let names: Vec<&str> = inside.iter().map(|z| z.name.as_str()).collect();
        println!("Final position: inside {}", names.join(", "));
    }
    println!("{}", tracker.telemetry());

    tracker.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace_skips_blank_lines() {
        let text = r#"{"latitude": 40.0, "longitude": -73.0}

{"latitude": 41.0, "longitude": -73.5, "capturedAt": "2024-03-01T09:30:00Z"}
"#;
        let records = parse_trace(text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].captured_at.is_none());
        assert!(records[1].captured_at.is_some());
    }

    #[test]
    fn test_parse_trace_reports_line_number() {
        let text = "{\"latitude\": 40.0, \"longitude\": -73.0}\nnot json\n";
        let result = parse_trace(text);
        match result {
            Err(CliError::Trace(msg)) => assert!(msg.starts_with("line 2")),
            other => panic!("expected trace error, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_record_into_sample() {
        let record = TraceRecord {
            latitude: 40.7589,
            longitude: -73.9851,
            captured_at: Some("2024-03-01T09:30:00Z".parse().unwrap()),
        };
        let sample = record.into_sample();
        assert!((sample.coord.latitude - 40.7589).abs() < 1e-9);
        assert_eq!(sample.captured_at.to_rfc3339(), "2024-03-01T09:30:00+00:00");
    }
}
