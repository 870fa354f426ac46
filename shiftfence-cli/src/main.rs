//! ShiftFence CLI - command-line interface
//!
//! Operates the geofencing core from the command line: one-shot admission
//! checks against a zone catalog, and replaying recorded sample traces
//! through a tracker for diagnostics.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shiftfence", version, about = "Geofenced shift tracking tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a position may clock in or out at a zone
    Check(commands::check::CheckArgs),
    /// Replay a recorded sample trace through a geofence tracker
    Replay(commands::replay::ReplayArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Check(args) => commands::check::run(args),
        Command::Replay(args) => commands::replay::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
