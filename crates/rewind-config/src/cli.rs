//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments shared by rewind binaries.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "rewind", about = "Movement history and lag compensation")]
pub struct CliArgs {
    /// Seconds of position history kept per entity.
    #[arg(long)]
    pub max_history_age: Option<f64>,

    /// Seconds a fired shot stays eligible for delayed-shot lookups.
    #[arg(long)]
    pub max_shot_synch_delay: Option<f64>,

    /// Largest round trip (ms) compensated by forward prediction.
    #[arg(long)]
    pub max_prediction_ping: Option<f64>,

    /// Milliseconds subtracted from the measured round trip.
    #[arg(long)]
    pub prediction_fudge: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(age) = args.max_history_age {
            self.history.max_history_age = age;
        }
        if let Some(delay) = args.max_shot_synch_delay {
            self.history.max_shot_synch_delay = delay;
        }
        if let Some(ping) = args.max_prediction_ping {
            self.prediction.max_prediction_ping_ms = ping;
        }
        if let Some(fudge) = args.prediction_fudge {
            self.prediction.prediction_fudge_ms = fudge;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
