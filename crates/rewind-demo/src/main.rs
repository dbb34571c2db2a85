//! Headless demo of the lag-compensation core.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p rewind-demo -- --max-history-age 0.5` to widen the window.

mod scenario;

use clap::Parser;
use rewind_config::{CliArgs, Config, ConfigError, default_config_dir};
use tracing::info;

fn main() -> Result<(), ConfigError> {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(&args);
    config.validate()?;

    let log_dir = config_dir.join("logs");
    rewind_log::init_logging(Some(log_dir.as_path()), cfg!(debug_assertions), Some(&config));

    info!(
        "History window {:.3}s | shot synch delay {:.3}s | max prediction ping {:.0}ms",
        config.history.max_history_age,
        config.history.max_shot_synch_delay,
        config.prediction.max_prediction_ping_ms,
    );

    let report = scenario::run(&config);
    info!(
        "Validated {} hits (mean rewind {:.1} units), {} remote snaps, shot resolved at {:?}",
        report.hits_validated,
        report.mean_rewind_distance(),
        report.remote_snaps,
        report.shot_position,
    );
    Ok(())
}
