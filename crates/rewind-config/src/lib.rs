//! Configuration for the rewind lag-compensation stack.
//!
//! Provides the tunables that trade memory and CPU against hit-registration
//! fairness (history window, shot synchronization delay, prediction ping
//! cap). Settings persist to disk as RON and can be overridden from the
//! command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, HistoryConfig, PredictionConfig, default_config_dir};
pub use error::ConfigError;
