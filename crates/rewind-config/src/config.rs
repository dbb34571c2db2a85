//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Position history and shot synchronization windows.
    pub history: HistoryConfig,
    /// Forward prediction of remotely simulated entities.
    pub prediction: PredictionConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Position history configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Seconds of movement history kept per entity (one extra sample is
    /// retained beyond this window for interpolation).
    pub max_history_age: f64,
    /// Seconds a flagged shot sample stays eligible for delayed-shot lookups.
    pub max_shot_synch_delay: f64,
}

/// Latency estimation and remote-entity correction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    /// Upper bound on the round trip (ms) that is compensated for.
    /// Zero disables forward prediction entirely.
    pub max_prediction_ping_ms: f64,
    /// Milliseconds subtracted from the measured round trip before it is
    /// turned into a prediction time.
    pub prediction_fudge_ms: f64,
    /// Corrections at least this long (world units) snap instantly instead
    /// of being visually smoothed.
    pub smoothing_snap_distance: f32,
    /// Exponential decay rate (per second) of the visual correction offset.
    pub smoothing_decay_rate: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_age: 0.3,
            max_shot_synch_delay: 0.1,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_prediction_ping_ms: 160.0,
            prediction_fudge_ms: 0.0,
            smoothing_snap_distance: 50.0,
            smoothing_decay_rate: 10.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for rewind, e.g. `~/.config/rewind` on Linux.
///
/// Falls back to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("rewind"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Validation ---

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite, non-negative number, got {value}"),
        });
    }
    Ok(())
}

impl Config {
    /// Rejects settings that would make the history or predictor misbehave
    /// (negative windows, NaN rates).
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("history.max_history_age", self.history.max_history_age)?;
        non_negative(
            "history.max_shot_synch_delay",
            self.history.max_shot_synch_delay,
        )?;
        non_negative(
            "prediction.max_prediction_ping_ms",
            self.prediction.max_prediction_ping_ms,
        )?;
        non_negative(
            "prediction.prediction_fudge_ms",
            self.prediction.prediction_fudge_ms,
        )?;
        non_negative(
            "prediction.smoothing_snap_distance",
            f64::from(self.prediction.smoothing_snap_distance),
        )?;
        non_negative(
            "prediction.smoothing_decay_rate",
            f64::from(self.prediction.smoothing_decay_rate),
        )?;
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("max_history_age: 0.3"));
        assert!(ron_str.contains("max_shot_synch_delay: 0.1"));
    }

    #[test]
    fn test_defaults_match_documented_tuning() {
        let config = Config::default();
        assert_eq!(config.history.max_history_age, 0.3);
        assert_eq!(config.history.max_shot_synch_delay, 0.1);
        assert_eq!(config.prediction.max_prediction_ping_ms, 160.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(history: (max_history_age: 0.5))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.history.max_history_age, 0.5);
        assert_eq!(config.history.max_shot_synch_delay, 0.1);
        assert_eq!(config.prediction, PredictionConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_negative_history_age_rejected() {
        let mut config = Config::default();
        config.history.max_history_age = -0.1;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "history.max_history_age");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_decay_rate_rejected() {
        let mut config = Config::default();
        config.prediction.smoothing_decay_rate = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.history.max_history_age = 0.45;
        config.prediction.prediction_fudge_ms = 20.0;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.history.max_shot_synch_delay = 0.2;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().history.max_shot_synch_delay, 0.2);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_default_config_dir_ends_with_rewind() {
        let dir = default_config_dir();
        assert!(dir.ends_with("rewind") || dir == PathBuf::from("."));
    }
}
