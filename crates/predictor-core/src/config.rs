//! Predictor Configuration
//!
//! All predictor settings are loaded from a TOML file. Every section and field
//! falls back to its default when absent.

use predictor_types::TrackedStat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Complete predictor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Presentation settings for hosts
    #[serde(default)]
    pub display: DisplayConfig,
    /// Seed refresh settings
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Forward pass settings
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// Incremental cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl PredictorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from `path`, or the defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Fractional digits when formatting elapsed time (1 to 10)
    pub time_precision: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { time_precision: 1 }
    }
}

impl DisplayConfig {
    pub fn precision(&self) -> u32 {
        self.time_precision.clamp(1, 10)
    }
}

/// Slow refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Reuse the seed state between refreshes
    pub slow_mode: bool,
    /// Minutes between seed refreshes in slow mode
    pub interval_minutes: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            slow_mode: false,
            interval_minutes: 1,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

/// Forward pass settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Keep repeating the final action until it becomes invalid
    pub repeat_last_action: bool,
    /// Repeats simulated between calls to the yield hook
    pub yield_every_repeats: u64,
    /// Upper bound on repeats of the final action in repeat mode
    pub repeat_limit: u64,
    /// Statistic whose throughput is reported
    pub tracked: TrackedStat,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            repeat_last_action: false,
            yield_every_repeats: 1000,
            repeat_limit: 100_000,
            tracked: TrackedStat::default(),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse simulated prefixes between passes
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PredictorConfig::default();
        assert_eq!(config.display.time_precision, 1);
        assert!(!config.refresh.slow_mode);
        assert_eq!(config.refresh.interval(), Duration::from_secs(60));
        assert!(!config.prediction.repeat_last_action);
        assert_eq!(config.prediction.tracked, TrackedStat::Resource("soul".into()));
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_partial_config() {
        let config = PredictorConfig::from_str(
            r#"
            [prediction]
            repeat_last_action = true
            tracked = { kind = "skill", name = "magic" }

            [cache]
            enabled = false
            "#,
        )
        .unwrap();
        assert!(config.prediction.repeat_last_action);
        assert_eq!(config.prediction.yield_every_repeats, 1000);
        assert_eq!(config.prediction.tracked, TrackedStat::Skill("magic".into()));
        assert!(!config.cache.enabled);
        assert_eq!(config.display.time_precision, 1);
    }

    #[test]
    fn test_precision_is_clamped() {
        let config = PredictorConfig::from_str("[display]\ntime_precision = 40").unwrap();
        assert_eq!(config.display.precision(), 10);
        let config = PredictorConfig::from_str("[display]\ntime_precision = 0").unwrap();
        assert_eq!(config.display.precision(), 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = PredictorConfig::default();
        config.refresh.slow_mode = true;
        config.prediction.tracked = TrackedStat::FinalActions;
        let text = config.to_toml().unwrap();
        assert_eq!(PredictorConfig::from_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[refresh]\nslow_mode = true\ninterval_minutes = 5").unwrap();
        let config = PredictorConfig::from_file(file.path()).unwrap();
        assert!(config.refresh.slow_mode);
        assert_eq!(config.refresh.interval(), Duration::from_secs(300));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("predictor.toml");
        assert_eq!(
            PredictorConfig::load_or_default(&missing).unwrap(),
            PredictorConfig::default()
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = PredictorConfig::from_str("[cache\nenabled = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
