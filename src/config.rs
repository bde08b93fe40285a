//! Service configuration.
//!
//! Everything that used to be module-level state in the collection scripts
//! (provider base URLs, table paths, pacing, scoring weights) lives here and
//! is handed to the resolver, fetchers and ranker at construction time.
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file (`rainrank.toml`), and `RAINRANK_*` environment variables
//! (a `.env` file is loaded first if present).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::analysis::raininess::ScoringParams;

pub const DEFAULT_CONFIG_FILE: &str = "rainrank.toml";

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/era5";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Five years of daily archive data, counted as 5 × 365 days.
pub const DEFAULT_HISTORY_DAYS: i64 = 365 * 5;
/// Upper bound on the archive window. The ERA5 record starts in 1940.
pub const MAX_HISTORY_DAYS: i64 = 365 * 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProviderConfig,
    pub tables: TableConfig,
    pub batch: BatchConfig,
    pub scoring: ScoringParams,
    pub logging: LoggingConfig,
}

/// Upstream HTTP endpoints and request parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub archive_url: String,
    pub forecast_url: String,
    /// Length of the historical window ending today.
    pub history_days: i64,
    /// Forecast horizon requested from the forecast endpoint.
    pub forecast_days: u8,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            forecast_days: 7,
            request_timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Input reference tables and the ranked output file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub world_cities: PathBuf,
    pub capitals: PathBuf,
    pub output: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            world_cities: PathBuf::from("world_cities.csv"),
            capitals: PathBuf::from("country-capital-lat-long-population.csv"),
            output: PathBuf::from("rainiest_cities.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Pause between successive cities to stay inside the upstream quota.
    pub request_delay_secs: u64,
    /// Number of rows printed in the console summary.
    pub top_n: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: 5,
            top_n: 10,
        }
    }
}

impl BatchConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// Append every record to this file in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist, then apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply `RAINRANK_*` overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RAINRANK_ARCHIVE_URL") {
            self.providers.archive_url = url;
        }
        if let Some(url) = lookup("RAINRANK_FORECAST_URL") {
            self.providers.forecast_url = url;
        }
        if let Some(delay) = lookup("RAINRANK_DELAY_SECS") {
            self.batch.request_delay_secs = delay.trim().parse().map_err(|e| {
                ConfigError::Invalid(format!("RAINRANK_DELAY_SECS={delay:?}: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.providers;
        if p.archive_url.trim().is_empty() || p.forecast_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider URLs must not be empty".into()));
        }
        if p.history_days <= 0 || p.history_days > MAX_HISTORY_DAYS {
            return Err(ConfigError::Invalid(format!(
                "history_days must be between 1 and {}, got {}",
                MAX_HISTORY_DAYS, p.history_days
            )));
        }
        if p.forecast_days == 0 || p.forecast_days > 16 {
            return Err(ConfigError::Invalid(format!(
                "forecast_days must be between 1 and 16, got {}",
                p.forecast_days
            )));
        }
        if p.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be non-zero".into()));
        }
        self.scoring.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_reference_behaviour() {
        let config = Config::default();
        assert_eq!(config.providers.history_days, 1825);
        assert_eq!(config.providers.forecast_days, 7);
        assert_eq!(config.batch.request_delay(), Duration::from_secs(5));
        assert_eq!(config.batch.top_n, 10);
        assert_eq!(config.tables.output, PathBuf::from("rainiest_cities.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [batch]
            request_delay_secs = 1

            [providers]
            forecast_url = "http://localhost:9000/v1/forecast"
            "#,
        )
        .unwrap();

        assert_eq!(config.batch.request_delay_secs, 1);
        assert_eq!(config.batch.top_n, 10);
        assert_eq!(config.providers.forecast_url, "http://localhost:9000/v1/forecast");
        assert_eq!(config.providers.archive_url, DEFAULT_ARCHIVE_URL);
    }

    #[test]
    fn test_scoring_section_overrides_weights() {
        let config = Config::from_toml_str(
            r#"
            [scoring]
            period_weights = [1.0, 0.5, 0.25]
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.period_weights, vec![1.0, 0.5, 0.25]);
        assert_eq!(config.scoring.forecast_threshold_mm, 5.0);
    }

    #[test]
    fn test_unknown_types_are_rejected() {
        let result = Config::from_toml_str("[batch]\ntop_n = \"ten\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RAINRANK_ARCHIVE_URL", "http://127.0.0.1:1/archive"),
            ("RAINRANK_DELAY_SECS", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.providers.archive_url, "http://127.0.0.1:1/archive");
        assert_eq!(config.providers.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(config.batch.request_delay_secs, 0);
    }

    #[test]
    fn test_bad_delay_override_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "RAINRANK_DELAY_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_forecast_horizon() {
        let mut config = Config::default();
        config.providers.forecast_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_weights() {
        let mut config = Config::default();
        config.scoring.period_weights.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_file_and_environment_give_defaults() {
        let mut config = Config::from_toml_str("").unwrap();
        config.apply_env_overrides(|_| None).unwrap();
        assert_eq!(config.batch.top_n, 10);
        assert_eq!(config.batch.request_delay_secs, 5);
        assert_eq!(config.providers.archive_url, DEFAULT_ARCHIVE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_history_window() {
        let mut config = Config::default();
        config.providers.history_days = 200_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.providers.history_days = MAX_HISTORY_DAYS;
        assert!(config.validate().is_ok());

        config.providers.history_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_scoring_factors() {
        let mut config = Config::default();
        config.scoring.multiplier = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
