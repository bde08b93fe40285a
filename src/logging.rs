//! Structured logging for the raininess ranking service
//!
//! Provides context-rich logging with data source and city/coordinate
//! identifiers on top of `tracing`. Records go to stderr and, when
//! configured, are appended to a log file for unattended batch runs.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Archive,
    Forecast,
    Reference,
    Batch,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Archive => "archive",
            DataSource::Forecast => "forecast",
            DataSource::Reference => "reference",
            DataSource::Batch => "batch",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - upstream quota hit while pacing a long batch
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify an Open-Meteo request failure.
pub fn classify_fetch_failure(err: &FetchError) -> FailureType {
    match err {
        // Rate limiting is the one failure the batch delay exists for
        FetchError::HttpStatus { status: 429, .. } => FailureType::Expected,
        FetchError::HttpStatus { status, .. } if *status >= 500 => FailureType::Unexpected,
        // 4xx usually means a coordinate or date the provider does not cover
        FetchError::HttpStatus { .. } => FailureType::Unknown,
        FetchError::Transport(_) => FailureType::Unexpected,
        // Parse errors suggest API changes
        FetchError::Shape(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Initialisation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level` when set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a provider failure for one city, with automatic classification.
///
/// `outcome` says what the batch did about it (e.g. "using empty series").
pub fn log_fetch_failure(
    source: DataSource,
    subject: &str,
    location: crate::model::Location,
    outcome: &str,
    err: &FetchError,
) {
    let failure_type = classify_fetch_failure(err);
    let source = source.as_str();

    match failure_type {
        FailureType::Expected => tracing::info!(
            source, subject, %location, failure = %failure_type, error = %err, "{}", outcome
        ),
        FailureType::Unknown => tracing::warn!(
            source, subject, %location, failure = %failure_type, error = %err, "{}", outcome
        ),
        FailureType::Unexpected => tracing::error!(
            source, subject, %location, failure = %failure_type, error = %err, "{}", outcome
        ),
    }
}

// ---------------------------------------------------------------------------
// Batch Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a ranking run.
pub fn log_batch_summary(total: usize, scored: usize, failed: usize) {
    let source = DataSource::Batch.as_str();
    let message = format!("Batch complete: {}/{} scored, {} failed", scored, total, failed);

    if failed == 0 {
        tracing::info!(source, total, scored, failed, "{}", message);
    } else if scored == 0 {
        tracing::error!(source, total, scored, failed, "{}", message);
    } else {
        tracing::warn!(source, total, scored, failed, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_labels() {
        assert_eq!(DataSource::Archive.to_string(), "archive");
        assert_eq!(DataSource::Forecast.to_string(), "forecast");
        assert_eq!(DataSource::Batch.to_string(), "batch");
    }

    #[test]
    fn test_failure_classification() {
        let rate_limited = FetchError::HttpStatus { status: 429, reason: None };
        assert_eq!(classify_fetch_failure(&rate_limited), FailureType::Expected);

        let server_error = FetchError::HttpStatus { status: 502, reason: None };
        assert_eq!(classify_fetch_failure(&server_error), FailureType::Unexpected);

        let bad_request = FetchError::HttpStatus {
            status: 400,
            reason: Some("Latitude must be in range of -90 to 90°".into()),
        };
        assert_eq!(classify_fetch_failure(&bad_request), FailureType::Unknown);

        let shape = FetchError::Shape("archive response has no `daily` object".into());
        assert_eq!(classify_fetch_failure(&shape), FailureType::Unexpected);
    }

    #[test]
    fn test_logging_without_subscriber_is_harmless() {
        log_batch_summary(3, 2, 1);
        log_fetch_failure(
            DataSource::Forecast,
            "Lima, Peru",
            crate::model::Location::new(-12.04, -77.03),
            "city left unscored",
            &FetchError::Shape("missing".into()),
        );
    }
}
