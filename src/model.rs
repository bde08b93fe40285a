//! Core data types for the capital-city raininess ranking service.
//!
//! This module defines the shared domain model imported by all other modules:
//! coordinates, the two precipitation series shapes returned by the providers,
//! the per-city profile the scorer consumes, and the ranked result rows.
//! It contains no I/O.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Provider metric names
// ---------------------------------------------------------------------------

/// Open-Meteo daily metric for total rain, in millimetres.
pub const METRIC_RAIN_SUM: &str = "rain_sum";

/// Open-Meteo daily metric for the number of hours with precipitation.
pub const METRIC_PRECIPITATION_HOURS: &str = "precipitation_hours";

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 coordinate pair, resolved once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Precipitation series
// ---------------------------------------------------------------------------

/// Daily archive data for one coordinate, one entry per calendar day.
///
/// Corresponds to the `daily.rain_sum` and `daily.precipitation_hours`
/// arrays of an Open-Meteo archive response. Days the provider could not
/// fill come back as JSON `null` and are kept as `None` so the day index
/// stays aligned with the query window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    pub rain_sum: Vec<Option<f64>>,          // mm per day
    pub precipitation_hours: Vec<Option<f64>>, // hours per day
}

impl HistoricalSeries {
    /// The degraded value used when the archive could not be read.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rain_sum.is_empty() && self.precipitation_hours.is_empty()
    }

    /// Number of days covered by the rain series.
    pub fn days(&self) -> usize {
        self.rain_sum.len()
    }
}

/// Daily forecast rain sums in millimetres, nearest day first.
pub type ForecastSeries = Vec<f64>;

/// Output of the scorer. Zero for a city with no rain data at all.
pub type RaininessIndex = f64;

/// Everything the scorer needs to know about one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRainProfile {
    pub city: String,
    pub country: String,
    pub historical: HistoricalSeries,
    pub forecast: ForecastSeries,
}

// ---------------------------------------------------------------------------
// Batch rows
// ---------------------------------------------------------------------------

/// One row of the capital-city batch table.
///
/// Field names follow the column headers of
/// `country-capital-lat-long-population.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalCity {
    #[serde(rename = "Capital City")]
    pub capital_city: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Population", default, deserialize_with = "csv::invalid_option")]
    pub population: Option<u64>,
}

impl CapitalCity {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// A capital city after scoring and sorting.
///
/// `raininess` is `None` when the city could not be scored; such rows
/// always sort after every scored row.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCity {
    pub rank: usize, // 1-based
    pub city: CapitalCity,
    pub raininess: Option<RaininessIndex>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from a single Open-Meteo request.
///
/// Both fetchers return these; whether a failure degrades or drops the city
/// is decided by the batch ranker, not here.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or body-read failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response from the provider.
    #[error("HTTP error: {status}{}", reason_suffix(.reason))]
    HttpStatus { status: u16, reason: Option<String> },
    /// The body was not the JSON shape we asked for.
    #[error("Shape error: {0}")]
    Shape(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default()
}

/// Errors reading an input table or writing the ranked report.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_historical_series() {
        let series = HistoricalSeries::empty();
        assert!(series.is_empty());
        assert_eq!(series.days(), 0);
    }

    #[test]
    fn test_series_with_only_null_days_is_not_empty() {
        let series = HistoricalSeries {
            rain_sum: vec![None, None],
            precipitation_hours: vec![None, None],
        };
        assert!(!series.is_empty());
        assert_eq!(series.days(), 2);
    }

    #[test]
    fn test_capital_city_location() {
        let city = CapitalCity {
            capital_city: "Wellington".to_string(),
            country: "New Zealand".to_string(),
            latitude: -41.2866,
            longitude: 174.7756,
            population: Some(411_000),
        };
        assert_eq!(city.location(), Location::new(-41.2866, 174.7756));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(51.5, -0.12).to_string(), "(51.5, -0.12)");
    }

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::HttpStatus { status: 400, reason: Some("Parameter 'latitude' out of range".into()) };
        assert_eq!(err.to_string(), "HTTP error: 400 (Parameter 'latitude' out of range)");

        let err = FetchError::HttpStatus { status: 503, reason: None };
        assert_eq!(err.to_string(), "HTTP error: 503");

        let err = FetchError::Shape("missing `daily`".into());
        assert_eq!(err.to_string(), "Shape error: missing `daily`");
    }

    #[test]
    fn test_metric_names_are_distinct() {
        assert_ne!(METRIC_RAIN_SUM, METRIC_PRECIPITATION_HOURS);
    }
}
