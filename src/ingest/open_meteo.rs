//! Open-Meteo Data API Client
//!
//! Retrieves daily precipitation for a coordinate from two Open-Meteo
//! endpoints:
//!   - the ERA5 archive, for a multi-year window ending today
//!     (`rain_sum` + `precipitation_hours`)
//!   - the forecast API, for the next few days (`rain_sum`)
//!
//! API Documentation: https://open-meteo.com/en/docs/historical-weather-api
//! Forecast: https://open-meteo.com/en/docs

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::ingest::PrecipitationSource;
use crate::model::{
    FetchError, ForecastSeries, HistoricalSeries, Location, METRIC_PRECIPITATION_HOURS,
    METRIC_RAIN_SUM,
};

// ============================================================================
// Open-Meteo API Response Structures
// ============================================================================

/// Archive response. `daily` is absent when the request was rejected, in
/// which case `error`/`reason` explain why.
#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    pub daily: Option<ArchiveDaily>,
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub rain_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_hours: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub daily: Option<ForecastDaily>,
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastDaily {
    pub rain_sum: Option<Vec<Option<f64>>>,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    reason: Option<String>,
}

// ============================================================================
// URL Construction
// ============================================================================

/// Start and end date of an archive window of `days` ending on `today`.
///
/// Windows reaching past the calendar range start at `NaiveDate::MIN`.
pub fn archive_window(today: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
    let start = Duration::try_days(days)
        .and_then(|span| today.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

pub fn build_archive_url(
    base_url: &str,
    location: Location,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> String {
    format!(
        "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily={}&daily={}",
        base_url.trim_end_matches('/'),
        location.latitude,
        location.longitude,
        start_date.format("%Y-%m-%d"),
        end_date.format("%Y-%m-%d"),
        METRIC_RAIN_SUM,
        METRIC_PRECIPITATION_HOURS,
    )
}

pub fn build_forecast_url(base_url: &str, location: Location, forecast_days: u8) -> String {
    format!(
        "{}?latitude={}&longitude={}&daily={}&forecast_days={}",
        base_url.trim_end_matches('/'),
        location.latitude,
        location.longitude,
        METRIC_RAIN_SUM,
        forecast_days,
    )
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Parse an archive body into a `HistoricalSeries`.
///
/// A body without a `daily` object is a shape error. If `daily` is present
/// but one metric array is missing, that metric comes back empty.
pub fn parse_archive_response(body: &str) -> Result<HistoricalSeries, FetchError> {
    let response: ArchiveResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Shape(format!("invalid archive JSON: {e}")))?;

    let daily = match response.daily {
        Some(daily) => daily,
        None if response.error => {
            return Err(FetchError::Shape(format!(
                "archive rejected request: {}",
                response.reason.unwrap_or_else(|| "no reason given".to_string())
            )));
        }
        None => return Err(FetchError::Shape("archive response has no `daily` object".into())),
    };

    if !daily.time.is_empty() && daily.time.len() != daily.rain_sum.len() {
        tracing::debug!(
            source = "archive",
            days = daily.time.len(),
            rain_days = daily.rain_sum.len(),
            "archive metric length differs from time axis"
        );
    }

    Ok(HistoricalSeries {
        rain_sum: daily.rain_sum,
        precipitation_hours: daily.precipitation_hours,
    })
}

/// Parse a forecast body into a `ForecastSeries`.
///
/// Missing `daily` or `daily.rain_sum` is a shape error. Days the model
/// left `null` are dropped.
pub fn parse_forecast_response(body: &str) -> Result<ForecastSeries, FetchError> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Shape(format!("invalid forecast JSON: {e}")))?;

    let daily = match response.daily {
        Some(daily) => daily,
        None if response.error => {
            return Err(FetchError::Shape(format!(
                "forecast rejected request: {}",
                response.reason.unwrap_or_else(|| "no reason given".to_string())
            )));
        }
        None => return Err(FetchError::Shape("forecast response has no `daily` object".into())),
    };

    let rain_sum = daily
        .rain_sum
        .ok_or_else(|| FetchError::Shape("forecast response has no `daily.rain_sum`".into()))?;

    Ok(rain_sum.into_iter().flatten().collect())
}

// ============================================================================
// API Client
// ============================================================================

/// Blocking Open-Meteo client. One instance serves a whole batch.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: reqwest::blocking::Client,
    archive_url: String,
    forecast_url: String,
    history_days: i64,
    forecast_days: u8,
}

impl OpenMeteoClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("rainrank/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            archive_url: config.archive_url.clone(),
            forecast_url: config.forecast_url.clone(),
            history_days: config.history_days,
            forecast_days: config.forecast_days,
        })
    }

    /// Fetch the archive window ending today (UTC).
    pub fn fetch_historical(&self, location: Location) -> Result<HistoricalSeries, FetchError> {
        self.fetch_historical_until(location, Utc::now().date_naive())
    }

    pub fn fetch_historical_until(
        &self,
        location: Location,
        end_date: NaiveDate,
    ) -> Result<HistoricalSeries, FetchError> {
        let (start, end) = archive_window(end_date, self.history_days);
        let url = build_archive_url(&self.archive_url, location, start, end);

        tracing::debug!(source = "archive", %location, %start, %end, "requesting archive");
        let body = self.get_body(&url)?;
        parse_archive_response(&body)
    }

    pub fn fetch_forecast(&self, location: Location) -> Result<ForecastSeries, FetchError> {
        let url = build_forecast_url(&self.forecast_url, location, self.forecast_days);

        tracing::debug!(source = "forecast", %location, days = self.forecast_days, "requesting forecast");
        let body = self.get_body(&url)?;
        parse_forecast_response(&body)
    }

    /// GET `url` and return the body of a 2xx response. Error responses are
    /// mapped to `HttpStatus`, carrying Open-Meteo's `reason` when present.
    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.reason);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason,
            });
        }

        Ok(body)
    }
}

impl PrecipitationSource for OpenMeteoClient {
    fn historical(&self, location: Location) -> Result<HistoricalSeries, FetchError> {
        self.fetch_historical(location)
    }

    fn forecast(&self, location: Location) -> Result<ForecastSeries, FetchError> {
        self.fetch_forecast(location)
    }
}

// ============================================================================
// Tests
// ============================================================================
