//! Provider Verification Module
//!
//! Checks a sample of capital cities against the configured archive and
//! forecast endpoints to confirm both answer with the expected daily shape
//! before committing to a full (slow, paced) ranking run.

use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

use crate::ingest::PrecipitationSource;
use crate::model::CapitalCity;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<CityVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityVerification {
    pub city: String,
    pub country: String,
    pub status: VerificationStatus,
    pub archive_days: usize,
    /// Archive days the provider left null.
    pub archive_missing_days: usize,
    pub forecast_days: usize,
    pub error_messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

pub fn verify_city<S: PrecipitationSource>(source: &S, city: &CapitalCity) -> CityVerification {
    let mut result = CityVerification {
        city: city.capital_city.clone(),
        country: city.country.clone(),
        status: VerificationStatus::Failed,
        archive_days: 0,
        archive_missing_days: 0,
        forecast_days: 0,
        error_messages: Vec::new(),
    };

    let archive_ok = match source.historical(city.location()) {
        Ok(series) => {
            result.archive_days = series.rain_sum.len();
            result.archive_missing_days = series.rain_sum.iter().filter(|d| d.is_none()).count();
            if series.rain_sum.is_empty() {
                result.error_messages.push("archive: empty rain_sum".to_string());
            }
            !series.rain_sum.is_empty()
        }
        Err(e) => {
            result.error_messages.push(format!("archive: {}", e));
            false
        }
    };

    let forecast_ok = match source.forecast(city.location()) {
        Ok(series) => {
            result.forecast_days = series.len();
            !series.is_empty()
        }
        Err(e) => {
            result.error_messages.push(format!("forecast: {}", e));
            false
        }
    };

    result.status = match (archive_ok, forecast_ok) {
        (true, true) => VerificationStatus::Success,
        (false, false) => VerificationStatus::Failed,
        _ => VerificationStatus::PartialSuccess,
    };
    result
}

/// Verify each city in turn, pausing `delay` between cities.
pub fn verify_all<S: PrecipitationSource>(
    source: &S,
    cities: &[CapitalCity],
    delay: Duration,
) -> VerificationReport {
    let mut results = Vec::with_capacity(cities.len());
    for (i, city) in cities.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let result = verify_city(source, city);
        tracing::info!(
            source = "verify",
            city = %result.city,
            status = ?result.status,
            archive_days = result.archive_days,
            forecast_days = result.forecast_days,
            "provider check"
        );
        results.push(result);
    }

    let summary = summarize(&results);
    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results,
        summary,
    }
}

pub fn summarize(results: &[CityVerification]) -> VerificationSummary {
    let mut summary = VerificationSummary {
        total: results.len(),
        ..Default::default()
    };
    for r in results {
        match r.status {
            VerificationStatus::Success => summary.working += 1,
            VerificationStatus::PartialSuccess => summary.partial += 1,
            VerificationStatus::Failed => summary.failed += 1,
        }
    }
    summary
}
