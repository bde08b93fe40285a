//! Raininess index.
//!
//! Turns a city's daily archive series and short forecast into a single
//! log-scaled number. The historical window is cut into equal periods, each
//! period's rain volume and rain-hours are summed and weighted, a flat boost
//! is added when the forecast shows a wet day, and the total is compressed
//! with `10 * log4(x + 1)`.
//!
//! With the default two weights a five-year window is split into two halves;
//! the first half of the series as returned by the provider carries the full
//! weight.

use serde::Deserialize;

use crate::model::{CityRainProfile, HistoricalSeries, RaininessIndex};

/// Tunable constants of the raininess formula.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// One weight per historical period; the series is split into
    /// `period_weights.len()` equal chunks.
    pub period_weights: Vec<f64>,
    /// Multiplier applied to weighted precipitation hours.
    pub hours_factor: f64,
    /// A forecast day at or above this many mm triggers the boost.
    pub forecast_threshold_mm: f64,
    pub forecast_boost: f64,
    pub log_base: f64,
    pub multiplier: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            period_weights: vec![1.0, 0.5],
            hours_factor: 0.3,
            forecast_threshold_mm: 5.0,
            forecast_boost: 10.0,
            log_base: 4.0,
            multiplier: 10.0,
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.period_weights.is_empty() {
            return Err("scoring.period_weights must contain at least one weight".into());
        }
        if self.period_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("scoring.period_weights must be finite and non-negative".into());
        }
        if !self.log_base.is_finite() || self.log_base <= 1.0 {
            return Err(format!("scoring.log_base must be > 1, got {}", self.log_base));
        }
        let factors = [
            self.hours_factor,
            self.forecast_threshold_mm,
            self.forecast_boost,
            self.multiplier,
        ];
        if factors.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err("scoring factors must be finite and non-negative".into());
        }
        Ok(())
    }
}

/// Weighted rain and rain-hour totals over the historical periods.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedTotals {
    pub rain_sum: f64,
    pub precipitation_hours: f64,
}

/// Score a profile with the default formula.
pub fn score(profile: &CityRainProfile) -> RaininessIndex {
    score_with(profile, &ScoringParams::default())
}

pub fn score_with(profile: &CityRainProfile, params: &ScoringParams) -> RaininessIndex {
    normalize(raw_index(profile, params), params)
}

/// The index before log normalization (weighted totals plus forecast boost).
pub fn raw_index(profile: &CityRainProfile, params: &ScoringParams) -> f64 {
    let totals = weighted_totals(&profile.historical, &params.period_weights);
    let mut index = totals.rain_sum + params.hours_factor * totals.precipitation_hours;

    if forecast_exceeds(&profile.forecast, params.forecast_threshold_mm) {
        index += params.forecast_boost;
    }
    index
}

/// `multiplier * log_base(raw + 1)`.
///
/// Provider data is never negative, so a negative raw index can only come
/// from corrupt input; it is clamped to zero and scores 0 rather than NaN.
pub fn normalize(raw: f64, params: &ScoringParams) -> RaininessIndex {
    let raw = if raw.is_nan() { 0.0 } else { raw.max(0.0) };
    params.multiplier * (raw + 1.0).ln() / params.log_base.ln()
}

/// Split both series into `weights.len()` chunks of `len(rain_sum) / n` days
/// and accumulate `weight * chunk_sum` for each metric.
///
/// Trailing days that do not fill a whole chunk are ignored. Chunk
/// boundaries come from the rain series; a shorter hours series just
/// contributes fewer days.
pub fn weighted_totals(series: &HistoricalSeries, weights: &[f64]) -> WeightedTotals {
    if weights.is_empty() {
        return WeightedTotals::default();
    }
    let chunk_size = series.rain_sum.len() / weights.len();

    weights
        .iter()
        .enumerate()
        .fold(WeightedTotals::default(), |acc, (i, weight)| {
            let start = i * chunk_size;
            let end = start + chunk_size;
            WeightedTotals {
                rain_sum: acc.rain_sum + weight * chunk_sum(&series.rain_sum, start, end),
                precipitation_hours: acc.precipitation_hours
                    + weight * chunk_sum(&series.precipitation_hours, start, end),
            }
        })
}

/// Sum of the present values in `values[start..end]`, clipped to the slice.
fn chunk_sum(values: &[Option<f64>], start: usize, end: usize) -> f64 {
    let end = end.min(values.len());
    if start >= end {
        return 0.0;
    }
    values[start..end].iter().flatten().sum()
}

pub fn forecast_exceeds(forecast: &[f64], threshold_mm: f64) -> bool {
    forecast.iter().any(|&mm| mm >= threshold_mm)
}
