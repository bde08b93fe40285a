//! Precipitation data ingestion.
//!
//! Submodules:
//! - `open_meteo` — archive and forecast clients for the Open-Meteo APIs.

pub mod open_meteo;

use crate::model::{FetchError, ForecastSeries, HistoricalSeries, Location};

/// Anything that can supply both precipitation series for a coordinate.
///
/// The batch ranker only talks to this trait; `OpenMeteoClient` is the
/// production implementation.
pub trait PrecipitationSource {
    fn historical(&self, location: Location) -> Result<HistoricalSeries, FetchError>;
    fn forecast(&self, location: Location) -> Result<ForecastSeries, FetchError>;
}
