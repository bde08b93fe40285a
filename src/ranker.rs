//! Batch ranking of capital cities by raininess.
//!
//! Walks the capital table in order, one city at a time: fetch the archive
//! and forecast for the row's own coordinates, score, then pause before the
//! next city. Failures stay inside the city they belong to:
//!
//! - archive failure → logged, city scored on an empty history
//! - forecast failure → logged, city kept with no score
//!
//! Once every city is processed the rows are sorted by score, highest first,
//! unscored rows last, and numbered from 1.

use std::cmp::Ordering;
use std::time::Duration;

use crate::analysis::raininess::{self, ScoringParams};
use crate::ingest::PrecipitationSource;
use crate::logging::{self, DataSource};
use crate::model::{
    CapitalCity, CityRainProfile, FetchError, HistoricalSeries, Location, RankedCity,
    RaininessIndex,
};

/// Knobs for a ranking run.
#[derive(Debug, Clone)]
pub struct RankOptions {
    pub scoring: ScoringParams,
    /// Pause between successive cities. Zero disables pacing.
    pub delay: Duration,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            scoring: ScoringParams::default(),
            delay: Duration::from_secs(5),
        }
    }
}

/// Fetch, score and rank every city.
pub fn rank_cities<S: PrecipitationSource>(
    source: &S,
    cities: &[CapitalCity],
    options: &RankOptions,
) -> Vec<RankedCity> {
    rank_cities_with_pause(source, cities, options, std::thread::sleep)
}

/// Same as [`rank_cities`], with the pause between cities injected.
pub fn rank_cities_with_pause<S, P>(
    source: &S,
    cities: &[CapitalCity],
    options: &RankOptions,
    mut pause: P,
) -> Vec<RankedCity>
where
    S: PrecipitationSource,
    P: FnMut(Duration),
{
    let total = cities.len();

    let scored = cities
        .iter()
        .enumerate()
        .fold(Vec::with_capacity(total), |mut acc, (i, city)| {
            if i > 0 && !options.delay.is_zero() {
                pause(options.delay);
            }

            tracing::info!(
                source = DataSource::Batch.as_str(),
                city = %city.capital_city,
                country = %city.country,
                "[{}/{}] scoring",
                i + 1,
                total
            );

            let raininess = match score_city(
                source,
                &city.capital_city,
                &city.country,
                city.location(),
                &options.scoring,
            ) {
                Ok(score) => Some(score),
                Err(err) => {
                    logging::log_fetch_failure(
                        DataSource::Forecast,
                        &format!("{}, {}", city.capital_city, city.country),
                        city.location(),
                        "city left unscored",
                        &err,
                    );
                    None
                }
            };

            acc.push((city.clone(), raininess));
            acc
        });

    let failed = scored.iter().filter(|(_, r)| r.is_none()).count();
    logging::log_batch_summary(total, total - failed, failed);

    sort_and_number(scored)
}

/// Build one city's profile from `source` and score it.
///
/// An archive failure degrades to an empty history; a forecast failure is
/// returned to the caller.
pub fn score_city<S: PrecipitationSource>(
    source: &S,
    city: &str,
    country: &str,
    location: Location,
    params: &ScoringParams,
) -> Result<RaininessIndex, FetchError> {
    let profile = build_profile(source, city, country, location)?;
    Ok(raininess::score_with(&profile, params))
}

pub fn build_profile<S: PrecipitationSource>(
    source: &S,
    city: &str,
    country: &str,
    location: Location,
) -> Result<CityRainProfile, FetchError> {
    let historical = source.historical(location).unwrap_or_else(|err| {
        logging::log_fetch_failure(
            DataSource::Archive,
            &format!("{city}, {country}"),
            location,
            "using empty series",
            &err,
        );
        HistoricalSeries::empty()
    });

    let forecast = source.forecast(location)?;

    Ok(CityRainProfile {
        city: city.to_string(),
        country: country.to_string(),
        historical,
        forecast,
    })
}

/// Sort by score descending, unscored last, input order kept for ties,
/// then assign ranks starting at 1.
pub fn sort_and_number(mut scored: Vec<(CapitalCity, Option<RaininessIndex>)>) -> Vec<RankedCity> {
    scored.sort_by(|(_, a), (_, b)| compare_scores(*a, *b));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (city, raininess))| RankedCity {
            rank: i + 1,
            city,
            raininess,
        })
        .collect()
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
