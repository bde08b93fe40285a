//! Capital-city raininess ranking service.
//!
//! Fetches daily precipitation from Open-Meteo for each capital city,
//! reduces it to a single log-scaled raininess index, and ranks the cities.

pub mod analysis;
pub mod capitals;
pub mod cities;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod ranker;
pub mod report;
pub mod verify;
