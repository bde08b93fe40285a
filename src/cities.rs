//! World city reference table.
//!
//! Resolves a (city name, ISO country code) pair to coordinates using the
//! static `world_cities.csv` table. This is the single place coordinates are
//! looked up by name; the capital-city batch carries its own coordinates and
//! never goes through here.
//!
//! Matching is exact and case-sensitive on both columns. When the table holds
//! more than one row for the same pair (e.g. two `Springfield, US` entries),
//! the first row in file order wins.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::model::{Location, TableError};

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// One row of the reference table. Columns other than these four are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldCity {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

impl WorldCity {
    pub fn location(&self) -> Location {
        Location::new(self.lat, self.lng)
    }
}

/// The loaded reference table, in file order.
#[derive(Debug, Clone, Default)]
pub struct WorldCities {
    rows: Vec<WorldCity>,
}

impl WorldCities {
    pub fn new(rows: Vec<WorldCity>) -> Self {
        Self { rows }
    }

    /// Read the table from a CSV file. A missing or malformed file is fatal
    /// for any command that needs name lookups.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let rows = reader
            .deserialize::<WorldCity>()
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(source = "reference", rows = rows.len(), "world city table loaded");
        Ok(Self { rows })
    }

    /// Looks up a city by exact name and country code. Returns `None` if no
    /// row matches; with duplicates, the first row in table order.
    pub fn find(&self, city: &str, country: &str) -> Option<Location> {
        self.find_row(city, country).map(WorldCity::location)
    }

    pub fn find_row(&self, city: &str, country: &str) -> Option<&WorldCity> {
        self.rows
            .iter()
            .find(|row| row.name == city && row.country == country)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
