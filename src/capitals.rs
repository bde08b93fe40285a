//! Capital-city batch table.
//!
//! Loads `country-capital-lat-long-population.csv`, the list of cities the
//! ranker scores. Rows already carry coordinates, so no name lookup is
//! needed. Extra columns (e.g. `Capital Type`) are ignored.

use std::io::Read;
use std::path::Path;

use crate::model::{CapitalCity, TableError};

pub fn load_capitals(path: &Path) -> Result<Vec<CapitalCity>, TableError> {
    let file = std::fs::File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_capitals(file).map_err(|source| TableError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_capitals<R: Read>(reader: R) -> Result<Vec<CapitalCity>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let capitals = reader
        .deserialize::<CapitalCity>()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(source = "reference", rows = capitals.len(), "capital table loaded");
    Ok(capitals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_in_file_order() {
        let csv = "\
Country,Capital City,Latitude,Longitude,Population,Capital Type
Afghanistan,Kabul,34.5289,69.1725,4011770,Capital
Albania,Tirana,41.3275,19.8189,475577,Capital
";
        let capitals = read_capitals(csv.as_bytes()).unwrap();
        assert_eq!(capitals.len(), 2);
        assert_eq!(capitals[0].capital_city, "Kabul");
        assert_eq!(capitals[0].country, "Afghanistan");
        assert_eq!(capitals[0].population, Some(4_011_770));
        assert_eq!(capitals[1].capital_city, "Tirana");
        assert_eq!(capitals[1].latitude, 41.3275);
    }

    #[test]
    fn test_missing_or_odd_population_is_none() {
        let csv = "\
Country,Capital City,Latitude,Longitude,Population
Nauru,Yaren,-0.5477,166.9209,
Vatican City,Vatican City,41.9029,12.4534,about 800
";
        let capitals = read_capitals(csv.as_bytes()).unwrap();
        assert_eq!(capitals[0].population, None);
        assert_eq!(capitals[1].population, None);
    }

    #[test]
    fn test_missing_coordinates_column_is_an_error() {
        let csv = "Country,Capital City,Population\nPeru,Lima,9751717\n";
        assert!(read_capitals(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_capitals(Path::new("no/such/capitals.csv"));
        assert!(matches!(result, Err(TableError::Io { .. })));
    }
}
