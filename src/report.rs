//! Ranked report output.
//!
//! Persists the full ranked set as CSV and renders the top-N console table.

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::model::{RankedCity, TableError};

/// One output row. Column names match the input table so the report can be
/// read back with the same tooling.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Capital City")]
    capital_city: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Raininess")]
    raininess: Option<f64>,
}

impl<'a> From<&'a RankedCity> for ReportRow<'a> {
    fn from(ranked: &'a RankedCity) -> Self {
        Self {
            capital_city: &ranked.city.capital_city,
            country: &ranked.city.country,
            latitude: ranked.city.latitude,
            longitude: ranked.city.longitude,
            raininess: ranked.raininess,
        }
    }
}

/// Write the ranked set in rank order. Unscored cities get an empty
/// `Raininess` field.
pub fn write_report<W: Write>(writer: W, ranked: &[RankedCity]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in ranked {
        wtr.serialize(ReportRow::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_report(path: &Path, ranked: &[RankedCity]) -> Result<(), TableError> {
    let file = std::fs::File::create(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_report(file, ranked).map_err(|source| TableError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = ranked.len(), "ranked report written");
    Ok(())
}

/// Render the first `n` rows as a fixed-width table.
pub fn format_top(ranked: &[RankedCity], n: usize) -> String {
    let mut out = format!("Top {} Rainiest Capital Cities:\n", n.min(ranked.len()));
    out.push_str(&format!(
        "{:>4}  {:<24} {:<24} {:>9} {:>10} {:>9}\n",
        "Rank", "Capital City", "Country", "Latitude", "Longitude", "Raininess"
    ));

    for row in ranked.iter().take(n) {
        let raininess = row
            .raininess
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>4}  {:<24} {:<24} {:>9.4} {:>10.4} {:>9}\n",
            row.rank,
            truncate(&row.city.capital_city, 24),
            truncate(&row.city.country, 24),
            row.city.latitude,
            row.city.longitude,
            raininess
        ));
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CapitalCity;

    fn ranked(rank: usize, name: &str, country: &str, raininess: Option<f64>) -> RankedCity {
        RankedCity {
            rank,
            city: CapitalCity {
                capital_city: name.to_string(),
                country: country.to_string(),
                latitude: 1.5,
                longitude: -2.25,
                population: Some(1000),
            },
            raininess,
        }
    }

    #[test]
    fn test_report_columns_and_rows() {
        let rows = vec![
            ranked(1, "Monrovia", "Liberia", Some(41.5)),
            ranked(2, "Lima", "Peru", None),
        ];
        let mut buf = Vec::new();
        write_report(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Capital City,Country,Latitude,Longitude,Raininess");
        assert_eq!(lines[1], "Monrovia,Liberia,1.5,-2.25,41.5");
        assert_eq!(lines[2], "Lima,Peru,1.5,-2.25,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_report_quotes_names_with_commas() {
        let rows = vec![ranked(1, "Washington, D.C.", "United States", Some(30.0))];
        let mut buf = Vec::new();
        write_report(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"Washington, D.C.\",United States"));
    }

    #[test]
    fn test_format_top_limits_rows() {
        let rows: Vec<_> = (1..=12)
            .map(|i| ranked(i, &format!("City{i}"), "Somewhere", Some(50.0 - i as f64)))
            .collect();
        let table = format_top(&rows, 10);

        assert!(table.starts_with("Top 10 Rainiest Capital Cities:"));
        assert!(table.contains("City10"));
        assert!(!table.contains("City11"));
        // title + header + 10 rows
        assert_eq!(table.lines().count(), 12);
    }

    #[test]
    fn test_format_top_shows_dash_for_unscored() {
        let rows = vec![ranked(1, "Lima", "Peru", None)];
        let table = format_top(&rows, 10);
        assert!(table.starts_with("Top 1 Rainiest"));
        assert!(table.lines().nth(2).unwrap().trim_end().ends_with('-'));
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("Sri Jayawardenepura Kotte", 10), "Sri Jayaw…");
        assert_eq!(truncate("Lima", 10), "Lima");
    }
}
