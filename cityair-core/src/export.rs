//! CSV export of a city's stored history.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::HistoryEntry;

/// One exported row; flat so every reading field becomes its own column.
#[derive(Debug, Serialize, Deserialize)]
pub struct CsvRow {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub source_time: Option<DateTime<Utc>>,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub wind_speed_mps: f64,
    pub aqi: Option<i64>,
    pub pm25: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&HistoryEntry> for CsvRow {
    fn from(entry: &HistoryEntry) -> Self {
        let r = &entry.reading;
        Self {
            city: r.city.clone(),
            timestamp: r.timestamp,
            source_time: r.source_time,
            temperature_c: r.temperature_c,
            humidity_pct: r.humidity_pct,
            condition: r.condition.clone(),
            wind_speed_mps: r.wind_speed_mps,
            aqi: r.aqi,
            pm25: r.pm25,
            latitude: r.coordinates.latitude,
            longitude: r.coordinates.longitude,
        }
    }
}

/// Write one CSV row per history entry into `dir`.
///
/// The filename carries the current date so repeated exports on different
/// days never collide: `{city}_weather_data_{YYYYMMDD}.csv`.
pub fn export_csv(city: &str, entries: &[HistoryEntry], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let filename = format!(
        "{}_weather_data_{}.csv",
        sanitize_filename(city),
        Utc::now().format("%Y%m%d")
    );
    let path = dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    for entry in entries {
        writer
            .serialize(CsvRow::from(entry))
            .context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush CSV export")?;
    Ok(path)
}

/// Keep alphanumerics; collapse every run of anything else to one underscore.
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep && !out.is_empty() {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, Reading};
    use tempfile::TempDir;

    fn entry(temp: f64, aqi: Option<i64>) -> HistoryEntry {
        let timestamp = Utc::now();
        HistoryEntry {
            timestamp,
            reading: Reading {
                city: "New York".to_string(),
                timestamp,
                source_time: None,
                temperature_c: temp,
                humidity_pct: 55,
                condition: "scattered clouds".to_string(),
                wind_speed_mps: 4.2,
                aqi,
                pm25: aqi.map(|_| 10.2),
                coordinates: Coordinates { latitude: 40.7128, longitude: -74.006 },
            },
        }
    }

    #[test]
    fn sanitize_keeps_alphanumerics_only() {
        assert_eq!(sanitize_filename("New York"), "New_York");
        assert_eq!(sanitize_filename("São Paulo"), "S_o_Paulo");
        assert_eq!(sanitize_filename("../../etc"), "etc");
        assert_eq!(sanitize_filename("Rio de Janeiro"), "Rio_de_Janeiro");
    }

    #[test]
    fn filename_contains_city_and_date() {
        let dir = TempDir::new().expect("tempdir");
        let path = export_csv("New York", &[entry(20.0, Some(42))], dir.path()).expect("export");

        let name = path.file_name().expect("filename").to_string_lossy();
        assert!(name.starts_with("New_York_weather_data_"));
        assert!(name.ends_with(".csv"));
        assert!(name.contains(&Utc::now().format("%Y%m%d").to_string()));
    }

    #[test]
    fn export_roundtrip_preserves_rows_and_fields() {
        let dir = TempDir::new().expect("tempdir");
        let entries = vec![entry(20.5, Some(42)), entry(21.0, None)];
        let path = export_csv("New York", &entries, dir.path()).expect("export");

        let mut reader = csv::Reader::from_path(&path).expect("open export");
        let rows: Vec<CsvRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("rows parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temperature_c, 20.5);
        assert_eq!(rows[0].aqi, Some(42));
        assert_eq!(rows[0].pm25, Some(10.2));
        assert_eq!(rows[1].aqi, None);
        assert_eq!(rows[1].latitude, 40.7128);
        assert_eq!(rows[1].condition, "scattered clouds");
    }
}
