//! Append-only per-city history, backed by a single JSON document.
//!
//! The whole document is loaded once at startup and rewritten in full after
//! every append. The in-memory map is the source of truth; a failed rewrite
//! leaves disk behind memory and is surfaced to the caller, who decides
//! whether that unwinds the operation (the service logs it and carries on).

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::model::{HistoryEntry, Reading};

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: HashMap<String, Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Open the store at `path`. A missing or unparsable document starts the
    /// store empty rather than failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "history document is unparsable, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self { path, entries }
    }

    /// Append a reading to `city`'s sequence and rewrite the backing document.
    ///
    /// The in-memory append happens regardless of whether the rewrite
    /// succeeds; a returned error means disk and memory have diverged.
    pub fn append(&mut self, city: &str, reading: Reading) -> Result<()> {
        let entry = HistoryEntry { timestamp: reading.timestamp, reading };
        self.entries.entry(city.to_string()).or_default().push(entry);
        self.persist()
    }

    /// Entries for `city` whose timestamp falls within the last `window_days`
    /// days, inclusive of the lower bound, in append (chronological) order.
    ///
    /// `None` means the city was never appended; `Some(vec![])` means it is
    /// known but every entry is older than the window.
    pub fn query(&self, city: &str, window_days: i64) -> Option<Vec<HistoryEntry>> {
        let entries = self.entries.get(city)?;
        // Day counts beyond chrono's representable range cannot panic the
        // cutoff arithmetic: an unrepresentable past window covers every
        // entry, an unrepresentable future cutoff covers none.
        let cutoff = Duration::try_days(window_days)
            .and_then(|window| Utc::now().checked_sub_signed(window));
        let filtered = match cutoff {
            Some(cutoff) => entries
                .iter()
                .filter(|e| e.timestamp >= cutoff)
                .cloned()
                .collect(),
            None if window_days < 0 => Vec::new(),
            None => entries.clone(),
        };
        Some(filtered)
    }

    /// Full sequence for a city, or `None` if it was never appended.
    pub fn city_entries(&self, city: &str) -> Option<&[HistoryEntry]> {
        self.entries.get(city).map(Vec::as_slice)
    }

    /// The whole history map.
    pub fn all(&self) -> &HashMap<String, Vec<HistoryEntry>> {
        &self.entries
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create history directory: {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string(&self.entries)
            .context("Failed to serialize history document")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    fn reading(city: &str, timestamp: DateTime<Utc>, temp: f64) -> Reading {
        Reading {
            city: city.to_string(),
            timestamp,
            source_time: None,
            temperature_c: temp,
            humidity_pct: 50,
            condition: "clear".to_string(),
            wind_speed_mps: 1.0,
            aqi: Some(40),
            pm25: Some(9.5),
            coordinates: Coordinates { latitude: 48.8566, longitude: 2.3522 },
        }
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = HistoryStore::open(dir.path().join("absent.json"));
        assert!(store.all().is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").expect("write corrupt file");

        let store = HistoryStore::open(&path);
        assert!(store.all().is_empty());
    }

    #[test]
    fn append_survives_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::open(&path);
        store.append("Paris", reading("Paris", Utc::now(), 18.0)).expect("append");
        store.append("Paris", reading("Paris", Utc::now(), 19.0)).expect("append");

        let reopened = HistoryStore::open(&path);
        let entries = reopened.city_entries("Paris").expect("city present");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].reading.temperature_c, 18.0);
        assert_eq!(entries[1].reading.temperature_c, 19.0);
    }

    #[test]
    fn window_filter_drops_old_entries_and_keeps_order() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = HistoryStore::open(dir.path().join("history.json"));

        let now = Utc::now();
        let t1 = now - Duration::days(10);
        let t2 = now - Duration::days(2);
        let t3 = now - Duration::hours(1);
        for (ts, temp) in [(t1, 10.0), (t2, 11.0), (t3, 12.0)] {
            store.append("Paris", reading("Paris", ts, temp)).expect("append");
        }

        let recent = store.query("Paris", 5).expect("city present");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, t2);
        assert_eq!(recent[1].timestamp, t3);
    }

    #[test]
    fn extreme_day_windows_do_not_panic() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = HistoryStore::open(dir.path().join("history.json"));
        store.append("Paris", reading("Paris", Utc::now(), 18.0)).expect("append");

        // Untrusted day counts arrive unchecked from query parameters.
        let everything = store.query("Paris", i64::MAX).expect("city present");
        assert_eq!(everything.len(), 1);

        let nothing = store.query("Paris", i64::MIN).expect("city present");
        assert!(nothing.is_empty());

        let future_cutoff = store.query("Paris", -1).expect("city present");
        assert!(future_cutoff.is_empty());
    }

    #[test]
    fn never_seen_city_is_distinct_from_empty_window() {
        let dir = TempDir::new().expect("tempdir");
        let mut store = HistoryStore::open(dir.path().join("history.json"));

        let old = Utc::now() - Duration::days(30);
        store.append("Paris", reading("Paris", old, 9.0)).expect("append");

        assert!(store.query("Atlantis", 7).is_none());
        let filtered = store.query("Paris", 7).expect("city present");
        assert!(filtered.is_empty());
    }
}
