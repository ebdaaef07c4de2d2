//! Orchestration of the fetch/persist pipeline and the derived views.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::ServiceError;
use crate::geocode::Geocoder;
use crate::history::HistoryStore;
use crate::model::{HistoryEntry, Reading};
use crate::normalize::normalize_city;
use crate::provider::aqicn::AqicnProvider;
use crate::provider::openweather::OpenWeatherProvider;
use crate::provider::{AirQuality, AirQualityObservation, CurrentWeather};

pub const DEFAULT_HISTORY_DAYS: i64 = 7;

/// Filtered history for one city, shaped for direct JSON responses.
#[derive(Debug, Clone, Serialize)]
pub struct CityHistory {
    pub city: String,
    pub data: Vec<HistoryEntry>,
}

/// Ties the pipeline together: normalize → resolve → fetch/merge → append.
///
/// All collaborators are injected at construction so the whole pipeline runs
/// against stub endpoints in tests.
#[derive(Debug)]
pub struct WeatherService {
    geocoder: Geocoder,
    weather: Box<dyn CurrentWeather>,
    air_quality: Option<Box<dyn AirQuality>>,
    store: HistoryStore,
    export_dir: PathBuf,
}

impl WeatherService {
    pub fn new(
        geocoder: Geocoder,
        weather: Box<dyn CurrentWeather>,
        air_quality: Option<Box<dyn AirQuality>>,
        store: HistoryStore,
        export_dir: PathBuf,
    ) -> Self {
        Self { geocoder, weather, air_quality, store, export_dir }
    }

    /// Build the full production pipeline from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.openweather_key()?.to_string();

        let geocoder = Geocoder::new(api_key.clone(), config.geocoding_url.clone())?;
        let weather = OpenWeatherProvider::new(api_key, config.weather_url.clone())?;

        let air_quality: Option<Box<dyn AirQuality>> = match config.aqicn_key() {
            Some(token) => Some(Box::new(AqicnProvider::new(
                token.to_string(),
                config.aqi_url.clone(),
            )?)),
            None => {
                tracing::warn!("No AQICN token configured; readings will carry no AQI fields");
                None
            }
        };

        Ok(Self::new(
            geocoder,
            Box::new(weather),
            air_quality,
            HistoryStore::open(&config.history_file),
            config.export_dir.clone(),
        ))
    }

    /// Fetch, merge and persist the current reading for a city.
    ///
    /// The air-quality upstream is best effort: its failure leaves the AQI
    /// fields absent. A failed history rewrite is logged but the reading is
    /// still returned, so callers cannot assume returned data was durably
    /// stored.
    pub async fn current(&mut self, raw_city: &str) -> Result<Reading, ServiceError> {
        let city = normalize_city(raw_city).ok_or(ServiceError::InvalidCity)?;

        let coords = self
            .geocoder
            .resolve(&city)
            .await
            .ok_or_else(|| ServiceError::NotFound(city.clone()))?;

        let weather = self
            .weather
            .current(coords)
            .await
            .map_err(ServiceError::Upstream)?;

        let air = match &self.air_quality {
            Some(provider) => match provider.current(coords).await {
                Ok(obs) => obs,
                Err(err) => {
                    tracing::debug!(%city, error = %err, "air quality fetch failed, degrading");
                    AirQualityObservation::default()
                }
            },
            None => AirQualityObservation::default(),
        };

        let reading = Reading {
            city: city.clone(),
            timestamp: Utc::now(),
            source_time: weather.observed_at,
            temperature_c: weather.temperature_c,
            humidity_pct: weather.humidity_pct,
            condition: weather.condition,
            wind_speed_mps: weather.wind_speed_mps,
            aqi: air.aqi,
            pm25: air.pm25,
            coordinates: coords,
        };

        if let Err(err) = self.store.append(&city, reading.clone()) {
            tracing::error!(
                %city,
                error = %err,
                "failed to persist reading; on-disk history now lags memory"
            );
        }

        Ok(reading)
    }

    /// Stored entries for a city within the last `window_days` days.
    pub fn history(&self, raw_city: &str, window_days: i64) -> Result<CityHistory, ServiceError> {
        let city = normalize_city(raw_city).ok_or(ServiceError::InvalidCity)?;
        let data = self
            .store
            .query(&city, window_days)
            .ok_or_else(|| ServiceError::NotFound(city.clone()))?;
        Ok(CityHistory { city, data })
    }

    /// Export a city's full history as CSV; returns the written path.
    pub fn export(&self, raw_city: &str) -> Result<PathBuf, ServiceError> {
        let city = normalize_city(raw_city).ok_or(ServiceError::InvalidCity)?;
        let entries = self
            .store
            .city_entries(&city)
            .ok_or_else(|| ServiceError::NotFound(city.clone()))?;
        crate::export::export_csv(&city, entries, &self.export_dir).map_err(ServiceError::Store)
    }

    /// Latest stored reading per city, sorted by city name.
    pub fn latest_readings(&self) -> Vec<Reading> {
        let mut readings: Vec<Reading> = self
            .store
            .all()
            .values()
            .filter_map(|entries| entries.last())
            .map(|entry| entry.reading.clone())
            .collect();
        readings.sort_by(|a, b| a.city.cmp(&b.city));
        readings
    }

    /// Where exports and rendered maps land.
    pub fn export_dir(&self) -> &PathBuf {
        &self.export_dir
    }
}
