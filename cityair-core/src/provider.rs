//! Upstream data providers.
//!
//! Two independent upstreams feed one merged reading: the current-weather
//! endpoint (required) and the air-quality feed (best effort). Each is behind
//! a small trait so the orchestrating service can be exercised against stubs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::model::Coordinates;

pub mod aqicn;
pub mod openweather;

/// A current-weather observation, before merging.
#[derive(Debug, Clone)]
pub struct WeatherObservation {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub wind_speed_mps: f64,
    /// Upstream-reported observation time, when present.
    pub observed_at: Option<DateTime<Utc>>,
}

/// An air-quality observation, before merging. Fields may individually be
/// absent even on a successful response.
#[derive(Debug, Clone, Default)]
pub struct AirQualityObservation {
    pub aqi: Option<i64>,
    pub pm25: Option<f64>,
}

#[async_trait]
pub trait CurrentWeather: Send + Sync + Debug {
    async fn current(&self, coords: Coordinates) -> anyhow::Result<WeatherObservation>;
}

#[async_trait]
pub trait AirQuality: Send + Sync + Debug {
    async fn current(&self, coords: Coordinates) -> anyhow::Result<AirQualityObservation>;
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    // Cut on a char boundary; upstream error bodies are not guaranteed ASCII.
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
