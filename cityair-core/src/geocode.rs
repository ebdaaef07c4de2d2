//! City-name geocoding against the OpenWeather direct-geocoding endpoint.
//!
//! Lookup is two-stage: an exact single-result query first, then a broader
//! lowercased query whose candidates are matched by case-insensitive
//! substring. Results are memoized in a bounded LRU cache keyed by the
//! canonical city name.

use anyhow::{Context, Result, anyhow};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::model::Coordinates;
use crate::provider::truncate_body;

pub const DEFAULT_GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_CAPACITY: usize = 100;

/// Internal lookup outcome. The public contract collapses `NotFound` and
/// `Failed` into `None`, but the distinction is kept here so failures can be
/// logged as failures rather than silently reported as unknown cities.
#[derive(Debug)]
enum Lookup {
    Found(Coordinates),
    NotFound,
    Failed(anyhow::Error),
}

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug)]
pub struct Geocoder {
    api_key: String,
    base_url: String,
    http: Client,
    cache: Mutex<LruCache>,
}

impl Geocoder {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self {
            api_key,
            base_url,
            http,
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        })
    }

    /// Resolve a canonical city name to coordinates.
    ///
    /// Returns `None` both when the city is genuinely unknown and when the
    /// lookup itself failed; the two cases are logged differently.
    pub async fn resolve(&self, city: &str) -> Option<Coordinates> {
        if let Some(hit) = self.cache.lock().get(city) {
            tracing::debug!(%city, "geocoding cache hit");
            return Some(hit);
        }

        match self.lookup(city).await {
            Lookup::Found(coords) => {
                self.cache.lock().insert(city.to_string(), coords);
                Some(coords)
            }
            Lookup::NotFound => {
                tracing::info!(%city, "geocoding returned no match");
                None
            }
            Lookup::Failed(err) => {
                tracing::warn!(%city, error = %err, "geocoding lookup failed");
                None
            }
        }
    }

    async fn lookup(&self, city: &str) -> Lookup {
        // Stage 1: exact query, single result.
        match self.query(city, 1).await {
            Ok(candidates) => {
                if let Some(first) = candidates.first() {
                    return Lookup::Found(Coordinates {
                        latitude: first.lat,
                        longitude: first.lon,
                    });
                }
            }
            Err(err) => return Lookup::Failed(err),
        }

        // Stage 2: broader lowercased query, substring match on the name.
        let lower = city.to_lowercase();
        match self.query(&lower, 5).await {
            Ok(candidates) => {
                for candidate in candidates {
                    if candidate.name.to_lowercase().contains(&lower) {
                        return Lookup::Found(Coordinates {
                            latitude: candidate.lat,
                            longitude: candidate.lon,
                        });
                    }
                }
                Lookup::NotFound
            }
            Err(err) => Lookup::Failed(err),
        }
    }

    async fn query(&self, q: &str, limit: usize) -> Result<Vec<GeoCandidate>> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", q), ("limit", &limit.to_string()), ("appid", &self.api_key)])
            .send()
            .await
            .context("Failed to send geocoding request")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse geocoding JSON")
    }
}

/// Fixed-capacity LRU map. A hit refreshes recency; inserting at capacity
/// evicts the least-recently-used entry.
#[derive(Debug)]
struct LruCache {
    capacity: usize,
    map: HashMap<String, Coordinates>,
    recency: VecDeque<String>,
}

impl LruCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    fn get(&mut self, key: &str) -> Option<Coordinates> {
        let hit = self.map.get(key).copied();
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    fn insert(&mut self, key: String, value: Coordinates) {
        if self.map.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }

        self.recency.push_back(key);
        if self.map.len() > self.capacity {
            if let Some(oldest) = self.recency.pop_front() {
                self.map.remove(&oldest);
            }
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }
}
