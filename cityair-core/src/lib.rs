//! Core library for the `cityair` tools.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - City-name normalization and geocoding (with a bounded lookup cache)
//! - Upstream providers (current weather, air quality)
//! - The JSON-backed per-city history store
//! - CSV export and HTML map rendering
//!
//! It is used by `cityair-cli` and `cityair-server`, but can also be reused by
//! other binaries or services.

pub mod config;
pub mod error;
pub mod export;
pub mod geocode;
pub mod history;
pub mod map;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;

pub use config::Config;
pub use error::ServiceError;
pub use geocode::Geocoder;
pub use history::HistoryStore;
pub use model::{Coordinates, HistoryEntry, Reading};
pub use normalize::normalize_city;
pub use service::{CityHistory, WeatherService};
