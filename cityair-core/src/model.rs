use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates resolved for a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One merged weather + air-quality observation for a city.
///
/// `timestamp` is the collection instant (when the two upstream responses were
/// merged); the upstream-reported observation time, if any, is kept separately
/// in `source_time`. The AQI fields are `None` when the air-quality upstream
/// was unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub source_time: Option<DateTime<Utc>>,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub wind_speed_mps: f64,
    pub aqi: Option<i64>,
    pub pm25: Option<f64>,
    pub coordinates: Coordinates,
}

/// A single entry in a city's append-only history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
}

/// Map an AQI value onto the standard severity bands.
pub fn aqi_category(aqi: i64) -> &'static str {
    match aqi {
        i64::MIN..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy for Sensitive Groups",
        151..=200 => "Unhealthy",
        201..=300 => "Very Unhealthy",
        _ => "Hazardous",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aqi_category_bands() {
        assert_eq!(aqi_category(0), "Good");
        assert_eq!(aqi_category(50), "Good");
        assert_eq!(aqi_category(51), "Moderate");
        assert_eq!(aqi_category(100), "Moderate");
        assert_eq!(aqi_category(150), "Unhealthy for Sensitive Groups");
        assert_eq!(aqi_category(200), "Unhealthy");
        assert_eq!(aqi_category(300), "Very Unhealthy");
        assert_eq!(aqi_category(301), "Hazardous");
    }

    #[test]
    fn reading_json_roundtrip_preserves_optional_fields() {
        let reading = Reading {
            city: "London".to_string(),
            timestamp: Utc::now(),
            source_time: None,
            temperature_c: 20.5,
            humidity_pct: 60,
            condition: "clear sky".to_string(),
            wind_speed_mps: 3.1,
            aqi: None,
            pm25: None,
            coordinates: Coordinates { latitude: 51.5074, longitude: -0.1278 },
        };

        let json = serde_json::to_string(&reading).expect("serialize");
        let back: Reading = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(back.city, "London");
        assert_eq!(back.aqi, None);
        assert_eq!(back.pm25, None);
        assert_eq!(back.coordinates, reading.coordinates);
    }
}
