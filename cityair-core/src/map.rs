//! Self-contained Leaflet map of the latest stored reading per city.

use chrono::Utc;
use std::fmt::Write as _;

use crate::model::{Reading, aqi_category};

/// Render an HTML page with one marker per reading.
///
/// The page pulls Leaflet from its CDN and needs no server; an empty input
/// renders a world view with no markers.
pub fn render_map(readings: &[Reading]) -> String {
    let (center_lat, center_lon) = center_of(readings);

    let mut markers = String::new();
    for reading in readings {
        let _ = writeln!(
            markers,
            "    L.marker([{}, {}]).addTo(map).bindPopup({});",
            reading.coordinates.latitude,
            reading.coordinates.longitude,
            js_string(&popup_html(reading)),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>City weather &amp; air quality, {date}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
    var map = L.map('map').setView([{center_lat}, {center_lon}], 3);
    L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
        attribution: '&copy; OpenStreetMap contributors'
    }}).addTo(map);
{markers}</script>
</body>
</html>
"#,
        date = Utc::now().format("%Y-%m-%d"),
    )
}

fn popup_html(reading: &Reading) -> String {
    let aqi_line = match reading.aqi {
        Some(aqi) => format!("AQI: {aqi} ({})", aqi_category(aqi)),
        None => "AQI: unavailable".to_string(),
    };
    format!(
        "<b>{}</b><br>{:.1} °C, {}<br>{}",
        html_escape(&reading.city),
        reading.temperature_c,
        html_escape(&reading.condition),
        aqi_line,
    )
}

fn center_of(readings: &[Reading]) -> (f64, f64) {
    if readings.is_empty() {
        return (20.0, 0.0);
    }
    let n = readings.len() as f64;
    let lat = readings.iter().map(|r| r.coordinates.latitude).sum::<f64>() / n;
    let lon = readings.iter().map(|r| r.coordinates.longitude).sum::<f64>() / n;
    (lat, lon)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn js_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
