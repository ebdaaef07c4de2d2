use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::model::Coordinates;
use crate::provider::{AirQuality, AirQualityObservation, truncate_body};

pub const DEFAULT_AQI_URL: &str = "https://api.waqi.info/feed";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Best-effort upstream: AQI and pollutant readings by coordinates.
///
/// Callers treat any error here as degradation, not failure; the feed also
/// reports `"aqi": "-"` for stations without a composite index, which maps to
/// `None` rather than an error.
#[derive(Debug, Clone)]
pub struct AqicnProvider {
    token: String,
    base_url: String,
    http: Client,
}

impl AqicnProvider {
    pub fn new(token: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build AQICN HTTP client")?;

        Ok(Self { token, base_url, http })
    }
}

#[derive(Debug, Deserialize)]
struct AqMetric {
    v: f64,
}

#[derive(Debug, Deserialize)]
struct AqData {
    // "-" when the station has no composite index, an integer otherwise.
    aqi: Option<serde_json::Value>,
    #[serde(default)]
    iaqi: HashMap<String, AqMetric>,
}

#[derive(Debug, Deserialize)]
struct AqResponse {
    status: String,
    data: Option<AqData>,
}

#[async_trait]
impl AirQuality for AqicnProvider {
    async fn current(&self, coords: Coordinates) -> Result<AirQualityObservation> {
        let url = format!(
            "{}/geo:{};{}/",
            self.base_url, coords.latitude, coords.longitude
        );

        let res = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .context("Failed to send request to AQICN")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read AQICN response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "AQICN request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: AqResponse =
            serde_json::from_str(&body).context("Failed to parse AQICN JSON")?;

        if parsed.status != "ok" {
            return Err(anyhow!("AQICN reported status '{}'", parsed.status));
        }

        let data = parsed
            .data
            .ok_or_else(|| anyhow!("AQICN response carried no data section"))?;

        Ok(AirQualityObservation {
            aqi: data.aqi.as_ref().and_then(serde_json::Value::as_i64),
            pm25: data.iaqi.get("pm25").map(|m| m.v),
        })
    }
}
