use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::geocode::DEFAULT_GEOCODING_URL;
use crate::provider::{aqicn::DEFAULT_AQI_URL, openweather::DEFAULT_WEATHER_URL};

/// Top-level configuration stored on disk.
///
/// All endpoint URLs are overridable so components can be pointed at stub
/// servers in tests; credentials are explicit fields passed into the
/// components at construction time, never read from ambient process state by
/// the components themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key (geocoding + current weather). Required.
    pub openweather_api_key: Option<String>,

    /// AQICN/WAQI API token. Optional: readings degrade to absent AQI fields
    /// when missing or when the upstream fails.
    pub aqicn_api_key: Option<String>,

    /// Geocoding endpoint base URL.
    pub geocoding_url: String,

    /// Current-weather endpoint base URL.
    pub weather_url: String,

    /// Air-quality feed base URL.
    pub aqi_url: String,

    /// JSON document backing the per-city history.
    pub history_file: PathBuf,

    /// Directory for CSV exports and rendered maps.
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            aqicn_api_key: None,
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            aqi_url: DEFAULT_AQI_URL.to_string(),
            history_file: PathBuf::from("historical_data.json"),
            export_dir: PathBuf::from("data_exports"),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Load config from disk, then let `OPENWEATHER_API_KEY` / `AQICN_API_KEY`
    /// environment variables override the stored keys. Bootstrap helper for
    /// the binaries only.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        if let Ok(key) = env::var("OPENWEATHER_API_KEY") {
            cfg.openweather_api_key = Some(key);
        }
        if let Ok(key) = env::var("AQICN_API_KEY") {
            cfg.aqicn_api_key = Some(key);
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityair", "cityair")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The required OpenWeather key, with a setup hint when absent.
    pub fn openweather_key(&self) -> Result<&str> {
        self.openweather_api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `cityair configure` or set OPENWEATHER_API_KEY."
            )
        })
    }

    /// The optional AQICN token; `None` means readings carry no AQI fields.
    pub fn aqicn_key(&self) -> Option<&str> {
        self.aqicn_api_key.as_deref()
    }
}
