use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;

use cityair_core::model::aqi_category;
use cityair_core::service::DEFAULT_HISTORY_DAYS;
use cityair_core::{Config, Reading, WeatherService, map};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityair", version, about = "City weather & air quality CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API keys in the configuration file.
    Configure,

    /// Fetch and record the current reading for a city.
    Show {
        /// City name, e.g. "London" or "new york".
        city: String,
    },

    /// Print the stored readings for a city over the last N days.
    History {
        /// City name.
        city: String,

        /// Day window, counted back from now.
        #[arg(long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: i64,
    },

    /// Export a city's full history to a CSV file.
    Export {
        /// City name.
        city: String,
    },

    /// Render an HTML map of the latest stored reading per city.
    Map,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => {
                let mut service = load_service()?;
                let reading = service.current(&city).await?;
                print_reading(&reading);
                Ok(())
            }
            Command::History { city, days } => {
                let service = load_service()?;
                let history = service.history(&city, days)?;
                println!("{}: {} reading(s) in the last {} day(s)", history.city, history.data.len(), days);
                for entry in &history.data {
                    println!(
                        "  {}  {:.1} °C  {}  AQI {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M UTC"),
                        entry.reading.temperature_c,
                        entry.reading.condition,
                        entry
                            .reading
                            .aqi
                            .map_or_else(|| "n/a".to_string(), |aqi| aqi.to_string()),
                    );
                }
                Ok(())
            }
            Command::Export { city } => {
                let service = load_service()?;
                let path = service.export(&city)?;
                println!("Exported to {}", path.display());
                Ok(())
            }
            Command::Map => {
                let service = load_service()?;
                let readings = service.latest_readings();
                let html = map::render_map(&readings);
                let path = service.export_dir().join("city_map.html");
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create export directory: {}", parent.display())
                    })?;
                }
                fs::write(&path, html)
                    .with_context(|| format!("Failed to write map file: {}", path.display()))?;
                println!("Map with {} city marker(s) written to {}", readings.len(), path.display());
                Ok(())
            }
        }
    }
}

fn load_service() -> anyhow::Result<WeatherService> {
    let config = Config::load_with_env()?;
    WeatherService::from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let openweather = inquire::Text::new("OpenWeather API key:")
        .with_help_message("Used for geocoding and current weather")
        .prompt()
        .context("Failed to read OpenWeather API key")?;
    if !openweather.trim().is_empty() {
        config.openweather_api_key = Some(openweather.trim().to_string());
    }

    let aqicn = inquire::Text::new("AQICN token (optional, empty to skip):")
        .with_help_message("Used for air-quality readings")
        .prompt()
        .context("Failed to read AQICN token")?;
    if !aqicn.trim().is_empty() {
        config.aqicn_api_key = Some(aqicn.trim().to_string());
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_reading(reading: &Reading) {
    println!("{} ({:.4}, {:.4})", reading.city, reading.coordinates.latitude, reading.coordinates.longitude);
    println!("  Temperature: {:.1} °C", reading.temperature_c);
    println!("  Condition:   {}", reading.condition);
    println!("  Humidity:    {} %", reading.humidity_pct);
    println!("  Wind:        {:.1} m/s", reading.wind_speed_mps);
    match reading.aqi {
        Some(aqi) => println!("  AQI:         {aqi} ({})", aqi_category(aqi)),
        None => println!("  AQI:         unavailable"),
    }
    if let Some(pm25) = reading.pm25 {
        println!("  PM2.5:       {pm25} µg/m³");
    }
}
