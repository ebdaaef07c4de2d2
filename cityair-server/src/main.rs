//! HTTP service exposing the cityair operations: current reading, windowed
//! history and CSV export, one city per request.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use cityair_core::{Config, WeatherService};

mod error;
mod routes;
mod state;

#[derive(Debug, Parser)]
#[command(name = "cityair-server", version, about = "City weather & air quality HTTP service")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: String,
}

async fn bind_listener(addr: &str) -> Result<TcpListener> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Failed to bind cityair-server listener on {addr}: port already in use. Stop the other service using this port or re-run with --listen to choose another address.",
            );
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to bind cityair-server listener on {addr}"))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load_with_env()?;
    let service = WeatherService::from_config(&config)?;
    let state = state::AppState::new(service);

    let app = routes::router(state);
    let listener = bind_listener(&args.listen).await?;
    tracing::info!(addr = %args.listen, "cityair server listening");
    axum::serve(listener, app)
        .await
        .context("cityair server exited unexpectedly")?;

    Ok(())
}
