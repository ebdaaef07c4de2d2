use axum::extract::{Query, State};
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use cityair_core::service::DEFAULT_HISTORY_DAYS;
use cityair_core::{CityHistory, Reading};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    city: Option<String>,
    days: Option<i64>,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/api/weather", get(weather_handler))
        .route("/api/history", get(history_handler))
        .route("/api/export", get(export_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn weather_handler(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> AppResult<Json<Reading>> {
    let city = require_city(&query)?;
    let mut service = state.service.lock().await;
    let reading = service.current(&city).await?;
    Ok(Json(reading))
}

async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> AppResult<Json<CityHistory>> {
    let city = require_city(&query)?;
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    let service = state.service.lock().await;
    let history = service.history(&city, days)?;
    Ok(Json(history))
}

async fn export_handler(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> AppResult<Response> {
    let city = require_city(&query)?;
    let path = {
        let service = state.service.lock().await;
        service.export(&city)?
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| AppError::internal(format!("Failed to read export file: {err}")))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export.csv".to_string());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|err| AppError::internal(format!("Invalid export filename: {err}")))?;

    let mut response = (StatusCode::OK, bytes).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

fn require_city(query: &CityQuery) -> Result<String, AppError> {
    match query.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => Ok(city.to_string()),
        _ => Err(AppError::bad_request("City parameter is required")),
    }
}
