// HTTP request handlers
use crate::application::metrics_reader::MetricsReader;
use crate::domain::audience::MetricsSnapshot;
use crate::domain::telemetry::TimeSeriesPoint;
use crate::infrastructure::chunked_stream::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppResult;
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub series: String,
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RefreshInterval {
    pub seconds: u64,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current snapshot of every channel and aggregate
pub async fn get_snapshot(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.live_service.snapshot().await;

    match json_response(&snapshot, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// History window of one series
pub async fn get_history(
    Path(series): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<HistoryResponse>> {
    let samples = state.live_service.history(&series).await?;
    let points = samples
        .into_iter()
        .map(|(timestamp, value)| TimeSeriesPoint::from_sample(timestamp, value))
        .collect();

    Ok(Json(HistoryResponse { series, points }))
}

/// Every tracked series id
pub async fn list_series(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.live_service.series_ids().await)
}

/// Assembled dashboard in one response
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dashboard = state.dashboard_service.get_dashboard().await;

    match json_response(&dashboard, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream dashboard (progressive loading, then live ticks)
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let rx = state.streaming_service.stream_dashboard().await;
    stream_from_receiver(rx, compress).await
}

/// Tick immediately instead of waiting for the next refresh
pub async fn refresh_now(State(state): State<Arc<AppState>>) -> AppResult<Json<MetricsSnapshot>> {
    let snapshot = state.live_service.tick_now().await?;
    Ok(Json(snapshot))
}

pub async fn get_refresh_interval(State(state): State<Arc<AppState>>) -> Json<RefreshInterval> {
    Json(RefreshInterval {
        seconds: state.refresh.interval_secs(),
    })
}

pub async fn set_refresh_interval(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshInterval>,
) -> AppResult<Json<RefreshInterval>> {
    state.refresh.set_interval(request.seconds)?;
    tracing::info!("Refresh interval changed to {}s", request.seconds);
    Ok(Json(request))
}
