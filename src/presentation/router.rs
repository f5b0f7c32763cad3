// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_history, get_refresh_interval, get_snapshot, health_check, list_series,
    refresh_now, set_refresh_interval, stream_dashboard,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Brotli is applied per response and per stream chunk
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/metrics/snapshot", get(get_snapshot))
        .route("/metrics/series", get(list_series))
        .route("/metrics/history/:series", get(get_history))
        .route("/dashboards/live", get(get_dashboard))
        .route("/dashboards/live/stream", get(stream_dashboard))
        .route("/refresh", post(refresh_now))
        .route(
            "/refresh/interval",
            get(get_refresh_interval).put(set_refresh_interval),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
