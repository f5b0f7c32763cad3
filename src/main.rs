// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::live_service::{LiveMetricsService, wall_clock};
use crate::application::metrics_reader::MetricsReader;
use crate::application::refresh_driver::{RefreshControl, RefreshDriver};
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::{load_app_config, load_widgets_config};
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let widgets_config = load_widgets_config()?;

    // Create the simulation (application layer)
    let live_service = LiveMetricsService::from_config(&app_config.simulation, wall_clock())?;
    let reader: Arc<dyn MetricsReader> = Arc::new(live_service.clone());

    let (refresh, interval_rx) = RefreshControl::new(app_config.simulation.refresh_interval_secs)?;
    let driver = RefreshDriver::new(live_service.clone()).spawn(interval_rx);

    // Create services
    let dashboard_service = DashboardService::new(reader.clone(), widgets_config.clone());
    let streaming_service = StreamingDashboardService::new(reader, widgets_config);

    let state = Arc::new(AppState {
        live_service,
        dashboard_service,
        streaming_service,
        refresh,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr = app_config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting audience-telemetry service on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    driver.abort();
    Ok(())
}
