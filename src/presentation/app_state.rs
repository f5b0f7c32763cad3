// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::live_service::LiveMetricsService;
use crate::application::refresh_driver::RefreshControl;
use crate::application::streaming_service::StreamingDashboardService;

#[derive(Clone)]
pub struct AppState {
    pub live_service: LiveMetricsService,
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingDashboardService,
    pub refresh: RefreshControl,
}
