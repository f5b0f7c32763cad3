// Application layer - Simulation engine and read-side use cases
pub mod dashboard_service;
pub mod live_service;
pub mod metrics_reader;
pub mod metrics_store;
pub mod random_source;
pub mod refresh_driver;
pub mod streaming_service;
pub mod tick_engine;
