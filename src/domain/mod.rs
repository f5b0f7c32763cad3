// Domain layer - Audience metrics models
pub mod audience;
pub mod channel;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod telemetry;
pub mod volatility;
