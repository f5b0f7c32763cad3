// Refresh driver - Ticks the live service on an adjustable cadence
use crate::application::live_service::LiveMetricsService;
use crate::infrastructure::config::{MAX_REFRESH_SECS, MIN_REFRESH_SECS};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Error, PartialEq)]
pub enum RefreshError {
    #[error(
        "refresh interval must be within [{min}, {max}] seconds, got {0}",
        min = MIN_REFRESH_SECS,
        max = MAX_REFRESH_SECS
    )]
    OutOfRange(u64),
}

/// Handle for reading and changing the refresh cadence. Dropping every
/// handle stops the driver loop.
#[derive(Clone)]
pub struct RefreshControl {
    interval_tx: watch::Sender<u64>,
}

impl RefreshControl {
    pub fn new(interval_secs: u64) -> Result<(Self, watch::Receiver<u64>), RefreshError> {
        check_interval(interval_secs)?;
        let (interval_tx, interval_rx) = watch::channel(interval_secs);
        Ok((Self { interval_tx }, interval_rx))
    }

    pub fn interval_secs(&self) -> u64 {
        *self.interval_tx.borrow()
    }

    pub fn set_interval(&self, interval_secs: u64) -> Result<(), RefreshError> {
        check_interval(interval_secs)?;
        self.interval_tx.send_replace(interval_secs);
        Ok(())
    }
}

fn check_interval(interval_secs: u64) -> Result<(), RefreshError> {
    if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&interval_secs) {
        return Err(RefreshError::OutOfRange(interval_secs));
    }
    Ok(())
}

pub struct RefreshDriver {
    service: LiveMetricsService,
    /// Length of one interval second; shortened in tests.
    unit: Duration,
}

impl RefreshDriver {
    pub fn new(service: LiveMetricsService) -> Self {
        Self::with_unit(service, Duration::from_secs(1))
    }

    pub fn with_unit(service: LiveMetricsService, unit: Duration) -> Self {
        Self { service, unit }
    }

    pub fn spawn(self, interval_rx: watch::Receiver<u64>) -> JoinHandle<()> {
        tokio::spawn(self.run(interval_rx))
    }

    /// Tick once per interval until every `RefreshControl` is dropped. An
    /// interval change restarts the wait with the new period.
    pub async fn run(self, mut interval_rx: watch::Receiver<u64>) {
        loop {
            let interval_secs = *interval_rx.borrow_and_update();
            let period = self.unit * interval_secs as u32;

            tokio::select! {
                _ = tokio::time::sleep(period) => {
                    match self.service.tick_now().await {
                        Ok(snapshot) => tracing::debug!(
                            "Refreshed metrics: {} total viewers",
                            snapshot.aggregate.total_viewers
                        ),
                        Err(e) => tracing::warn!("Skipping refresh: {}", e),
                    }
                }
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        tracing::info!("Refresh control dropped, stopping driver");
                        break;
                    }
                    tracing::info!("Refresh interval set to {}s", *interval_rx.borrow());
                }
            }
        }
    }
}
