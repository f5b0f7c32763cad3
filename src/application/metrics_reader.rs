// Read-side trait over the live metrics
use crate::domain::audience::MetricsSnapshot;
use crate::domain::error::MetricsResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::broadcast;

#[async_trait]
pub trait MetricsReader: Send + Sync {
    /// Point-in-time copy of the current state
    async fn snapshot(&self) -> MetricsSnapshot;

    /// Oldest-first samples for a channel, `total` or `digital`
    async fn history(&self, series_id: &str) -> MetricsResult<Vec<(NaiveDateTime, u64)>>;

    /// Snapshot and the history of each requested series, taken at the
    /// same tick. Results follow the order of `series_ids`.
    async fn snapshot_with_history(
        &self,
        series_ids: &[String],
    ) -> (MetricsSnapshot, Vec<MetricsResult<Vec<(NaiveDateTime, u64)>>>);

    /// Every tracked series id
    async fn series_ids(&self) -> Vec<String>;

    /// Receive the snapshot produced by each subsequent tick
    fn subscribe(&self) -> broadcast::Receiver<MetricsSnapshot>;
}
