// Live metrics service - Serialized ticks, consistent reads
use crate::application::metrics_reader::MetricsReader;
use crate::application::metrics_store::MetricsStore;
use crate::application::random_source::{RandomSource, SeededRandom};
use crate::application::tick_engine::TickEngine;
use crate::domain::audience::MetricsSnapshot;
use crate::domain::error::MetricsResult;
use crate::infrastructure::config::SimulationConfig;
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

const UPDATE_CHANNEL_CAPACITY: usize = 16;

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn wall_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

struct LiveState {
    store: MetricsStore,
    engine: TickEngine,
    rng: Box<dyn RandomSource>,
}

/// Owns the store; every mutation goes through the write lock and readers
/// only ever receive owned copies.
#[derive(Clone)]
pub struct LiveMetricsService {
    state: Arc<RwLock<LiveState>>,
    updates: broadcast::Sender<MetricsSnapshot>,
    clock: Clock,
}

impl LiveMetricsService {
    pub fn new(
        store: MetricsStore,
        engine: TickEngine,
        rng: Box<dyn RandomSource>,
        clock: Clock,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(LiveState { store, engine, rng })),
            updates,
            clock,
        }
    }

    pub fn from_config(config: &SimulationConfig, clock: Clock) -> MetricsResult<Self> {
        let mut rng = SeededRandom::new(config.seed);
        let store = MetricsStore::initialize(config, clock(), &mut rng)?;
        let engine = TickEngine::from_config(config);
        Ok(Self::new(store, engine, Box::new(rng), clock))
    }

    /// Tick at the clock's current time, read under the write lock so
    /// concurrent callers stay ordered. A reading at or before the newest
    /// sample (a clock set back, or the DST fall-back hour) is moved to just
    /// after it.
    pub async fn tick_now(&self) -> MetricsResult<MetricsSnapshot> {
        let snapshot = {
            let mut guard = self.state.write().await;
            let LiveState { store, engine, rng } = &mut *guard;
            let now = next_tick_time((self.clock)(), store.history.last_timestamp());
            engine.tick(store, now, rng.as_mut())?
        };

        // No subscribers is fine.
        let _ = self.updates.send(snapshot.clone());
        Ok(snapshot)
    }
}

fn next_tick_time(reading: NaiveDateTime, last: Option<NaiveDateTime>) -> NaiveDateTime {
    match last {
        Some(last) if reading <= last => {
            tracing::debug!("Clock read {} is not after {}, ticking just after it", reading, last);
            last + Duration::milliseconds(1)
        }
        _ => reading,
    }
}

#[async_trait]
impl MetricsReader for LiveMetricsService {
    async fn snapshot(&self) -> MetricsSnapshot {
        self.state.read().await.store.snapshot()
    }

    async fn history(&self, series_id: &str) -> MetricsResult<Vec<(NaiveDateTime, u64)>> {
        self.state.read().await.store.history(series_id)
    }

    async fn snapshot_with_history(
        &self,
        series_ids: &[String],
    ) -> (MetricsSnapshot, Vec<MetricsResult<Vec<(NaiveDateTime, u64)>>>) {
        let state = self.state.read().await;
        let histories = series_ids.iter().map(|id| state.store.history(id)).collect();
        (state.store.snapshot(), histories)
    }

    async fn series_ids(&self) -> Vec<String> {
        self.state.read().await.store.series_ids()
    }

    fn subscribe(&self) -> broadcast::Receiver<MetricsSnapshot> {
        self.updates.subscribe()
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that moves forward one minute per reading.
    pub fn stepping_clock() -> Clock {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let minutes = AtomicI64::new(0);
        Arc::new(move || start + Duration::minutes(minutes.fetch_add(1, Ordering::SeqCst)))
    }

    /// Clock that replays the given readings, then repeats the last one.
    pub fn replay_clock(readings: &[NaiveDateTime]) -> Clock {
        let last = *readings.last().unwrap();
        let readings = Mutex::new(readings.iter().copied().collect::<VecDeque<_>>());
        Arc::new(move || readings.lock().unwrap().pop_front().unwrap_or(last))
    }
}
