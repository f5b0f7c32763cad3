// Metrics store - Current state plus bounded history
use crate::application::random_source::RandomSource;
use crate::domain::audience::{AggregateMetrics, MetricsSnapshot, PlatformShare, RegionAudience};
use crate::domain::channel::{ChannelState, SeriesId};
use crate::domain::error::{MetricsError, MetricsResult};
use crate::domain::history::HistoryBuffer;
use crate::infrastructure::config::{SimulationConfig, TickPolicy};
use chrono::{Duration, NaiveDateTime};

/// Single-writer store of every simulated entity.
#[derive(Debug, Clone)]
pub struct MetricsStore {
    pub(crate) channels: Vec<ChannelState>,
    /// Program catalog per channel, parallel to `channels`.
    pub(crate) catalogs: Vec<Vec<String>>,
    pub(crate) aggregate: AggregateMetrics,
    pub(crate) geo: Vec<RegionAudience>,
    pub(crate) platforms: Vec<PlatformShare>,
    pub(crate) history: HistoryBuffer,
    pub(crate) last_tick: Option<NaiveDateTime>,
}

impl MetricsStore {
    pub fn initialize(
        config: &SimulationConfig,
        now: NaiveDateTime,
        rng: &mut dyn RandomSource,
    ) -> MetricsResult<Self> {
        config.validate()?;

        let channels: Vec<ChannelState> = config
            .channels
            .iter()
            .map(|c| ChannelState {
                name: c.name.clone(),
                viewers: c.viewers,
                share: c.share,
                program: c.program.clone(),
                trend: c.trend,
                relative_change: c.relative_change,
                category: c.category.clone(),
                color: c.color.clone(),
                peak_today: c.peak_today.max(c.viewers),
            })
            .collect();
        let catalogs = config.channels.iter().map(|c| c.catalog.clone()).collect();

        let baseline = &config.aggregate;
        let aggregate = AggregateMetrics {
            total_viewers: baseline.total_viewers,
            total_share: baseline.total_share,
            digital_traffic: baseline.digital_traffic,
            mobile_percent: baseline.mobile_percent,
            engagement_rate: baseline.engagement_rate,
            market_rank: baseline.market_rank,
        };

        let geo = config
            .geo
            .iter()
            .map(|r| RegionAudience {
                region: r.region.clone(),
                viewers: r.viewers,
            })
            .collect();
        let platforms = config
            .platforms
            .iter()
            .map(|p| PlatformShare {
                platform: p.platform.clone(),
                percent: p.percent,
            })
            .collect();

        let mut series: Vec<SeriesId> = channels
            .iter()
            .map(|c| SeriesId::Channel(c.name.clone()))
            .collect();
        series.push(SeriesId::Total);
        series.push(SeriesId::Digital);

        let mut store = Self {
            channels,
            catalogs,
            aggregate,
            geo,
            platforms,
            history: HistoryBuffer::new(series, config.history_depth),
            last_tick: None,
        };

        if config.backfill_history {
            let spacing = Duration::try_seconds(config.backfill_spacing_secs).ok_or_else(|| {
                MetricsError::InvalidConfiguration(format!(
                    "backfill_spacing_secs out of range: {}",
                    config.backfill_spacing_secs
                ))
            })?;
            store.backfill(&config.policy, now, spacing, rng)?;
        }

        tracing::info!(
            "Initialized metrics store with {} channels and {} history samples",
            store.channels.len(),
            store.history.len()
        );

        Ok(store)
    }

    /// Fill the window with jittered baseline samples. The newest sample is
    /// one spacing before `now` so a live tick at `now` still moves forward.
    fn backfill(
        &mut self,
        policy: &TickPolicy,
        now: NaiveDateTime,
        spacing: Duration,
        rng: &mut dyn RandomSource,
    ) -> MetricsResult<()> {
        let depth = self.history.depth() as i32;

        for step in (1..=depth).rev() {
            let timestamp = now - spacing * step;
            let mut row: Vec<u64> = self
                .channels
                .iter()
                .map(|c| {
                    let spread = (c.viewers as f64 * policy.backfill_jitter_ratio) as i64;
                    jitter(c.viewers, rng.int_between(-spread, spread))
                })
                .collect();

            let total_spread = policy.total_backfill_jitter as i64;
            row.push(jitter(
                self.aggregate.total_viewers,
                rng.int_between(-total_spread, total_spread),
            ));
            let digital_spread = policy.digital_backfill_jitter as i64;
            row.push(jitter(
                self.aggregate.digital_traffic,
                rng.int_between(-digital_spread, digital_spread),
            ));

            self.history.push(timestamp, &row)?;
        }

        Ok(())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            channels: self.channels.clone(),
            aggregate: self.aggregate.clone(),
            geo: self.geo.clone(),
            platforms: self.platforms.clone(),
            last_tick: self.last_tick,
        }
    }

    pub fn history(&self, series_id: &str) -> MetricsResult<Vec<(NaiveDateTime, u64)>> {
        self.history.series(&SeriesId::parse(series_id))
    }

    pub fn series_ids(&self) -> Vec<String> {
        self.history
            .series_ids()
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    /// Current values for every series, in history column order.
    pub(crate) fn current_row(&self) -> Vec<u64> {
        let mut row: Vec<u64> = self.channels.iter().map(|c| c.viewers).collect();
        row.push(self.aggregate.total_viewers);
        row.push(self.aggregate.digital_traffic);
        row
    }
}

fn jitter(base: u64, delta: i64) -> u64 {
    (base as i64).saturating_add(delta).max(0) as u64
}
