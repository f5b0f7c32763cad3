// Dashboard service - Use case for building dashboards
use crate::application::metrics_reader::MetricsReader;
use crate::domain::audience::{AggregateMetrics, MetricsSnapshot};
use crate::domain::channel::SeriesId;
use crate::domain::dashboard::{
    ChannelCard, Dashboard, FeaturedChannel, PlatformSlice, RegionRank, StaticMetric,
};
use crate::domain::error::MetricsResult;
use crate::domain::telemetry::{ChartData, ChartKind, SeriesData, TileData, TimeSeriesPoint};
use crate::infrastructure::config::{ChartConfig, StaticMetricConfig, TileConfig, WidgetsConfig};
use chrono::NaiveDateTime;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    reader: Arc<dyn MetricsReader>,
    widgets_config: WidgetsConfig,
}

impl DashboardService {
    pub fn new(reader: Arc<dyn MetricsReader>, widgets_config: WidgetsConfig) -> Self {
        Self {
            reader,
            widgets_config,
        }
    }

    pub async fn get_dashboard(&self) -> Dashboard {
        let charts_config = &self.widgets_config.charts;
        let series_ids: Vec<String> = charts_config
            .iter()
            .flat_map(|c| c.series.iter().map(|s| s.id.clone()))
            .collect();
        let (snapshot, histories) = self.reader.snapshot_with_history(&series_ids).await;

        let tiles = build_tiles(&self.widgets_config.tiles, &snapshot.aggregate);
        let charts = build_charts(charts_config, histories);

        Dashboard {
            title: self.widgets_config.title.clone(),
            as_of: snapshot.last_tick,
            tiles,
            charts,
            channels: snapshot.channels.iter().map(ChannelCard::from).collect(),
            comparison: snapshot
                .channels_by_viewers()
                .into_iter()
                .map(|c| c.name.clone())
                .collect(),
            top_regions: top_regions(&snapshot, self.widgets_config.top_regions),
            platforms: snapshot
                .platforms
                .iter()
                .map(|p| PlatformSlice {
                    platform: p.platform.clone(),
                    percent: p.percent,
                })
                .collect(),
            featured: self.featured(&snapshot),
            digital_analysis: self
                .widgets_config
                .digital_analysis
                .iter()
                .map(static_metric)
                .collect(),
        }
    }

    fn featured(&self, snapshot: &MetricsSnapshot) -> Option<FeaturedChannel> {
        let config = self.widgets_config.featured.as_ref()?;
        let Some(channel) = snapshot.channel(&config.channel) else {
            tracing::warn!("Featured channel {} is not simulated", config.channel);
            return None;
        };

        Some(FeaturedChannel {
            title: config.title.clone(),
            channel: ChannelCard::from(channel),
            metrics: config.metrics.iter().map(static_metric).collect(),
        })
    }
}

/// Charts in config order; `histories` holds one entry per configured series,
/// in the same order.
fn build_charts(
    charts_config: &[ChartConfig],
    histories: Vec<MetricsResult<Vec<(NaiveDateTime, u64)>>>,
) -> Vec<ChartData> {
    let mut histories = histories.into_iter();
    let mut charts = Vec::new();

    for chart_config in charts_config {
        let mut series_list = Vec::new();

        for series_config in &chart_config.series {
            match histories.next() {
                Some(Ok(samples)) => {
                    let points = samples
                        .into_iter()
                        .map(|(timestamp, value)| TimeSeriesPoint::from_sample(timestamp, value))
                        .collect();
                    series_list.push(SeriesData::new(
                        series_config.id.clone(),
                        series_config.name.clone(),
                        series_config.color.clone(),
                        points,
                    ));
                }
                Some(Err(e)) => {
                    tracing::warn!("Skipping series {} of chart {}: {}", series_config.id, chart_config.id, e);
                }
                None => {}
            }
        }

        // Only add chart if it has at least one tracked series
        if !series_list.is_empty() {
            charts.push(ChartData::new(
                chart_config.id.clone(),
                chart_config.title.clone(),
                chart_config.unit.clone(),
                ChartKind::parse(&chart_config.kind),
                chart_config.y_min,
                chart_config.y_max,
                chart_config.fraction_digits,
                series_list,
            ));
        }
    }

    charts
}

fn static_metric(config: &StaticMetricConfig) -> StaticMetric {
    StaticMetric {
        label: config.label.clone(),
        value: config.value.clone(),
        delta: config.delta.clone(),
    }
}

/// Value of a named aggregate field, if the name is known.
pub fn aggregate_metric(aggregate: &AggregateMetrics, metric: &str) -> Option<f64> {
    let value = match metric {
        "total_viewers" => aggregate.total_viewers as f64,
        "total_share" => aggregate.total_share,
        "digital_traffic" => aggregate.digital_traffic as f64,
        "mobile_percent" => aggregate.mobile_percent,
        "engagement_rate" => aggregate.engagement_rate,
        "market_rank" => aggregate.market_rank as f64,
        _ => return None,
    };
    Some(value)
}

pub fn build_tiles(tiles: &[TileConfig], aggregate: &AggregateMetrics) -> Vec<TileData> {
    tiles
        .iter()
        .filter_map(|tile_config| match aggregate_metric(aggregate, &tile_config.metric) {
            Some(value) => Some(TileData::new(
                tile_config.id.clone(),
                tile_config.title.clone(),
                tile_config.unit.clone(),
                value,
                tile_config.precision,
            )),
            None => {
                tracing::warn!("Tile {} references unknown metric {}", tile_config.id, tile_config.metric);
                None
            }
        })
        .collect()
}

/// Current value of a series straight from a snapshot.
pub fn series_value(snapshot: &MetricsSnapshot, id: &SeriesId) -> Option<u64> {
    match id {
        SeriesId::Channel(name) => snapshot.channel(name).map(|c| c.viewers),
        SeriesId::Total => Some(snapshot.aggregate.total_viewers),
        SeriesId::Digital => Some(snapshot.aggregate.digital_traffic),
    }
}

fn top_regions(snapshot: &MetricsSnapshot, limit: usize) -> Vec<RegionRank> {
    snapshot
        .top_regions(limit)
        .into_iter()
        .enumerate()
        .map(|(i, (region, percent))| RegionRank {
            rank: i + 1,
            region: region.region,
            viewers: region.viewers,
            percent,
        })
        .collect()
}
