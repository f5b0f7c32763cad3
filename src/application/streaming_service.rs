// Streaming dashboard service - Progressive loading over chunked JSON
use crate::application::dashboard_service::{DashboardService, build_tiles, series_value};
use crate::application::metrics_reader::MetricsReader;
use crate::domain::audience::MetricsSnapshot;
use crate::domain::channel::SeriesId;
use crate::domain::dashboard::{ChannelCard, Dashboard};
use crate::domain::telemetry::{ChartKind, TileData, TimeSeriesPoint};
use crate::infrastructure::config::WidgetsConfig;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

const STREAM_BUFFER: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    Dashboard(Dashboard),
    TickUpdate(TickUpdate),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSkeleton {
    pub title: String,
    pub tiles: Vec<TileSkeleton>,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileSkeleton {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub precision: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    pub series: Vec<SeriesSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSkeleton {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickUpdate {
    pub tiles: Vec<TileData>,
    pub channels: Vec<ChannelCard>,
    pub points: Vec<SeriesPoint>,
}

/// Newest sample for one series of one chart.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub chart_id: String,
    pub series_id: String,
    pub point: TimeSeriesPoint,
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    reader: Arc<dyn MetricsReader>,
    dashboard_service: DashboardService,
    widgets_config: WidgetsConfig,
}

impl StreamingDashboardService {
    pub fn new(reader: Arc<dyn MetricsReader>, widgets_config: WidgetsConfig) -> Self {
        let dashboard_service = DashboardService::new(reader.clone(), widgets_config.clone());
        Self {
            reader,
            dashboard_service,
            widgets_config,
        }
    }

    /// Skeleton first, then the full dashboard, then one update per tick
    /// until the receiver is dropped.
    pub async fn stream_dashboard(&self) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        // Subscribe before the initial dashboard so no tick falls in between
        let updates = self.reader.subscribe();

        let tracked: HashSet<String> = self.reader.series_ids().await.into_iter().collect();
        let skeleton = self.build_skeleton(&tracked);
        let _ = tx.send(StreamMessage::Skeleton(skeleton)).await;

        let dashboard = self.dashboard_service.get_dashboard().await;
        let as_of = dashboard.as_of;
        let _ = tx.send(StreamMessage::Dashboard(dashboard)).await;

        tokio::spawn(forward_ticks(updates, tx, self.widgets_config.clone(), as_of));

        rx
    }

    fn build_skeleton(&self, tracked: &HashSet<String>) -> DashboardSkeleton {
        let tiles = self
            .widgets_config
            .tiles
            .iter()
            .map(|t| TileSkeleton {
                id: t.id.clone(),
                title: t.title.clone(),
                unit: t.unit.clone(),
                precision: t.precision,
            })
            .collect();

        // Filter charts and their series by tracked series
        let charts = self
            .widgets_config
            .charts
            .iter()
            .filter_map(|c| {
                let series: Vec<SeriesSkeleton> = c
                    .series
                    .iter()
                    .filter(|s| tracked.contains(&s.id))
                    .map(|s| SeriesSkeleton {
                        id: s.id.clone(),
                        name: s.name.clone(),
                        color: s.color.clone(),
                    })
                    .collect();

                if series.is_empty() {
                    tracing::debug!("Skipping chart {} - no tracked series", c.id);
                    return None;
                }

                Some(ChartSkeleton {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    unit: c.unit.clone(),
                    kind: ChartKind::parse(&c.kind),
                    y_min: c.y_min,
                    y_max: c.y_max,
                    fraction_digits: c.fraction_digits,
                    series,
                })
            })
            .collect();

        DashboardSkeleton {
            title: self.widgets_config.title.clone(),
            tiles,
            charts,
        }
    }
}

/// Send one update per tick newer than `as_of` until the client goes away.
async fn forward_ticks(
    mut updates: broadcast::Receiver<MetricsSnapshot>,
    tx: mpsc::Sender<StreamMessage>,
    widgets: WidgetsConfig,
    as_of: Option<NaiveDateTime>,
) {
    loop {
        match updates.recv().await {
            Ok(snapshot) => {
                if snapshot.last_tick <= as_of {
                    continue;
                }
                let update = build_tick_update(&widgets, &snapshot);
                if tx.send(StreamMessage::TickUpdate(update)).await.is_err() {
                    tracing::debug!("Dashboard stream client disconnected");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Dashboard stream lagging, skipped {} ticks", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub fn build_tick_update(widgets: &WidgetsConfig, snapshot: &MetricsSnapshot) -> TickUpdate {
    let points = match snapshot.last_tick {
        Some(timestamp) => widgets
            .charts
            .iter()
            .flat_map(|chart| {
                chart.series.iter().filter_map(move |s| {
                    let value = series_value(snapshot, &SeriesId::parse(&s.id))?;
                    Some(SeriesPoint {
                        chart_id: chart.id.clone(),
                        series_id: s.id.clone(),
                        point: TimeSeriesPoint::from_sample(timestamp, value),
                    })
                })
            })
            .collect(),
        None => Vec::new(),
    };

    TickUpdate {
        tiles: build_tiles(&widgets.tiles, &snapshot.aggregate),
        channels: snapshot.channels.iter().map(ChannelCard::from).collect(),
        points,
    }
}
