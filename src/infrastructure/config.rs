use crate::domain::channel::{DIGITAL_SERIES, TOTAL_SERIES, Trend};
use crate::domain::error::{MetricsError, MetricsResult};
use crate::domain::history::DEFAULT_HISTORY_DEPTH;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_REFRESH_SECS: u64 = 5;
pub const MAX_REFRESH_SECS: u64 = 60;

/// Upper bound for any audience or traffic figure.
pub const MAX_AUDIENCE: u64 = 1_000_000_000_000;
pub const MAX_HISTORY_DEPTH: usize = 10_000;
pub const MAX_BACKFILL_SPACING_SECS: i64 = 86_400;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulationConfig {
    /// Fixed seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    #[serde(default = "default_true")]
    pub backfill_history: bool,
    #[serde(default = "default_backfill_spacing_secs")]
    pub backfill_spacing_secs: i64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub reset_peak_daily: bool,
    #[serde(default)]
    pub policy: TickPolicy,
    pub aggregate: AggregateBaseline,
    pub channels: Vec<ChannelBaseline>,
    #[serde(default)]
    pub geo: Vec<RegionBaseline>,
    #[serde(default)]
    pub platforms: Vec<PlatformBaseline>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TickPolicy {
    /// New viewers never drop below this fraction of the pre-tick audience.
    pub floor_ratio: f64,
    pub supplement_min: u64,
    pub supplement_max: u64,
    pub digital_change_min: i64,
    pub digital_change_max: i64,
    pub digital_floor: u64,
    pub rotation_probability: f64,
    pub channel_rotation_probability: f64,
    pub backfill_jitter_ratio: f64,
    pub total_backfill_jitter: u64,
    pub digital_backfill_jitter: u64,
}

impl Default for TickPolicy {
    fn default() -> Self {
        Self {
            floor_ratio: 0.3,
            supplement_min: 500_000,
            supplement_max: 800_000,
            digital_change_min: -1_000_000,
            digital_change_max: 1_500_000,
            digital_floor: 8_000_000,
            rotation_probability: 0.15,
            channel_rotation_probability: 0.30,
            backfill_jitter_ratio: 0.1,
            total_backfill_jitter: 200_000,
            digital_backfill_jitter: 500_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AggregateBaseline {
    pub total_viewers: u64,
    pub total_share: f64,
    pub digital_traffic: u64,
    pub mobile_percent: f64,
    pub engagement_rate: f64,
    pub market_rank: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChannelBaseline {
    pub name: String,
    pub viewers: u64,
    pub share: f64,
    pub program: String,
    pub category: String,
    pub color: String,
    pub peak_today: u64,
    /// Trend and relative change shown until the first tick.
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub relative_change: f64,
    /// Candidate program labels for rotation.
    pub catalog: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegionBaseline {
    pub region: String,
    pub viewers: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlatformBaseline {
    pub platform: String,
    pub percent: f64,
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_true() -> bool {
    true
}

fn default_backfill_spacing_secs() -> i64 {
    120
}

fn default_refresh_interval_secs() -> u64 {
    15
}

fn invalid(message: impl Into<String>) -> MetricsError {
    MetricsError::InvalidConfiguration(message.into())
}

fn check_probability(name: &str, value: f64) -> MetricsResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{} must be within [0, 1], got {}", name, value)));
    }
    Ok(())
}

fn check_audience(name: &str, value: u64) -> MetricsResult<()> {
    if value > MAX_AUDIENCE {
        return Err(invalid(format!("{} must be at most {}, got {}", name, MAX_AUDIENCE, value)));
    }
    Ok(())
}

impl SimulationConfig {
    /// Reject baselines the engine cannot run from.
    pub fn validate(&self) -> MetricsResult<()> {
        if self.channels.is_empty() {
            return Err(invalid("at least one channel is required"));
        }
        if self.history_depth == 0 || self.history_depth > MAX_HISTORY_DEPTH {
            return Err(invalid(format!(
                "history_depth must be within [1, {}], got {}",
                MAX_HISTORY_DEPTH, self.history_depth
            )));
        }
        if !(1..=MAX_BACKFILL_SPACING_SECS).contains(&self.backfill_spacing_secs) {
            return Err(invalid(format!(
                "backfill_spacing_secs must be within [1, {}], got {}",
                MAX_BACKFILL_SPACING_SECS, self.backfill_spacing_secs
            )));
        }
        check_audience("aggregate.total_viewers", self.aggregate.total_viewers)?;
        check_audience("aggregate.digital_traffic", self.aggregate.digital_traffic)?;
        if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&self.refresh_interval_secs) {
            return Err(invalid(format!(
                "refresh_interval_secs must be within [{}, {}], got {}",
                MIN_REFRESH_SECS, MAX_REFRESH_SECS, self.refresh_interval_secs
            )));
        }

        let mut names = HashSet::new();
        for channel in &self.channels {
            if channel.name == TOTAL_SERIES || channel.name == DIGITAL_SERIES {
                return Err(invalid(format!("channel name '{}' is reserved", channel.name)));
            }
            if !names.insert(channel.name.as_str()) {
                return Err(invalid(format!("duplicate channel '{}'", channel.name)));
            }
            check_audience(&format!("{}.viewers", channel.name), channel.viewers)?;
            check_audience(&format!("{}.peak_today", channel.name), channel.peak_today)?;
            if channel.catalog.is_empty() {
                return Err(invalid(format!("channel '{}' has an empty catalog", channel.name)));
            }
            if !channel.catalog.contains(&channel.program) {
                return Err(invalid(format!(
                    "channel '{}' airs '{}' which is not in its catalog",
                    channel.name, channel.program
                )));
            }
        }

        let policy = &self.policy;
        check_probability("floor_ratio", policy.floor_ratio)?;
        check_probability("rotation_probability", policy.rotation_probability)?;
        check_probability(
            "channel_rotation_probability",
            policy.channel_rotation_probability,
        )?;
        check_probability("backfill_jitter_ratio", policy.backfill_jitter_ratio)?;
        check_audience("supplement_max", policy.supplement_max)?;
        check_audience("digital_floor", policy.digital_floor)?;
        check_audience("total_backfill_jitter", policy.total_backfill_jitter)?;
        check_audience("digital_backfill_jitter", policy.digital_backfill_jitter)?;
        if policy.digital_change_min.unsigned_abs() > MAX_AUDIENCE
            || policy.digital_change_max.unsigned_abs() > MAX_AUDIENCE
        {
            return Err(invalid("digital change range exceeds the audience bound"));
        }
        if policy.supplement_min > policy.supplement_max {
            return Err(invalid("supplement_min exceeds supplement_max"));
        }
        if policy.digital_change_min > policy.digital_change_max {
            return Err(invalid("digital_change_min exceeds digital_change_max"));
        }

        if !self.platforms.is_empty() {
            let sum: f64 = self.platforms.iter().map(|p| p.percent).sum();
            if (sum - 100.0).abs() > 1.0 {
                tracing::warn!("platform percentages sum to {:.1}, expected about 100", sum);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WidgetsConfig {
    #[serde(default = "default_dashboard_title")]
    pub title: String,
    #[serde(default = "default_top_regions")]
    pub top_regions: usize,
    #[serde(default)]
    pub tiles: Vec<TileConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
    #[serde(default)]
    pub featured: Option<FeaturedConfig>,
    /// Fixed digital indicators shown beside the platform split.
    #[serde(default)]
    pub digital_analysis: Vec<StaticMetricConfig>,
}

/// Spotlight panel for one channel.
#[derive(Debug, Deserialize, Clone)]
pub struct FeaturedConfig {
    pub channel: String,
    pub title: String,
    #[serde(default)]
    pub metrics: Vec<StaticMetricConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StaticMetricConfig {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub delta: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileConfig {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub precision: i32,
    /// Aggregate field the tile displays, e.g. `total_viewers`.
    pub metric: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: String,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    /// Tracked series id: a channel name, `total` or `digital`.
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

fn default_dashboard_title() -> String {
    "Live audience".to_string()
}

fn default_top_regions() -> usize {
    5
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/simulation"))
        .add_source(
            config::Environment::with_prefix("AUDIENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app: AppConfig = settings.try_deserialize()?;
    app.simulation.validate()?;
    Ok(app)
}

pub fn load_widgets_config() -> anyhow::Result<WidgetsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/widgets"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
