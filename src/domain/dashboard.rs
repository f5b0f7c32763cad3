// Dashboard domain model
use super::channel::{ChannelState, Trend};
use super::telemetry::{ChartData, TileData, group_thousands};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelCard {
    pub name: String,
    pub viewers: u64,
    pub viewers_display: String,
    pub share: f64,
    pub program: String,
    pub trend: Trend,
    pub change: String,
    pub category: String,
    pub color: String,
    pub peak_today: u64,
}

impl From<&ChannelState> for ChannelCard {
    fn from(channel: &ChannelState) -> Self {
        Self {
            name: channel.name.clone(),
            viewers: channel.viewers,
            viewers_display: group_thousands(channel.viewers),
            share: channel.share,
            program: channel.program.clone(),
            trend: channel.trend,
            change: channel.change_text(),
            category: channel.category.clone(),
            color: channel.color.clone(),
            peak_today: channel.peak_today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRank {
    pub rank: usize,
    pub region: String,
    pub viewers: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSlice {
    pub platform: String,
    pub percent: f64,
}

/// A labelled figure that does not come from the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticMetric {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedChannel {
    pub title: String,
    pub channel: ChannelCard,
    pub metrics: Vec<StaticMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    /// Tick the dashboard reflects; `None` before the first tick.
    pub as_of: Option<NaiveDateTime>,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
    pub channels: Vec<ChannelCard>,
    /// Channel names ordered by current audience.
    pub comparison: Vec<String>,
    pub top_regions: Vec<RegionRank>,
    pub platforms: Vec<PlatformSlice>,
    pub featured: Option<FeaturedChannel>,
    pub digital_analysis: Vec<StaticMetric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_from_channel() {
        let channel = ChannelState {
            name: "France Info".to_string(),
            viewers: 350_000,
            share: 2.1,
            program: "Info continue".to_string(),
            trend: Trend::Down,
            relative_change: -0.012,
            category: "Info".to_string(),
            color: "#FF6B00".to_string(),
            peak_today: 650_000,
        };

        let card = ChannelCard::from(&channel);
        assert_eq!(card.viewers_display, "350 000");
        assert_eq!(card.change, "-1.2%");
        assert_eq!(card.trend, Trend::Down);
    }
}
