// Aggregate audience metrics and point-in-time snapshots
use super::channel::ChannelState;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetrics {
    /// Sum of channel viewers plus an untracked "other audience" supplement.
    pub total_viewers: u64,
    pub total_share: f64,
    pub digital_traffic: u64,
    pub mobile_percent: f64,
    pub engagement_rate: f64,
    pub market_rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAudience {
    pub region: String,
    pub viewers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformShare {
    pub platform: String,
    pub percent: f64,
}

/// Owned copy of every current-state entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub channels: Vec<ChannelState>,
    pub aggregate: AggregateMetrics,
    pub geo: Vec<RegionAudience>,
    pub platforms: Vec<PlatformShare>,
    pub last_tick: Option<NaiveDateTime>,
}

impl MetricsSnapshot {
    pub fn channel(&self, name: &str) -> Option<&ChannelState> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Largest regions first, with their percentage of the geographic total.
    pub fn top_regions(&self, limit: usize) -> Vec<(RegionAudience, f64)> {
        let total: u64 = self.geo.iter().map(|r| r.viewers).sum();
        let mut regions = self.geo.clone();
        regions.sort_by(|a, b| b.viewers.cmp(&a.viewers));
        regions
            .into_iter()
            .take(limit)
            .map(|r| {
                let percent = if total == 0 {
                    0.0
                } else {
                    r.viewers as f64 / total as f64 * 100.0
                };
                (r, percent)
            })
            .collect()
    }

    /// Channels ordered by current audience, largest first.
    pub fn channels_by_viewers(&self) -> Vec<&ChannelState> {
        let mut channels: Vec<&ChannelState> = self.channels.iter().collect();
        channels.sort_by(|a, b| b.viewers.cmp(&a.viewers));
        channels
    }
}
