// Channel domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative moves smaller than this (in absolute value) count as stable.
pub const STABLE_THRESHOLD: f64 = 0.005;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub fn classify(change: i64, relative_change: f64) -> Self {
        if relative_change.abs() < STABLE_THRESHOLD {
            Trend::Stable
        } else if change > 0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelState {
    pub name: String,
    pub viewers: u64,
    pub share: f64,
    pub program: String,
    pub trend: Trend,
    /// Last tick's change as a fraction of the pre-tick audience.
    pub relative_change: f64,
    pub category: String,
    pub color: String,
    pub peak_today: u64,
}

impl ChannelState {
    /// Signed percentage with one decimal, e.g. `+2.1%`.
    pub fn change_text(&self) -> String {
        format_change(self.relative_change)
    }
}

pub fn format_change(relative_change: f64) -> String {
    format!("{:+.1}%", relative_change * 100.0)
}

/// Ratio of a signed change to the audience it was applied to.
pub fn relative_change(change: i64, before: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    change as f64 / before as f64
}

pub const TOTAL_SERIES: &str = "total";
pub const DIGITAL_SERIES: &str = "digital";

/// A named quantity tracked in history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesId {
    Channel(String),
    Total,
    Digital,
}

impl SeriesId {
    pub fn parse(id: &str) -> Self {
        match id {
            TOTAL_SERIES => SeriesId::Total,
            DIGITAL_SERIES => SeriesId::Digital,
            other => SeriesId::Channel(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SeriesId::Channel(name) => name,
            SeriesId::Total => TOTAL_SERIES,
            SeriesId::Digital => DIGITAL_SERIES,
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
