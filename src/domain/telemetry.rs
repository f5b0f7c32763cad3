// Telemetry widget domain models
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }

    pub fn from_sample(timestamp: NaiveDateTime, value: u64) -> Self {
        Self::new(timestamp.and_utc().timestamp_millis(), value as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
    /// Value rendered with the tile's precision and grouped thousands.
    pub display: String,
}

impl TileData {
    pub fn new(id: String, title: String, unit: String, value: f64, precision: i32) -> Self {
        let display = format_number(value, precision);
        Self {
            id,
            title,
            unit,
            value,
            precision,
            display,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id,
            name,
            color,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    MultiLine,
}

impl ChartKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "multiLine" => ChartKind::MultiLine,
            _ => ChartKind::Line,
        }
    }
}

impl ChartData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        title: String,
        unit: Option<String>,
        kind: ChartKind,
        y_min: Option<f64>,
        y_max: Option<f64>,
        fraction_digits: Option<i32>,
        series: Vec<SeriesData>,
    ) -> Self {
        Self {
            id,
            title,
            unit,
            kind,
            y_min,
            y_max,
            fraction_digits,
            series,
        }
    }
}

/// Group thousands with a space: `5418000` -> `5 418 000`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_number(value: f64, precision: i32) -> String {
    if precision <= 0 {
        let rounded = value.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        return format!("{}{}", sign, group_thousands(rounded.abs() as u64));
    }
    format!("{:.*}", precision as usize, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1 000");
        assert_eq!(group_thousands(5_418_000), "5 418 000");
        assert_eq!(group_thousands(12_500_000), "12 500 000");
    }

    #[test]
    fn test_tile_display() {
        let tile = TileData::new(
            "total".to_string(),
            "Téléspectateurs".to_string(),
            "".to_string(),
            5_418_000.0,
            0,
        );
        assert_eq!(tile.display, "5 418 000");

        let tile = TileData::new("share".to_string(), "Part".to_string(), "%".to_string(), 32.2, 1);
        assert_eq!(tile.display, "32.2");
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!(ChartKind::parse("line"), ChartKind::Line);
        assert_eq!(ChartKind::parse("multiLine"), ChartKind::MultiLine);
        assert_eq!(ChartKind::parse("bar"), ChartKind::Line);
    }
}
