// Fixed-depth sliding window of samples for every tracked series
use super::channel::SeriesId;
use super::error::{MetricsError, MetricsResult};
use chrono::NaiveDateTime;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_HISTORY_DEPTH: usize = 60;

/// All series share one timestamp axis, so a row is appended for every
/// series at once and evicted for every series at once.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    depth: usize,
    timestamps: VecDeque<NaiveDateTime>,
    series: Vec<SeriesId>,
    index: HashMap<SeriesId, usize>,
    columns: Vec<VecDeque<u64>>,
}

impl HistoryBuffer {
    pub fn new(series: Vec<SeriesId>, depth: usize) -> Self {
        let index = series
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let columns = series
            .iter()
            .map(|_| VecDeque::with_capacity(depth + 1))
            .collect();

        Self {
            depth,
            timestamps: VecDeque::with_capacity(depth + 1),
            series,
            index,
            columns,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.back().copied()
    }

    pub fn series_ids(&self) -> &[SeriesId] {
        &self.series
    }

    /// Append one row; `values` is ordered like `series_ids()`.
    pub fn push(&mut self, timestamp: NaiveDateTime, values: &[u64]) -> MetricsResult<()> {
        if let Some(last) = self.last_timestamp() {
            if timestamp <= last {
                return Err(MetricsError::StaleTimestamp {
                    now: timestamp,
                    last,
                });
            }
        }
        debug_assert_eq!(values.len(), self.columns.len());

        self.timestamps.push_back(timestamp);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push_back(*value);
        }

        while self.timestamps.len() > self.depth {
            self.timestamps.pop_front();
            for column in &mut self.columns {
                column.pop_front();
            }
        }

        Ok(())
    }

    /// Oldest-first samples for one series.
    pub fn series(&self, id: &SeriesId) -> MetricsResult<Vec<(NaiveDateTime, u64)>> {
        let column = self
            .index
            .get(id)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| MetricsError::UnknownSeries(id.to_string()))?;

        Ok(self
            .timestamps
            .iter()
            .copied()
            .zip(column.iter().copied())
            .collect())
    }
}
