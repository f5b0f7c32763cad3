// Domain errors raised by the metrics engine
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("unknown series: {0}")]
    UnknownSeries(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A tick must land strictly after the newest recorded sample.
    #[error("tick at {now} is not after last sample at {last}")]
    StaleTimestamp {
        now: NaiveDateTime,
        last: NaiveDateTime,
    },
}

pub type MetricsResult<T> = Result<T, MetricsError>;
