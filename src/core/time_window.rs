use serde::{Deserialize, Serialize};

/// Aggregation applied by the data subscription before samples reach the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationType {
    #[default]
    None,
    Min,
    Max,
    Avg,
    Sum,
    Count,
}

impl AggregationType {
    /// Raw samples are plotted as-is; every other mode produces interval buckets.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Visible time window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub min_time: i64,
    pub max_time: i64,
    /// Aggregation bucket size in milliseconds.
    #[serde(default)]
    pub interval: Option<i64>,
}

impl TimeWindow {
    #[must_use]
    pub fn new(min_time: i64, max_time: i64) -> Self {
        Self {
            min_time,
            max_time,
            interval: None,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: i64) -> Self {
        self.interval = Some(interval);
        self
    }

    #[must_use]
    pub fn span(self) -> i64 {
        self.max_time.saturating_sub(self.min_time)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
