// Metric history domain models
use serde::Serialize;

/// A sample as received from the data source
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub date: String,
    pub value: f64,
}

impl RawSample {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// History for one metric over one period, in the shape its value kind dictates
#[derive(Debug, Clone, PartialEq)]
pub enum MetricHistory {
    Measurement(Vec<RawSample>),
    Cumulative {
        data: Vec<RawSample>,
        total: Option<f64>,
    },
}

impl MetricHistory {
    pub fn samples(&self) -> &[RawSample] {
        match self {
            MetricHistory::Measurement(samples) => samples,
            MetricHistory::Cumulative { data, .. } => data,
        }
    }

    /// Period total reported by the server, cumulative metrics only
    pub fn server_total(&self) -> Option<f64> {
        match self {
            MetricHistory::Measurement(_) => None,
            MetricHistory::Cumulative { total, .. } => *total,
        }
    }
}

/// A display-ready chart point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedSample {
    pub date: String,
    pub value: f64,
}

impl FormattedSample {
    pub fn new(date: String, value: f64) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricStats {
    pub current: f64,
    pub previous: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl MetricStats {
    pub fn new(current: f64, previous: f64, total: Option<f64>) -> Self {
        Self {
            current,
            previous,
            total,
        }
    }

    pub fn change(&self) -> f64 {
        self.current - self.previous
    }

    /// Percentage change from `previous` to `current`; 0 when there is no baseline
    pub fn change_percent(&self) -> f64 {
        if self.previous == 0.0 {
            return 0.0;
        }
        self.change() / self.previous * 100.0
    }

    pub fn has_data(&self) -> bool {
        !(self.current == 0.0 && self.previous == 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub series: Vec<FormattedSample>,
    pub stats: MetricStats,
}

impl CacheEntry {
    pub fn new(series: Vec<FormattedSample>, stats: MetricStats) -> Self {
        Self { series, stats }
    }
}
