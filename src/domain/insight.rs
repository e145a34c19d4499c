// Period insights - highlights shown under the overview cards
use super::metric::{MetricDescriptor, ValueKind};
use super::series::CacheEntry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeriodInsight {
    /// Highest daily value of a cumulative metric
    BestDay {
        metric_id: &'static str,
        date: String,
        value: f64,
        unit: &'static str,
    },
    /// Net change of a measurement metric across the window
    Progress {
        metric_id: &'static str,
        change: f64,
        unit: &'static str,
    },
}

impl PeriodInsight {
    pub fn for_metric(metric: &MetricDescriptor, entry: &CacheEntry) -> Option<Self> {
        let first = entry.series.first()?;
        match metric.value_kind {
            ValueKind::Cumulative => {
                // first sample wins ties
                let best = entry
                    .series
                    .iter()
                    .fold(first, |best, s| if s.value > best.value { s } else { best });
                Some(PeriodInsight::BestDay {
                    metric_id: metric.id,
                    date: best.date.clone(),
                    value: best.value,
                    unit: metric.unit,
                })
            }
            ValueKind::Measurement => {
                let last = entry.series.last()?;
                let change = last.value - first.value;
                if change == 0.0 {
                    return None;
                }
                Some(PeriodInsight::Progress {
                    metric_id: metric.id,
                    change,
                    unit: metric.unit,
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PeriodInsight::BestDay {
                date, value, unit, ..
            } => format!("{} {} on {}", value, unit, date),
            PeriodInsight::Progress { change, unit, .. } => {
                let direction = if *change > 0.0 { "Increased" } else { "Decreased" };
                format!("{} {:.1} {}", direction, change.abs(), unit)
            }
        }
    }
}
