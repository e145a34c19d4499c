// JSON view of a history session for the presentation layer
use crate::application::history_session::SessionState;
use crate::domain::insight::PeriodInsight;
use crate::domain::metric::MetricDescriptor;
use crate::domain::period::{Period, View};
use crate::domain::series::{FormattedSample, MetricStats};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Ready,
    Loading,
    Missing,
}

#[derive(Debug, Serialize)]
pub struct MetricView {
    #[serde(flatten)]
    pub metric: &'static MetricDescriptor,
    pub status: MetricStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MetricStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<FormattedSample>>,
}

#[derive(Debug, Serialize)]
pub struct InsightView {
    #[serde(flatten)]
    pub insight: PeriodInsight,
    pub description: String,
}

impl From<PeriodInsight> for InsightView {
    fn from(insight: PeriodInsight) -> Self {
        let description = insight.describe();
        Self {
            insight,
            description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub period: Period,
    pub period_label: &'static str,
    pub window_days: i64,
    pub view: View,
    pub filter: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub metrics: Vec<MetricView>,
    pub insights: Vec<InsightView>,
}

impl HistoryView {
    pub fn from_state(state: &SessionState) -> Self {
        let metrics: Vec<MetricView> = state
            .request()
            .required_metrics()
            .into_iter()
            .map(|metric| metric_view(state, metric))
            .collect();

        let insights = if state.view == View::Overview {
            metrics
                .iter()
                .filter_map(|m| {
                    let entry = state.cache.get(state.period, m.metric.id)?;
                    PeriodInsight::for_metric(m.metric, entry).map(InsightView::from)
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            period: state.period,
            period_label: state.period.label(),
            window_days: state.period.lookback().num_days(),
            view: state.view,
            filter: state.filter.clone(),
            loading: state.is_loading(),
            error: state.error.clone(),
            metrics,
            insights,
        }
    }
}

fn metric_view(state: &SessionState, metric: &'static MetricDescriptor) -> MetricView {
    match state.cache.get(state.period, metric.id) {
        Some(entry) => MetricView {
            metric,
            status: MetricStatus::Ready,
            stats: Some(entry.stats),
            change_percent: (!metric.is_cumulative() && entry.stats.has_data())
                .then(|| entry.stats.change_percent()),
            series: Some(entry.series.clone()),
        },
        None => MetricView {
            metric,
            status: if state.is_loading() {
                MetricStatus::Loading
            } else {
                MetricStatus::Missing
            },
            stats: None,
            change_percent: None,
            series: None,
        },
    }
}
