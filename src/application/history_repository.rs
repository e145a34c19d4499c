// Repository trait for metric history data access
use crate::domain::metric::MetricDescriptor;
use crate::domain::period::Period;
use crate::domain::series::MetricHistory;
use async_trait::async_trait;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Fetch one metric's history over a period.
    /// The returned shape follows the metric's value kind; a payload that does
    /// not match it is an error.
    async fn get_history(
        &self,
        user_id: &str,
        metric: &MetricDescriptor,
        period: Period,
    ) -> anyhow::Result<MetricHistory>;

    /// Snapshot of today's figures for the non-historical overview page
    async fn get_current_stats(&self, user_id: &str) -> anyhow::Result<serde_json::Value>;
}
