// HTTP repository implementation against the health-data API
use crate::application::history_repository::HistoryRepository;
use crate::domain::metric::MetricDescriptor;
use crate::domain::period::Period;
use crate::domain::series::MetricHistory;
use crate::infrastructure::history_mapper::history_from_payload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpHistoryRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpHistoryRepository {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_history_url(&self, user_id: &str, metric_id: &str, period: Period) -> String {
        format!(
            "{}/dashboard/{}/history?metric={}&period={}",
            self.base_url,
            urlencoding::encode(user_id),
            urlencoding::encode(metric_id),
            period.code()
        )
    }

    fn build_current_url(&self, user_id: &str) -> String {
        format!(
            "{}/dashboard/{}/current",
            self.base_url,
            urlencoding::encode(user_id)
        )
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to health API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Health API request failed with status {}: {}", status, body);
        }

        response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse health API response")
    }
}

#[async_trait]
impl HistoryRepository for HttpHistoryRepository {
    async fn get_history(
        &self,
        user_id: &str,
        metric: &MetricDescriptor,
        period: Period,
    ) -> Result<MetricHistory> {
        let url = self.build_history_url(user_id, metric.id, period);
        let payload = self.get_json(&url).await?;
        history_from_payload(metric, payload)
    }

    async fn get_current_stats(&self, user_id: &str) -> Result<serde_json::Value> {
        let url = self.build_current_url(user_id);
        self.get_json(&url).await
    }
}
