// Fetch orchestrator - loads the metrics a selection needs, in one atomic batch
use crate::application::history_repository::HistoryRepository;
use crate::application::period_cache::PeriodCache;
use crate::application::series_formatter::format_series;
use crate::application::stats::derive_stats;
use crate::domain::error::HistoryError;
use crate::domain::metric::{MetricCatalog, MetricDescriptor, ValueKind};
use crate::domain::period::{Period, View};
use crate::domain::series::{CacheEntry, MetricHistory};
use futures::future::try_join_all;
use std::sync::Arc;

/// What the user is currently looking at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadRequest {
    pub period: Period,
    pub view: View,
    /// Metric ids picked in the detailed view; empty means all
    pub filter: Vec<String>,
}

impl LoadRequest {
    pub fn new(period: Period, view: View, filter: Vec<String>) -> Self {
        Self {
            period,
            view,
            filter,
        }
    }

    /// Metrics the selection displays, in catalog order
    pub fn required_metrics(&self) -> Vec<&'static MetricDescriptor> {
        let all = MetricCatalog::all().iter();
        if self.view == View::Overview || self.filter.is_empty() {
            return all.collect();
        }
        all.filter(|m| self.filter.iter().any(|id| id == m.id))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReport {
    /// Everything required was already cached; nothing was fetched
    CacheHit,
    /// A batch was fetched and written to the cache
    Committed { fetched: usize },
    /// A batch finished after the period changed and was thrown away
    Discarded,
}

/// Fully formatted results of one batch, stamped with the period it was issued for
#[derive(Debug, Clone)]
pub struct FetchedBatch {
    period: Period,
    entries: Vec<(&'static str, CacheEntry)>,
}

impl FetchedBatch {
    pub fn period(&self) -> Period {
        self.period
    }

    /// Write every entry, or none of them when `active_period` is no longer
    /// the period this batch was fetched for.
    pub fn commit(self, cache: &mut PeriodCache, active_period: Period) -> LoadReport {
        if self.period != active_period {
            tracing::warn!(
                "Discarding stale batch of {} metrics for {} (active period is {})",
                self.entries.len(),
                self.period,
                active_period
            );
            return LoadReport::Discarded;
        }

        let fetched = self.entries.len();
        for (metric_id, entry) in self.entries {
            cache.put(self.period, metric_id, entry);
        }
        tracing::info!(
            "Committed {} metrics for {} ({} cached)",
            fetched,
            self.period,
            cache.len()
        );
        LoadReport::Committed { fetched }
    }
}

#[derive(Clone)]
pub struct FetchOrchestrator {
    repository: Arc<dyn HistoryRepository>,
}

impl FetchOrchestrator {
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<dyn HistoryRepository> {
        &self.repository
    }

    /// Required metrics that are not cached for the request's period
    pub fn plan(cache: &PeriodCache, request: &LoadRequest) -> Vec<&'static MetricDescriptor> {
        request
            .required_metrics()
            .into_iter()
            .filter(|m| !cache.has(request.period, m.id))
            .collect()
    }

    /// Fetch all `metrics` concurrently. Any failure fails the whole batch.
    pub async fn fetch_batch(
        &self,
        user_id: &str,
        period: Period,
        metrics: &[&'static MetricDescriptor],
    ) -> Result<FetchedBatch, HistoryError> {
        tracing::debug!(
            "Fetching {} metrics for user {} over {}",
            metrics.len(),
            user_id,
            period
        );

        let requests = metrics.iter().map(|&metric| {
            let repository = self.repository.clone();
            async move {
                let history = repository.get_history(user_id, metric, period).await?;
                Ok::<_, anyhow::Error>((metric, history))
            }
        });

        let histories = try_join_all(requests).await.map_err(|e| {
            tracing::warn!("History batch for {} failed: {:#}", period, e);
            HistoryError::fetch(e)
        })?;

        let entries = histories
            .into_iter()
            .map(|(metric, history)| build_entry(metric, &history).map(|entry| (metric.id, entry)))
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(HistoryError::fetch)?;

        Ok(FetchedBatch { period, entries })
    }

    /// Bring `cache` up to date for `request`, returning the new cache state.
    ///
    /// On failure the cache comes back exactly as it was passed in.
    pub async fn ensure_loaded(
        &self,
        user_id: &str,
        mut cache: PeriodCache,
        request: &LoadRequest,
    ) -> (PeriodCache, Result<LoadReport, HistoryError>) {
        let missing = Self::plan(&cache, request);
        if missing.is_empty() {
            tracing::debug!("All metrics cached for {}", request.period);
            return (cache, Ok(LoadReport::CacheHit));
        }

        match self.fetch_batch(user_id, request.period, &missing).await {
            Ok(batch) => {
                let report = batch.commit(&mut cache, request.period);
                (cache, Ok(report))
            }
            Err(e) => (cache, Err(e)),
        }
    }
}

fn build_entry(metric: &MetricDescriptor, history: &MetricHistory) -> anyhow::Result<CacheEntry> {
    let shape_matches = matches!(
        (metric.value_kind, history),
        (ValueKind::Measurement, MetricHistory::Measurement(_))
            | (ValueKind::Cumulative, MetricHistory::Cumulative { .. })
    );
    if !shape_matches {
        anyhow::bail!("Invalid response format for {}", metric.id);
    }

    let series = format_series(history.samples());
    let stats = derive_stats(&series, metric.value_kind, history.server_total());
    Ok(CacheEntry::new(series, stats))
}
