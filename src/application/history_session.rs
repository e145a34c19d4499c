// History session - per-user selection state around the fetch orchestrator
use crate::application::fetch_orchestrator::{FetchOrchestrator, LoadReport, LoadRequest};
use crate::application::period_cache::PeriodCache;
use crate::domain::error::HistoryError;
use crate::domain::metric::MetricCatalog;
use crate::domain::period::{Period, View};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub period: Period,
    pub view: View,
    pub filter: Vec<String>,
    pub cache: PeriodCache,
    pub error: Option<String>,
    loading: bool,
}

impl SessionState {
    pub fn with_selection(period: Period, view: View, filter: Vec<String>) -> Self {
        Self {
            period,
            view,
            filter,
            ..Self::default()
        }
    }

    pub fn request(&self) -> LoadRequest {
        LoadRequest::new(self.period, self.view, self.filter.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Counts a batch as in flight until dropped, whether or not the fetch
/// future ran to completion
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Selection state and period cache of one user.
///
/// The cache is only written by the commit step of `ensure_loaded`, under the
/// state lock. The lock is released while a batch is on the network.
pub struct HistorySession {
    user_id: String,
    orchestrator: FetchOrchestrator,
    state: Mutex<SessionState>,
    in_flight: AtomicUsize,
}

impl HistorySession {
    pub fn new(user_id: String, orchestrator: FetchOrchestrator, period: Period) -> Self {
        let state = SessionState::with_selection(period, View::default(), Vec::new());
        Self {
            user_id,
            orchestrator,
            state: Mutex::new(state),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Switch the period. A different period invalidates the whole cache at once.
    pub async fn select_period(&self, period: Period) {
        let mut state = self.state.lock().await;
        if state.period != period {
            if !state.cache.is_empty() {
                tracing::debug!(
                    "User {} switched period {} -> {}, dropping {} cached metrics",
                    self.user_id,
                    state.period,
                    period,
                    state.cache.len()
                );
            }
            state.cache.clear();
            state.period = period;
        }
    }

    pub async fn set_view(&self, view: View) {
        self.state.lock().await.view = view;
    }

    /// Replace the detailed-view filter; every id must be a known metric
    pub async fn set_filter(&self, filter: Vec<String>) -> Result<(), HistoryError> {
        if let Some(unknown) = filter.iter().find(|id| MetricCatalog::by_id(id).is_none()) {
            return Err(HistoryError::UnknownMetric(unknown.clone()));
        }
        self.state.lock().await.filter = filter;
        Ok(())
    }

    /// Add the metric to the filter, or remove it if already present
    pub async fn toggle_metric(&self, metric_id: &str) -> Result<(), HistoryError> {
        if MetricCatalog::by_id(metric_id).is_none() {
            return Err(HistoryError::UnknownMetric(metric_id.to_string()));
        }
        let mut state = self.state.lock().await;
        if let Some(pos) = state.filter.iter().position(|id| id == metric_id) {
            state.filter.remove(pos);
        } else {
            state.filter.push(metric_id.to_string());
        }
        Ok(())
    }

    /// Load whatever the current selection is missing.
    ///
    /// The batch is stamped with the period selected when it started; if the
    /// period has changed by the time it completes, its results are dropped.
    /// Every call starts by clearing the previous error, cache hits included.
    pub async fn ensure_loaded(&self) -> Result<LoadReport, HistoryError> {
        let (request, missing, in_flight) = {
            let mut state = self.state.lock().await;
            state.error = None;
            let request = state.request();
            let missing = FetchOrchestrator::plan(&state.cache, &request);
            if missing.is_empty() {
                return Ok(LoadReport::CacheHit);
            }
            (request, missing, InFlight::enter(&self.in_flight))
        };

        let result = self
            .orchestrator
            .fetch_batch(&self.user_id, request.period, &missing)
            .await;

        let mut state = self.state.lock().await;
        drop(in_flight);
        let active_period = state.period;

        match result {
            Ok(batch) => Ok(batch.commit(&mut state.cache, active_period)),
            Err(e) => {
                if active_period == request.period {
                    state.error = Some(e.to_string());
                } else {
                    tracing::debug!("Ignoring failure of stale batch for {}", request.period);
                }
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        let mut state = self.state.lock().await.clone();
        state.loading = self.in_flight.load(Ordering::SeqCst) > 0;
        state
    }
}

/// One history session per user id, created on first use
pub struct SessionRegistry {
    orchestrator: FetchOrchestrator,
    default_period: Period,
    sessions: Mutex<HashMap<String, Arc<HistorySession>>>,
}

impl SessionRegistry {
    pub fn new(orchestrator: FetchOrchestrator, default_period: Period) -> Self {
        Self {
            orchestrator,
            default_period,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    pub async fn session(&self, user_id: &str) -> Arc<HistorySession> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(HistorySession::new(
                    user_id.to_string(),
                    self.orchestrator.clone(),
                    self.default_period,
                ))
            })
            .clone()
    }

    /// Drop a user's session and its cache
    pub async fn close(&self, user_id: &str) -> bool {
        self.sessions.lock().await.remove(user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::FakeRepository;

    fn session(repo: &Arc<FakeRepository>) -> Arc<HistorySession> {
        Arc::new(HistorySession::new(
            "42".to_string(),
            FetchOrchestrator::new(repo.clone()),
            Period::OneMonth,
        ))
    }

    #[tokio::test]
    async fn test_toggling_view_and_filter_reuses_cache() {
        let repo = Arc::new(FakeRepository::new());
        let session = session(&repo);

        session.set_view(View::Detailed).await;
        session.set_filter(vec!["weight".to_string()]).await.unwrap();
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::Committed { fetched: 1 });

        session.toggle_metric("steps").await.unwrap();
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::Committed { fetched: 1 });

        session.toggle_metric("steps").await.unwrap();
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::CacheHit);

        session.set_view(View::Overview).await;
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::Committed { fetched: 4 });
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::CacheHit);
        assert_eq!(repo.call_count(), 6);
    }

    #[tokio::test]
    async fn test_period_change_invalidates_immediately() {
        let repo = Arc::new(FakeRepository::new());
        let session = session(&repo);

        session.ensure_loaded().await.unwrap();
        assert_eq!(session.snapshot().await.cache.len(), 6);

        session.select_period(Period::SixMonths).await;
        let state = session.snapshot().await;
        for metric in MetricCatalog::all() {
            assert!(!state.cache.has(Period::OneMonth, metric.id));
        }
        assert!(state.cache.is_empty());

        session.ensure_loaded().await.unwrap();
        assert_eq!(repo.call_count(), 12);
        assert!(repo.calls().iter().skip(6).all(|(_, p)| *p == Period::SixMonths));
    }

    #[tokio::test]
    async fn test_reselecting_same_period_keeps_cache() {
        let repo = Arc::new(FakeRepository::new());
        let session = session(&repo);

        session.ensure_loaded().await.unwrap();
        session.select_period(Period::OneMonth).await;
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::CacheHit);
        assert_eq!(repo.call_count(), 6);
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_clears_loading() {
        let repo = Arc::new(FakeRepository::new().failing("exercise"));
        let session = session(&repo);

        assert!(session.ensure_loaded().await.is_err());
        let state = session.snapshot().await;
        assert!(!state.is_loading());
        assert!(state.error.is_some());
        assert!(state.cache.is_empty());

        // narrowing the selection lets the retry succeed and clears the error
        session.set_view(View::Detailed).await;
        session.set_filter(vec!["weight".to_string()]).await.unwrap();
        assert!(session.ensure_loaded().await.is_ok());
        let state = session.snapshot().await;
        assert!(state.error.is_none());
        assert!(state.cache.has(Period::OneMonth, "weight"));
    }

    #[tokio::test]
    async fn test_unknown_metric_in_filter_is_rejected() {
        let repo = Arc::new(FakeRepository::new());
        let session = session(&repo);

        let err = session
            .set_filter(vec!["weight".to_string(), "sleep".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::UnknownMetric(id) if id == "sleep"));
        assert!(session.snapshot().await.filter.is_empty());
        assert!(session.toggle_metric("sleep").await.is_err());
    }

    #[tokio::test]
    async fn test_batch_finishing_after_period_change_is_discarded() {
        let (repo, gate) = FakeRepository::new().gated();
        let repo = Arc::new(repo);
        let session = session(&repo);
        session.set_view(View::Detailed).await;
        session.set_filter(vec!["weight".to_string()]).await.unwrap();

        let in_flight = tokio::spawn({
            let session = session.clone();
            async move { session.ensure_loaded().await }
        });

        gate.entered.notified().await;
        assert!(session.snapshot().await.is_loading());

        session.select_period(Period::OneWeek).await;
        gate.release.notify_one();

        let report = in_flight.await.unwrap().unwrap();
        assert_eq!(report, LoadReport::Discarded);

        let state = session.snapshot().await;
        assert!(!state.is_loading());
        assert!(state.cache.is_empty());
        assert!(!state.cache.has(Period::OneMonth, "weight"));
        assert!(!state.cache.has(Period::OneWeek, "weight"));
    }

    #[tokio::test]
    async fn test_cache_hit_clears_previous_error() {
        let repo = Arc::new(FakeRepository::new().failing("exercise"));
        let session = session(&repo);

        session.set_view(View::Detailed).await;
        session.set_filter(vec!["weight".to_string()]).await.unwrap();
        session.ensure_loaded().await.unwrap();

        session.set_view(View::Overview).await;
        assert!(session.ensure_loaded().await.is_err());
        assert!(session.snapshot().await.error.is_some());

        session.set_view(View::Detailed).await;
        assert_eq!(session.ensure_loaded().await.unwrap(), LoadReport::CacheHit);
        assert!(session.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_load_clears_loading() {
        let (repo, gate) = FakeRepository::new().gated();
        let repo = Arc::new(repo);
        let session = session(&repo);

        let task = tokio::spawn({
            let session = session.clone();
            async move { session.ensure_loaded().await }
        });

        gate.entered.notified().await;
        assert!(session.snapshot().await.is_loading());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let state = session.snapshot().await;
        assert!(!state.is_loading());
        assert!(state.cache.is_empty());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_registry_reuses_sessions() {
        let repo = Arc::new(FakeRepository::new());
        let registry = SessionRegistry::new(FetchOrchestrator::new(repo.clone()), Period::OneWeek);

        let first = registry.session("7").await;
        let again = registry.session("7").await;
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.snapshot().await.period, Period::OneWeek);

        assert!(registry.close("7").await);
        assert!(!registry.close("7").await);
        let fresh = registry.session("7").await;
        assert!(!Arc::ptr_eq(&first, &fresh));
    }
}
