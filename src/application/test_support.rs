// In-memory repository for application tests
use crate::application::history_repository::HistoryRepository;
use crate::domain::metric::{MetricDescriptor, ValueKind};
use crate::domain::period::Period;
use crate::domain::series::{MetricHistory, RawSample};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Holds every request until released, so a batch can be observed in flight
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct FakeRepository {
    histories: HashMap<&'static str, MetricHistory>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<(String, Period)>>,
    current_calls: AtomicUsize,
    gate: Option<Arc<Gate>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, metric_id: &'static str, history: MetricHistory) -> Self {
        self.histories.insert(metric_id, history);
        self
    }

    pub fn failing(mut self, metric_id: &'static str) -> Self {
        self.failing.insert(metric_id);
        self
    }

    pub fn gated(mut self) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<(String, Period)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    pub fn calls_for(&self, metric_id: &str) -> usize {
        self.calls().iter().filter(|(id, _)| id == metric_id).count()
    }

    pub fn current_stats_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }
}

/// Measurement metrics read 70, 68, 65; cumulative metrics log 2000 a day for a week
pub fn default_history(kind: ValueKind) -> MetricHistory {
    match kind {
        ValueKind::Measurement => MetricHistory::Measurement(vec![
            RawSample::new("2024-03-01", 70.0),
            RawSample::new("2024-03-15", 68.0),
            RawSample::new("2024-03-30", 65.0),
        ]),
        ValueKind::Cumulative => MetricHistory::Cumulative {
            data: (1..=7)
                .map(|day| RawSample::new(format!("2024-03-0{}", day), 2000.0))
                .collect(),
            total: Some(14000.0),
        },
    }
}

#[async_trait]
impl HistoryRepository for FakeRepository {
    async fn get_history(
        &self,
        _user_id: &str,
        metric: &MetricDescriptor,
        period: Period,
    ) -> anyhow::Result<MetricHistory> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((metric.id.to_string(), period));
        }

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.failing.contains(metric.id) {
            anyhow::bail!("upstream rejected request");
        }

        Ok(self
            .histories
            .get(metric.id)
            .cloned()
            .unwrap_or_else(|| default_history(metric.value_kind)))
    }

    async fn get_current_stats(&self, user_id: &str) -> anyhow::Result<serde_json::Value> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({ "user_id": user_id, "steps": 4200 }))
    }
}
