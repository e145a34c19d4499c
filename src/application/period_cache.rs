// Period cache - formatted series and stats for the selected period only
use crate::domain::period::Period;
use crate::domain::series::CacheEntry;
use std::collections::HashMap;

/// Entries keyed by metric id, all belonging to one period.
///
/// Writing an entry for a different period flushes everything first, so the
/// cache never mixes periods. There is no per-entry eviction.
#[derive(Debug, Clone, Default)]
pub struct PeriodCache {
    period: Option<Period>,
    entries: HashMap<String, CacheEntry>,
}

impl PeriodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period the cached entries belong to, `None` while empty
    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn get(&self, period: Period, metric_id: &str) -> Option<&CacheEntry> {
        if self.period != Some(period) {
            return None;
        }
        self.entries.get(metric_id)
    }

    pub fn has(&self, period: Period, metric_id: &str) -> bool {
        self.get(period, metric_id).is_some()
    }

    pub fn put(&mut self, period: Period, metric_id: &str, entry: CacheEntry) {
        if self.period != Some(period) {
            self.clear();
            self.period = Some(period);
        }
        self.entries.insert(metric_id.to_string(), entry);
    }

    pub fn clear(&mut self) {
        self.period = None;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
