// Application layer - formatting, statistics, caching and fetch orchestration
pub mod fetch_orchestrator;
pub mod history_repository;
pub mod history_session;
pub mod period_cache;
pub mod series_formatter;
pub mod stats;

#[cfg(test)]
pub mod test_support;
