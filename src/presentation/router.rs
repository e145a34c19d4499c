// Route table for the history service
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{close_history, get_current_stats, get_history, health_check};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/users/:id/history", get(get_history).delete(close_history))
        .route("/users/:id/current", get(get_current_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
