// HTTP request handlers
use crate::application::history_session::HistorySession;
use crate::domain::error::HistoryError;
use crate::domain::period::{Period, View};
use crate::presentation::app_state::AppState;
use crate::presentation::view_model::HistoryView;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Selection changes; absent fields keep the session's current choice
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
    pub view: Option<String>,
    /// Comma-separated metric ids; empty selects all
    pub metrics: Option<String>,
}

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        let status = if self.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Apply the selection, load what it is missing and return the session view.
/// Fetch failures are reported inside the view so the client can retry.
pub async fn get_history(
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryView>, HistoryError> {
    let session = state.sessions.session(&user_id).await;
    apply_selection(&session, &query).await?;

    if let Err(e) = session.ensure_loaded().await {
        tracing::warn!("Error loading history for user {}: {}", user_id, e);
    }

    let snapshot = session.snapshot().await;
    Ok(Json(HistoryView::from_state(&snapshot)))
}

/// Drop a user's session and cached history
pub async fn close_history(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.sessions.close(&user_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Today's figures, passed through from the upstream API
pub async fn get_current_stats(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, HistoryError> {
    state
        .sessions
        .orchestrator()
        .repository()
        .get_current_stats(&user_id)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!("Error fetching current stats for user {}: {}", user_id, e);
            HistoryError::fetch(e)
        })
}

async fn apply_selection(session: &HistorySession, query: &HistoryQuery) -> Result<(), HistoryError> {
    // validate everything before touching the session
    let period = query.period.as_deref().map(str::parse::<Period>).transpose()?;
    let view = query.view.as_deref().map(str::parse::<View>).transpose()?;
    let filter = query.metrics.as_deref().map(parse_metric_list);

    if let Some(filter) = filter {
        session.set_filter(filter).await?;
    }
    if let Some(view) = view {
        session.set_view(view).await;
    }
    if let Some(period) = period {
        session.select_period(period).await;
    }
    Ok(())
}

fn parse_metric_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
