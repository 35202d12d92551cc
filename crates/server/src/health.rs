use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub last_interaction_at: Option<DateTime<Utc>>,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness endpoint. The bot holds no external connections, so this only
/// reports the process as up plus the most recent chat activity.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "helply-server",
        last_interaction_at: state.chatbot.latest_interaction(),
    })
}
