//! Chat API routes.
//!
//! - `POST /api/chat` submits a message and returns the bot response.
//! - `GET /api/history/{user_id}` lists the stored turns for a user.
//! - `DELETE /api/history/{user_id}` clears the stored turns for a user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use helply_core::{ChatRequest, ConversationEntry, ResponseEnvelope};
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub conversation_count: usize,
    pub history: Vec<ConversationEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/history/{user_id}", get(get_history).delete(clear_history))
        .with_state(state)
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ResponseEnvelope>, (StatusCode, Json<ApiErrorBody>)> {
    match state.chatbot.process(request).await {
        Ok(envelope) => Ok(Json(envelope)),
        Err(error) => {
            tracing::warn!(
                event_name = "api.chat.rejected",
                reason = %error,
                "rejected chat request"
            );
            Err((
                StatusCode::BAD_REQUEST,
                Json(ApiErrorBody {
                    error: error.user_message().to_string(),
                }),
            ))
        }
    }
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<HistoryResponse> {
    let history = state.chatbot.history(Some(&user_id));
    Json(HistoryResponse {
        conversation_count: history.len(),
        history,
        user_id,
    })
}

pub async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ClearResponse> {
    let removed = state.chatbot.clear_history(Some(&user_id));
    tracing::info!(
        event_name = "api.history.cleared",
        user_id = %user_id,
        removed,
        "cleared conversation history"
    );
    Json(ClearResponse {
        success: true,
        message: format!("History cleared for user {user_id}"),
    })
}
