//! Therapist chat handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use rytmind_core::models::ChatMessage;
use rytmind_core::ChatReply;

/// Query parameters for chat history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Request body for a chat turn
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub user_message: String,
}

/// Response for clearing history
#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub deleted: usize,
}

/// GET /api/chat/history?limit= - Chat history, oldest first
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(state.db.chat_history(params.limit)?))
}

/// POST /api/chat/send - One chat turn with the financial therapist
pub async fn send_chat_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = state.therapist.send(&req.user_message, Utc::now()).await?;
    Ok(Json(reply))
}

/// DELETE /api/chat/history - Clear all chat history
pub async fn clear_chat_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearHistoryResponse>, AppError> {
    let deleted = state.db.clear_chat_history()?;
    Ok(Json(ClearHistoryResponse { deleted }))
}
