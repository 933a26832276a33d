//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{AppError, AppState, SuccessResponse};
use rytmind_core::models::{NewTransaction, PeriodType, SpendingStats, Transaction};
use rytmind_core::window::period_range_millis;

/// Query parameters for stats
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Analysis period; unrecognized values fall back to 7 days
    pub period: Option<String>,
}

/// Request body for tagging a transaction with an emotion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRequest {
    pub emotion: String,
    pub emotion_emoji: String,
    pub notes: Option<String>,
}

/// Request body for attaching a receipt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub receipt_url: String,
    pub emotion: Option<String>,
    pub emotion_emoji: Option<String>,
}

/// GET /api/transactions - List all transactions, most recent first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(state.db.list_transactions()?))
}

/// POST /api/transactions - Log a new transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(new_tx): Json<NewTransaction>,
) -> Result<Json<Transaction>, AppError> {
    let id = state.db.insert_transaction(&new_tx)?;
    let tx = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found("Transaction not found after insert"))?;
    Ok(Json(tx))
}

/// GET /api/transactions/:id
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    state
        .db
        .get_transaction(id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))
}

/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_transaction(id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PATCH /api/transactions/:id/emotion - Tag a transaction with an emotion
pub async fn update_transaction_emotion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<EmotionRequest>,
) -> Result<Json<Transaction>, AppError> {
    state
        .db
        .update_transaction_emotion(id, &req.emotion, &req.emotion_emoji, req.notes.as_deref())?;
    let tx = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;
    Ok(Json(tx))
}

/// PATCH /api/transactions/:id/receipt - Attach a receipt reference
pub async fn update_transaction_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReceiptRequest>,
) -> Result<Json<Transaction>, AppError> {
    state.db.update_transaction_receipt(
        id,
        &req.receipt_url,
        req.emotion.as_deref(),
        req.emotion_emoji.as_deref(),
    )?;
    let tx = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;
    Ok(Json(tx))
}

/// GET /api/transactions/stats?period= - Spending statistics for a window
pub async fn transaction_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<SpendingStats>, AppError> {
    let period = PeriodType::parse_or_default(params.period.as_deref().unwrap_or("7days"));
    let (start, end) = period_range_millis(period, Utc::now());
    Ok(Json(state.db.spending_stats(start, end)?))
}
