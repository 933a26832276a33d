//! Journal entry handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, SuccessResponse};
use rytmind_core::models::{JournalEntry, JournalPatch, NewJournalEntry};

/// Query parameters for listing journal entries
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalQuery {
    /// When set, only entries linked to this transaction
    pub transaction_id: Option<i64>,
}

/// GET /api/journal - List journal entries, most recent first
pub async fn list_journal_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JournalQuery>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    let entries = match params.transaction_id {
        Some(tx_id) => state.db.journal_entries_for_transaction(tx_id)?,
        None => state.db.list_journal_entries()?,
    };
    Ok(Json(entries))
}

/// POST /api/journal - Write a journal entry
pub async fn create_journal_entry(
    State(state): State<Arc<AppState>>,
    Json(new_entry): Json<NewJournalEntry>,
) -> Result<Json<JournalEntry>, AppError> {
    let id = state.db.insert_journal_entry(&new_entry)?;
    let entry = state
        .db
        .get_journal_entry(id)?
        .ok_or_else(|| AppError::not_found("Journal entry not found after insert"))?;
    Ok(Json(entry))
}

/// GET /api/journal/:id
pub async fn get_journal_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<JournalEntry>, AppError> {
    state
        .db
        .get_journal_entry(id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Journal entry {} not found", id)))
}

/// PATCH /api/journal/:id - Partial update of content/mood
pub async fn update_journal_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<JournalPatch>,
) -> Result<Json<JournalEntry>, AppError> {
    state.db.update_journal_entry(id, &patch)?;
    let entry = state
        .db
        .get_journal_entry(id)?
        .ok_or_else(|| AppError::not_found(&format!("Journal entry {} not found", id)))?;
    Ok(Json(entry))
}

/// DELETE /api/journal/:id
pub async fn delete_journal_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_journal_entry(id)?;
    Ok(Json(SuccessResponse { success: true }))
}
