//! Budget engine handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::{AppError, AppState};
use rytmind_core::BudgetPlan;

/// Request body for budget recommendations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub income: f64,
    pub savings_goal: f64,
    pub duration_months: u32,
}

/// POST /api/budget/recommendations - Generate a budget plan
///
/// Envelope validation failures come back as 400; AI failures never
/// surface, the engine degrades to its local heuristic.
pub async fn budget_recommendations(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Json<BudgetPlan>, AppError> {
    let plan = state
        .budget
        .recommend(req.income, req.savings_goal, req.duration_months, Utc::now())
        .await?;
    Ok(Json(plan))
}

/// GET /api/budget/current-month-spending - Per-category spending this month
pub async fn current_month_spending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HashMap<String, f64>>, AppError> {
    Ok(Json(state.budget.current_month_spending(Utc::now())?))
}
