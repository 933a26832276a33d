//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use rytmind_core::models::{Insight, PeriodType};

/// Query parameters for listing insights
#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Query parameters for the latest insight
#[derive(Debug, Deserialize)]
pub struct LatestInsightQuery {
    pub period: Option<String>,
}

/// GET /api/insights?limit= - Most recently generated insights
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightQuery>,
) -> Result<Json<Vec<Insight>>, AppError> {
    Ok(Json(state.db.list_insights(params.limit)?))
}

/// GET /api/insights/latest?period= - Latest insight for a period
///
/// Returns null when no insight has been generated for the period yet.
pub async fn latest_insight(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LatestInsightQuery>,
) -> Result<Json<Option<Insight>>, AppError> {
    let period = PeriodType::parse_or_default(params.period.as_deref().unwrap_or("7days"));
    Ok(Json(state.db.latest_insight(period)?))
}
