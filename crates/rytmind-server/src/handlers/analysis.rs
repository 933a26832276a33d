//! Analysis relay and integration endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use rytmind_core::models::{AiAnalysis, CategoryAmount, PeriodType};
use rytmind_core::relay::{period_data, AnalysisData, RelayOutcome};

/// Request body naming a period window
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRequest {
    pub period_type: Option<String>,
}

impl PeriodRequest {
    fn period(&self) -> PeriodType {
        PeriodType::parse_or_default(self.period_type.as_deref().unwrap_or("7days"))
    }
}

/// Outcome message for a triggered analysis
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

/// Summary returned after a local analysis run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAnalysisResponse {
    pub success: bool,
    pub total_spending: f64,
    pub transaction_count: usize,
}

/// POST /api/analysis/trigger - Send period data to the external workflow
pub async fn trigger_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PeriodRequest>,
) -> Result<Json<TriggerResponse>, AppError> {
    let outcome = state.relay.trigger_analysis(req.period(), Utc::now()).await?;
    let response = match outcome {
        RelayOutcome::Stored => TriggerResponse {
            success: true,
            message: "Analysis complete".to_string(),
        },
        RelayOutcome::UnexpectedFormat => TriggerResponse {
            success: false,
            message: "Analysis endpoint returned an unexpected format".to_string(),
        },
    };
    Ok(Json(response))
}

/// POST /api/analysis/local - Generate an insight without the external workflow
pub async fn local_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PeriodRequest>,
) -> Result<Json<LocalAnalysisResponse>, AppError> {
    let data = state.relay.local_analysis(req.period(), Utc::now())?;
    Ok(Json(LocalAnalysisResponse {
        success: true,
        total_spending: data.total_spending,
        transaction_count: data.transaction_count,
    }))
}

/// Analysis callback payload from the external workflow
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub period_type: Option<String>,
    pub total_spending: Option<f64>,
    pub transaction_count: Option<i64>,
    #[serde(default)]
    pub category_breakdown: Vec<CategoryAmount>,
    pub ai_analysis: Option<WebhookAnalysis>,
}

/// Analysis fields from the callback; anything missing becomes empty
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub top_insight: String,
    #[serde(default)]
    pub spending_patterns: Vec<String>,
    #[serde(default)]
    pub emotional_triggers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

/// POST /lindy-webhook - Receive analysis results from the external workflow
pub async fn lindy_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload>,
) -> Result<(StatusCode, Json<WebhookResponse>), AppError> {
    let (period_type, analysis) = match (&payload.period_type, payload.ai_analysis) {
        (Some(period_type), Some(analysis)) => (period_type, analysis),
        _ => {
            return Err(AppError::bad_request(
                "Missing required fields: periodType and aiAnalysis",
            ))
        }
    };

    let period = PeriodType::parse_or_default(period_type);
    state.relay.store_webhook_analysis(
        period,
        payload.total_spending.unwrap_or(0.0),
        payload.transaction_count.unwrap_or(0),
        payload.category_breakdown,
        AiAnalysis {
            summary: analysis.summary,
            top_insight: analysis.top_insight,
            spending_patterns: analysis.spending_patterns,
            emotional_triggers: analysis.emotional_triggers,
        },
        Utc::now(),
    )?;

    Ok((
        StatusCode::OK,
        Json(WebhookResponse {
            success: true,
            message: "Insight stored successfully".to_string(),
        }),
    ))
}

/// Query parameters for the data export
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub period: Option<String>,
}

/// GET /data-for-analysis - Period spending data for the external workflow
pub async fn data_for_analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataQuery>,
) -> Result<Json<AnalysisData>, AppError> {
    let period = PeriodType::parse_or_default(params.period.as_deref().unwrap_or("7days"));
    Ok(Json(period_data(&state.db, period, Utc::now())?))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
