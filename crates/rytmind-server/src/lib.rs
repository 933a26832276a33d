//! RytMind Web Server
//!
//! Axum-based REST API for the RytMind personal finance companion.
//!
//! Two route groups:
//! - `/api/*`: the function surface used by the app UI (transactions,
//!   journal, insights, budget recommendations, therapist chat)
//! - Raw integration endpoints at the root: `POST /lindy-webhook` (analysis
//!   callback), `GET /data-for-analysis` (CORS-open data export for the
//!   external workflow), `GET /health`

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use rytmind_core::ai::{AdvisorBackend, AdvisorClient};
use rytmind_core::db::Database;
use rytmind_core::relay::{AnalysisRelay, RelayConfig};
use rytmind_core::{BudgetEngine, Error as CoreError, TherapistChat};

mod handlers;


/// Shared application state
pub struct AppState {
    pub db: Database,
    pub budget: BudgetEngine,
    pub therapist: TherapistChat,
    pub relay: AnalysisRelay,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router.
///
/// The advisor client is shared by the budget engine and the therapist
/// chat; both degrade gracefully when the backend is unreachable, so an
/// unconfigured client still yields a working server.
pub fn create_router(db: Database, ai: AdvisorClient, relay_config: Option<RelayConfig>) -> Router {
    let state = Arc::new(AppState {
        budget: BudgetEngine::new(db.clone(), ai.clone()),
        therapist: TherapistChat::new(db.clone(), ai),
        relay: AnalysisRelay::new(db.clone(), relay_config),
        db,
    });

    let api_routes = Router::new()
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/stats",
            get(handlers::transaction_stats),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction).delete(handlers::delete_transaction),
        )
        .route(
            "/transactions/:id/emotion",
            axum::routing::patch(handlers::update_transaction_emotion),
        )
        .route(
            "/transactions/:id/receipt",
            axum::routing::patch(handlers::update_transaction_receipt),
        )
        // Journal
        .route(
            "/journal",
            get(handlers::list_journal_entries).post(handlers::create_journal_entry),
        )
        .route(
            "/journal/:id",
            get(handlers::get_journal_entry)
                .patch(handlers::update_journal_entry)
                .delete(handlers::delete_journal_entry),
        )
        // Insights
        .route("/insights", get(handlers::list_insights))
        .route("/insights/latest", get(handlers::latest_insight))
        // Budget engine
        .route(
            "/budget/recommendations",
            post(handlers::budget_recommendations),
        )
        .route(
            "/budget/current-month-spending",
            get(handlers::current_month_spending),
        )
        // Analysis relay
        .route("/analysis/trigger", post(handlers::trigger_analysis))
        .route("/analysis/local", post(handlers::local_analysis))
        // Therapist chat
        .route(
            "/chat/history",
            get(handlers::chat_history).delete(handlers::clear_chat_history),
        )
        .route("/chat/send", post(handlers::send_chat_message));

    // The data export endpoint is fetched by the external workflow from
    // the browser side of its editor, so it stays CORS-open.
    let open_routes = Router::new()
        .route("/lindy-webhook", post(handlers::lindy_webhook))
        .route("/data-for-analysis", get(handlers::data_for_analysis))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive());

    Router::new()
        .nest("/api", api_routes)
        .merge(open_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    let ai = advisor_from_env().await;
    let relay_config = relay_config_from_env();

    let app = create_router(db, ai, relay_config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve and log the AI backend status at startup
async fn advisor_from_env() -> AdvisorClient {
    match AdvisorClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "AI backend configured: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
            client
        }
        None => {
            info!("AI backend not configured (set GEMINI_API_KEY); budget and chat will use local fallbacks");
            // An empty key fails fast on every call, which routes the
            // budget engine and chat to their deterministic paths.
            AdvisorClient::gemini("")
        }
    }
}

/// Resolve and log the relay configuration at startup
fn relay_config_from_env() -> Option<RelayConfig> {
    match RelayConfig::from_env() {
        Ok(config) => {
            info!("Analysis relay configured: {}", config.site_url);
            Some(config)
        }
        Err(err) => {
            info!("Analysis relay not configured ({}); local analysis remains available", err);
            None
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self {
                status: StatusCode::BAD_REQUEST,
                message: msg,
                internal: None,
            },
            CoreError::NotFound(msg) => Self {
                status: StatusCode::NOT_FOUND,
                message: msg,
                internal: None,
            },
            CoreError::Config(msg) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: msg,
                internal: None,
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Generic message to the client, full error in the log
                message: "An internal error occurred".to_string(),
                internal: Some(other.into()),
            },
        }
    }
}
