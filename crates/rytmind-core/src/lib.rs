//! RytMind Core Library
//!
//! Shared functionality for the RytMind personal finance companion:
//! - Database access and migrations (transactions, journal, insights, chat)
//! - Category aggregation and spending statistics
//! - AI-powered budget recommendations with a deterministic local fallback
//! - Pluggable AI advisor backends (Gemini, mock)
//! - Insight analysis relay for external workflow endpoints
//! - Financial therapist chat
//! - Demo data seeder

pub mod ai;
pub mod budget;
pub mod db;
pub mod error;
pub mod models;
pub mod relay;
pub mod seed;
pub mod stats;
pub mod therapist;
pub mod window;

pub use ai::{AdvisorBackend, AdvisorClient, GeminiBackend, MockBackend};
pub use budget::{BudgetEngine, BudgetPlan, PlanAnalysis, SpendingEnvelope};
pub use db::{Database, StoreCounts};
pub use error::{Error, Result};
pub use relay::{AnalysisData, AnalysisRelay, RelayConfig, RelayOutcome};
pub use therapist::{ChatReply, TherapistChat};
