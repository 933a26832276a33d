//! Budget recommendation engine
//!
//! The engine gathers spending context from the store, asks the AI advisor
//! for a plan, and reconciles the result against the monthly envelope. The
//! AI path and the local heuristic are two explicit branches: `try_ai_plan`
//! returns a Result, and any failure in it is logged and routed to
//! `local_plan`. Callers never see a raw provider error from this flow;
//! only envelope validation and store errors propagate.

mod envelope;
mod fallback;
mod prompt;
mod response;

pub use envelope::SpendingEnvelope;
pub use fallback::{fallback_budgets, fallback_insights};
pub use prompt::build_prompt;
pub use response::{default_insights, parse_budget_response, reconcile, round_cents};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::ai::{AdvisorBackend, AdvisorClient};
use crate::db::Database;
use crate::error::Result;
use crate::models::{BudgetRecommendation, CategoryStat, JournalEntry, Transaction};
use crate::stats::{category_stats, spending_by_category};
use crate::window::{history_range_millis, month_start_millis, to_millis};

/// Provenance note attached to a generated plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAnalysis {
    pub summary: String,
    pub source: String,
}

/// A complete budget plan, from either the AI path or the local heuristic
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub success: bool,
    pub budgets: Vec<BudgetRecommendation>,
    pub insights: Vec<String>,
    pub ai_analysis: PlanAnalysis,
}

/// Spending context assembled once per recommendation request
struct PlanContext {
    envelope: SpendingEnvelope,
    current_spending: HashMap<String, f64>,
    stats: Vec<CategoryStat>,
    journal_entries: Vec<JournalEntry>,
    recent_transactions: Vec<Transaction>,
}

pub struct BudgetEngine {
    db: Database,
    ai: AdvisorClient,
}

impl BudgetEngine {
    pub fn new(db: Database, ai: AdvisorClient) -> Self {
        Self { db, ai }
    }

    /// Real per-category spending for the current calendar month
    pub fn current_month_spending(&self, now: DateTime<Utc>) -> Result<HashMap<String, f64>> {
        let transactions = self
            .db
            .transactions_in_range(month_start_millis(now), to_millis(now))?;
        Ok(spending_by_category(&transactions))
    }

    fn gather_context(
        &self,
        income: f64,
        savings_goal: f64,
        duration_months: u32,
        now: DateTime<Utc>,
    ) -> Result<PlanContext> {
        let envelope = SpendingEnvelope::new(income, savings_goal, duration_months)?;

        let (history_start, history_end) = history_range_millis(now);
        let historical = self.db.transactions_in_range(history_start, history_end)?;
        let journal_entries = self
            .db
            .journal_entries_in_range(history_start, history_end)?;
        let current_spending = self.current_month_spending(now)?;
        let stats = category_stats(&historical, &current_spending);

        Ok(PlanContext {
            envelope,
            current_spending,
            stats,
            journal_entries,
            recent_transactions: historical,
        })
    }

    /// Generate a budget plan for the given envelope inputs.
    ///
    /// Envelope validation failures and store errors propagate; AI failures
    /// do not, they fall through to the local heuristic.
    pub async fn recommend(
        &self,
        income: f64,
        savings_goal: f64,
        duration_months: u32,
        now: DateTime<Utc>,
    ) -> Result<BudgetPlan> {
        let ctx = self.gather_context(income, savings_goal, duration_months, now)?;

        match self.try_ai_plan(&ctx).await {
            Ok(plan) => Ok(plan),
            Err(err) => {
                warn!(error = %err, "AI budget generation failed, using local heuristic");
                Ok(self.local_plan(&ctx))
            }
        }
    }

    /// The AI branch: one prompt, one call, parse, reconcile.
    async fn try_ai_plan(&self, ctx: &PlanContext) -> Result<BudgetPlan> {
        let prompt = build_prompt(
            &ctx.envelope,
            &ctx.current_spending,
            &ctx.stats,
            &ctx.journal_entries,
            &ctx.recent_transactions,
        );

        let text = self.ai.generate(&prompt).await?;
        let parsed = parse_budget_response(&text)?;

        let mut budgets = parsed.budgets;
        reconcile(&mut budgets, &ctx.envelope, &ctx.current_spending);

        let total_current: f64 = ctx.current_spending.values().sum();
        let insights = if parsed.insights.is_empty() {
            default_insights(total_current)
        } else {
            parsed.insights
        };

        info!(
            budgets = budgets.len(),
            model = self.ai.model(),
            "AI budget plan generated"
        );
        Ok(BudgetPlan {
            success: true,
            ai_analysis: PlanAnalysis {
                summary: format!(
                    "Generated {} budget recommendations using {}",
                    budgets.len(),
                    self.ai.model()
                ),
                source: self.ai.model().to_string(),
            },
            budgets,
            insights,
        })
    }

    /// The deterministic branch: no network, always succeeds.
    fn local_plan(&self, ctx: &PlanContext) -> BudgetPlan {
        let budgets = fallback_budgets(&ctx.envelope, &ctx.stats, &ctx.current_spending);
        let total_current: f64 = ctx.current_spending.values().sum();

        BudgetPlan {
            success: true,
            budgets,
            insights: fallback_insights(&ctx.envelope, total_current),
            ai_analysis: PlanAnalysis {
                summary: "Fallback: Generated using intelligent analysis of real spending data"
                    .to_string(),
                source: "local-analysis".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::error::Error;
    use crate::models::NewTransaction;
    use chrono::TimeZone;

    fn seeded_db(now: DateTime<Utc>) -> Database {
        let db = Database::in_memory().unwrap();
        let ts = to_millis(now) - 1000;
        for (merchant, category, amount) in [
            ("Aeon", "Food", -300.0),
            ("Shopee", "Shopping", -200.0),
            ("TNB", "Bills", -150.0),
        ] {
            db.insert_transaction(&NewTransaction {
                merchant: merchant.to_string(),
                date: "Dec 6, 2024".to_string(),
                time: "10:30 AM".to_string(),
                timestamp: ts,
                category: category.to_string(),
                amount,
                emotion: None,
                emotion_emoji: None,
                notes: None,
            })
            .unwrap();
        }
        db
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 6, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_ai_plan_reconciled_to_envelope() {
        let now = fixed_now();
        let mock = MockBackend::with_response(
            r#"{"budgets": [
                {"category": "Food", "suggestedBudget": 1800.0},
                {"category": "Shopping", "suggestedBudget": 1200.0}
            ], "insights": ["from the model"]}"#,
        );
        let engine = BudgetEngine::new(seeded_db(now), AdvisorClient::Mock(mock));

        let plan = engine.recommend(3000.0, 6000.0, 12, now).await.unwrap();
        assert!(plan.success);
        assert_eq!(plan.ai_analysis.source, "mock");
        let total: f64 = plan.budgets.iter().map(|b| b.suggested_budget).sum();
        assert!((total - 2500.0).abs() < 0.05);
        // Real current-month spending attached
        let food = plan.budgets.iter().find(|b| b.category == "Food").unwrap();
        assert_eq!(food.current_spending, 300.0);
        assert_eq!(plan.insights, vec!["from the model"]);
    }

    #[tokio::test]
    async fn test_unparseable_response_falls_back() {
        let now = fixed_now();
        let mock = MockBackend::with_response("I am unable to produce a budget right now.");
        let engine = BudgetEngine::new(seeded_db(now), AdvisorClient::Mock(mock));

        let plan = engine.recommend(3000.0, 6000.0, 12, now).await.unwrap();
        assert!(plan.success);
        assert_eq!(plan.ai_analysis.source, "local-analysis");
        assert_eq!(plan.budgets.len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_envelope_propagates() {
        let now = fixed_now();
        let engine = BudgetEngine::new(seeded_db(now), AdvisorClient::mock());
        let err = engine.recommend(1000.0, 24000.0, 12, now).await;
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_current_month_spending() {
        let now = fixed_now();
        let engine = BudgetEngine::new(seeded_db(now), AdvisorClient::mock());
        let spending = engine.current_month_spending(now).unwrap();
        assert_eq!(spending.get("Food"), Some(&300.0));
        assert_eq!(spending.len(), 3);
    }
}
