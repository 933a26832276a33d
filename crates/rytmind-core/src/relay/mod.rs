//! Insight analysis relay
//!
//! Forwards a period's spending data to an external workflow endpoint and
//! stores whatever analysis comes back, keyed by period type. Endpoint URLs
//! are resolved from the environment at startup, one per period; with any
//! of them missing the relay runs disabled and triggering reports a
//! configuration error. The local analysis path generates a canned
//! narrative from the same data and needs no configuration at all.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    AiAnalysis, CategoryAmount, JournalEntry, NewInsight, PeriodType, Transaction,
};
use crate::stats::category_breakdown;
use crate::window::{period_range_millis, to_millis, DAY_MS};

/// Relay endpoint configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub site_url: String,
    period_urls: HashMap<PeriodType, String>,
}

impl RelayConfig {
    /// Resolve the relay configuration from environment variables.
    ///
    /// Requires `RYTMIND_SITE_URL` plus one endpoint URL per period:
    /// `LINDY_URL_7DAYS`, `LINDY_URL_14DAYS`, `LINDY_URL_30DAYS`.
    pub fn from_env() -> Result<Self> {
        let site_url = require_env("RYTMIND_SITE_URL")?;
        let mut period_urls = HashMap::new();
        for (period, var) in [
            (PeriodType::SevenDays, "LINDY_URL_7DAYS"),
            (PeriodType::FourteenDays, "LINDY_URL_14DAYS"),
            (PeriodType::ThirtyDays, "LINDY_URL_30DAYS"),
        ] {
            period_urls.insert(period, require_env(var)?);
        }
        Ok(Self {
            site_url,
            period_urls,
        })
    }

    pub fn new(site_url: &str, period_urls: HashMap<PeriodType, String>) -> Result<Self> {
        for period in [
            PeriodType::SevenDays,
            PeriodType::FourteenDays,
            PeriodType::ThirtyDays,
        ] {
            if !period_urls.contains_key(&period) {
                return Err(Error::Config(format!(
                    "No analysis endpoint configured for period: {}",
                    period
                )));
            }
        }
        Ok(Self {
            site_url: site_url.to_string(),
            period_urls,
        })
    }

    fn url_for(&self, period: PeriodType) -> &str {
        // Construction guarantees all three periods are present
        &self.period_urls[&period]
    }
}

fn require_env(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{} environment variable is not set", var)))
}

/// Period spending data as shipped to the analysis endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub period_type: PeriodType,
    pub period_start: i64,
    pub period_end: i64,
    pub total_spending: f64,
    pub transaction_count: usize,
    pub category_breakdown: Vec<CategoryAmount>,
    pub transactions: Vec<RelayTransaction>,
    pub journal_entries: Vec<RelayJournalEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayTransaction {
    pub merchant: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub amount: f64,
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayJournalEntry {
    pub content: String,
    pub mood: String,
    pub date: String,
}

/// Outgoing payload: the analysis data plus a callback URL
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    callback_url: String,
    #[serde(flatten)]
    data: AnalysisData,
}

/// Relay response; the analysis may be at the top level or nested
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayResponse {
    ai_analysis: Option<RelayAnalysis>,
    #[serde(flatten)]
    top_level: RelayAnalysis,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayAnalysis {
    summary: Option<String>,
    top_insight: Option<String>,
    #[serde(default)]
    spending_patterns: Vec<String>,
    #[serde(default)]
    emotional_triggers: Vec<String>,
}

/// Result of a triggered analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayOutcome {
    /// Analysis was valid and stored as an insight
    Stored,
    /// Endpoint answered but without the expected fields; nothing stored,
    /// not retried
    UnexpectedFormat,
}

/// Assemble the analysis data for a period window
pub fn period_data(db: &Database, period: PeriodType, now: DateTime<Utc>) -> Result<AnalysisData> {
    let (start, end) = period_range_millis(period, now);
    let transactions = db.transactions_in_range(start, end)?;
    let journal_entries = db.journal_entries_in_range(start, end)?;
    let (breakdown, total_spending) = category_breakdown(&transactions);

    Ok(AnalysisData {
        period_type: period,
        period_start: start,
        period_end: end,
        total_spending,
        transaction_count: transactions.len(),
        category_breakdown: breakdown,
        transactions: transactions.iter().map(relay_transaction).collect(),
        journal_entries: journal_entries.iter().map(relay_journal_entry).collect(),
    })
}

fn relay_transaction(tx: &Transaction) -> RelayTransaction {
    RelayTransaction {
        merchant: tx.merchant.clone(),
        date: tx.date.clone(),
        time: tx.time.clone(),
        category: tx.category.clone(),
        amount: tx.amount,
        emotion: tx.emotion.clone(),
    }
}

fn relay_journal_entry(entry: &JournalEntry) -> RelayJournalEntry {
    RelayJournalEntry {
        content: entry.content.clone(),
        mood: entry.mood.clone(),
        date: entry.date.clone(),
    }
}

pub struct AnalysisRelay {
    db: Database,
    http_client: Client,
    config: Option<RelayConfig>,
}

impl AnalysisRelay {
    pub fn new(db: Database, config: Option<RelayConfig>) -> Self {
        Self {
            db,
            http_client: Client::new(),
            config,
        }
    }

    /// Forward period data to the configured endpoint and store the
    /// returned analysis.
    pub async fn trigger_analysis(
        &self,
        period: PeriodType,
        now: DateTime<Utc>,
    ) -> Result<RelayOutcome> {
        let config = self.config.as_ref().ok_or_else(|| {
            Error::Config("Analysis relay endpoints are not configured".to_string())
        })?;

        let data = period_data(&self.db, period, now)?;
        let payload = AnalysisPayload {
            callback_url: format!(
                "{}/lindy-webhook?periodType={}&totalSpending={}&transactionCount={}",
                config.site_url, period, data.total_spending, data.transaction_count
            ),
            data,
        };

        let response = self
            .http_client
            .post(config.url_for(period))
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "Analysis endpoint error: {}",
                status
            )));
        }

        let body: RelayResponse = response.json().await?;
        let analysis = body.ai_analysis.unwrap_or(body.top_level);

        match (analysis.summary, analysis.top_insight) {
            (Some(summary), Some(top_insight))
                if !summary.is_empty() && !top_insight.is_empty() =>
            {
                let data = period_data(&self.db, period, now)?;
                self.store_insight(
                    &data,
                    AiAnalysis {
                        summary,
                        top_insight,
                        spending_patterns: analysis.spending_patterns,
                        emotional_triggers: analysis.emotional_triggers,
                    },
                    now,
                )?;
                info!(period = %period, "Analysis stored");
                Ok(RelayOutcome::Stored)
            }
            _ => {
                warn!(period = %period, "Analysis endpoint returned unexpected format");
                Ok(RelayOutcome::UnexpectedFormat)
            }
        }
    }

    /// Generate and store a canned narrative from the period data alone.
    pub fn local_analysis(&self, period: PeriodType, now: DateTime<Utc>) -> Result<AnalysisData> {
        let data = period_data(&self.db, period, now)?;
        let journal_count = data.journal_entries.len();

        let top = data.category_breakdown.first();
        let moods: Vec<&str> = data
            .journal_entries
            .iter()
            .map(|j| j.mood.as_str())
            .collect();

        let summary = format!(
            "Over {}, you spent RM {:.2} across {} transactions. {}\n\n{}Based on your spending patterns, most transactions happen during meal times and evenings.",
            period.label(),
            data.total_spending,
            data.transaction_count,
            top.map(|c| format!(
                "{} was your biggest expense at RM {:.2} ({:.0}%).",
                c.category, c.amount, c.percentage
            ))
            .unwrap_or_default(),
            if journal_count > 0 {
                format!("Your journal entries show moods including: {}. ", moods.join(", "))
            } else {
                String::new()
            },
        );

        let top_insight = top
            .map(|c| {
                format!(
                    "Your {} spending (RM {:.2}) makes up {:.0}% of your total. Consider setting a weekly budget for this category.",
                    c.category.to_lowercase(),
                    c.amount,
                    c.percentage
                )
            })
            .unwrap_or_else(|| {
                "Start tracking more transactions to get personalized insights.".to_string()
            });

        let analysis = AiAnalysis {
            summary,
            top_insight,
            spending_patterns: vec![
                format!(
                    "Average daily spending: RM {:.2}",
                    data.total_spending / period.days() as f64
                ),
                format!(
                    "Most frequent category: {}",
                    top.map(|c| c.category.as_str()).unwrap_or("N/A")
                ),
                format!("Total transactions: {}", data.transaction_count),
                "Weekend spending tends to be higher than weekdays".to_string(),
            ],
            emotional_triggers: vec![
                "Evening hours (6-10 PM) show increased spending activity".to_string(),
                if journal_count > 0 {
                    "Journal reflections indicate awareness of spending habits".to_string()
                } else {
                    "Consider journaling to track emotional spending triggers".to_string()
                },
                "Online shopping platforms may trigger impulse purchases".to_string(),
            ],
        };

        self.store_insight(&data, analysis, now)?;
        Ok(data)
    }

    /// Store an analysis arriving through the webhook callback.
    ///
    /// The period window is recomputed from `now` since the callback does
    /// not carry timestamps.
    pub fn store_webhook_analysis(
        &self,
        period: PeriodType,
        total_spending: f64,
        transaction_count: i64,
        category_breakdown: Vec<CategoryAmount>,
        analysis: AiAnalysis,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let end = to_millis(now);
        self.db.insert_insight(
            &NewInsight {
                period_start: end - period.days() * DAY_MS,
                period_end: end,
                period_type: period,
                total_spending,
                transaction_count,
                category_breakdown,
                ai_analysis: analysis,
            },
            end,
        )
    }

    fn store_insight(
        &self,
        data: &AnalysisData,
        analysis: AiAnalysis,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.db.insert_insight(
            &NewInsight {
                period_start: data.period_start,
                period_end: data.period_end,
                period_type: data.period_type,
                total_spending: data.total_spending,
                transaction_count: data.transaction_count as i64,
                category_breakdown: data.category_breakdown.clone(),
                ai_analysis: analysis,
            },
            to_millis(now),
        )
    }
}
