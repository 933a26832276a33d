//! Financial therapist chat
//!
//! Conversational flow grounded in the user's real data: each turn pulls
//! the latest insights for all three periods plus 30 days of transactions
//! and journals into the system prompt, then calls the advisor backend
//! with the last 20 messages of history. Backend failures never reach the
//! user as errors; a fixed supportive reply is stored and returned with
//! `success: false` instead.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::ai::{AdvisorBackend, AdvisorClient};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ChatRole, Insight, JournalEntry, PeriodType, Transaction};
use crate::window::{to_millis, DAY_MS};

/// History turns sent to the backend per request
const HISTORY_LIMIT: usize = 20;
/// Days of transactions and journals pulled into the system prompt
const CONTEXT_DAYS: i64 = 30;

const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble connecting right now. However, I can \
     see you've been tracking your spending. What would you like to discuss \
     about your financial habits?";

/// Reply to a chat turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub success: bool,
    pub message: String,
}

pub struct TherapistChat {
    db: Database,
    ai: AdvisorClient,
}

impl TherapistChat {
    pub fn new(db: Database, ai: AdvisorClient) -> Self {
        Self { db, ai }
    }

    /// Handle one chat turn: persist the user message, call the backend
    /// with full context, persist and return the reply.
    pub async fn send(&self, user_message: &str, now: DateTime<Utc>) -> Result<ChatReply> {
        let ts = to_millis(now);
        self.db
            .insert_chat_message(ChatRole::User, user_message, ts)?;

        let history = self.db.chat_history(HISTORY_LIMIT)?;
        let system = self.build_system_prompt(now)?;

        // History already contains the message stored above; the backend
        // gets it once, as the current turn.
        let prior = &history[..history.len().saturating_sub(1)];

        match self.ai.chat(&system, prior, user_message).await {
            Ok(reply) => {
                self.db
                    .insert_chat_message(ChatRole::Assistant, &reply, to_millis(now))?;
                Ok(ChatReply {
                    success: true,
                    message: reply,
                })
            }
            Err(err) => {
                warn!(error = %err, "Therapist chat backend failed, using fallback reply");
                self.db
                    .insert_chat_message(ChatRole::Assistant, FALLBACK_REPLY, to_millis(now))?;
                Ok(ChatReply {
                    success: false,
                    message: FALLBACK_REPLY.to_string(),
                })
            }
        }
    }

    fn build_system_prompt(&self, now: DateTime<Utc>) -> Result<String> {
        let end = to_millis(now);
        let start = end - CONTEXT_DAYS * DAY_MS;
        let transactions = self.db.transactions_in_range(start, end)?;
        let journals = self.db.journal_entries_in_range(start, end)?;

        let mut prompt = String::from(
            "You are a compassionate Financial Therapist AI for RytMind, an app that \
             helps users understand their emotional relationship with money.\n\n\
             YOUR ROLE:\n\
             - Help users understand their spending habits and financial patterns\n\
             - Provide emotional support around money-related stress and anxiety\n\
             - Give actionable advice based on their ACTUAL spending data\n\
             - ONLY answer questions about:\n  \
             1. Financial matters (spending, budgeting, saving, money management)\n  \
             2. Mental health related to finances (financial stress, emotional spending, money anxiety)\n\n\
             If the user asks about anything else (unrelated topics), politely redirect \
             them back to financial wellness.\n\n\
             USER'S SPENDING DATA:\n",
        );

        for (period, heading) in [
            (PeriodType::SevenDays, "LAST 7 DAYS"),
            (PeriodType::FourteenDays, "LAST 14 DAYS"),
            (PeriodType::ThirtyDays, "LAST 30 DAYS"),
        ] {
            let _ = writeln!(prompt, "\n{}:", heading);
            match self.db.latest_insight(period)? {
                Some(insight) => append_insight(&mut prompt, &insight),
                None => {
                    let _ = writeln!(prompt, "No data available");
                }
            }
        }

        let _ = writeln!(prompt, "\nRECENT TRANSACTIONS:");
        for tx in transactions.iter().take(5) {
            append_transaction(&mut prompt, tx);
        }

        let _ = writeln!(prompt, "\nRECENT JOURNAL ENTRIES:");
        if journals.is_empty() {
            let _ = writeln!(prompt, "No journal entries yet");
        } else {
            for entry in journals.iter().take(3) {
                append_journal(&mut prompt, entry);
            }
        }

        prompt.push_str(
            "\nRESPONSE GUIDELINES:\n\
             1. Be warm, empathetic, and non-judgmental\n\
             2. Reference their ACTUAL spending data in your responses\n\
             3. Compare trends across time periods (7d vs 14d vs 30d)\n\
             4. Connect emotional triggers to spending behavior\n\
             5. Give specific, actionable advice\n\
             6. **KEEP RESPONSES UNDER 256 WORDS - BE CONCISE AND FOCUSED**\n\
             7. Keep responses 2-3 short paragraphs maximum\n\
             8. Ask thoughtful follow-up questions\n\
             9. Celebrate positive changes\n\
             10. If question is off-topic, say: \"I'm here specifically to help with \
             your financial wellness and money-related concerns. Could we talk about \
             your spending or financial goals instead?\"",
        );

        Ok(prompt)
    }
}

fn append_insight(prompt: &mut String, insight: &Insight) {
    let _ = writeln!(
        prompt,
        "- Total Spending: RM {:.2}",
        insight.total_spending
    );
    let _ = writeln!(prompt, "- Transactions: {}", insight.transaction_count);
    let top: Vec<String> = insight
        .category_breakdown
        .iter()
        .take(3)
        .map(|c| format!("{} (RM {:.2})", c.category, c.amount))
        .collect();
    let _ = writeln!(prompt, "- Top Categories: {}", top.join(", "));
    if !insight.ai_analysis.top_insight.is_empty() {
        let _ = writeln!(prompt, "- Key Insight: {}", insight.ai_analysis.top_insight);
    }
    if !insight.ai_analysis.spending_patterns.is_empty() {
        let _ = writeln!(
            prompt,
            "- Patterns: {}",
            insight.ai_analysis.spending_patterns.join("; ")
        );
    }
    if !insight.ai_analysis.emotional_triggers.is_empty() {
        let _ = writeln!(
            prompt,
            "- Emotional Triggers: {}",
            insight.ai_analysis.emotional_triggers.join("; ")
        );
    }
}

fn append_transaction(prompt: &mut String, tx: &Transaction) {
    let emotion = tx
        .emotion
        .as_deref()
        .map(|e| format!(", felt: {}", e))
        .unwrap_or_default();
    let _ = writeln!(
        prompt,
        "- {}: RM {:.2} ({}{})",
        tx.merchant,
        tx.amount.abs(),
        tx.category,
        emotion
    );
}

fn append_journal(prompt: &mut String, entry: &JournalEntry) {
    let _ = writeln!(
        prompt,
        "- {}: {} - \"{}\"",
        entry.date, entry.mood, entry.content
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{AiAnalysis, CategoryAmount, NewInsight, NewTransaction};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 6, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_send_persists_both_sides() {
        let db = Database::in_memory().unwrap();
        let chat = TherapistChat::new(
            db.clone(),
            AdvisorClient::Mock(MockBackend::with_response("You're doing well.")),
        );

        let reply = chat.send("Am I overspending?", fixed_now()).await.unwrap();
        assert!(reply.success);
        assert_eq!(reply.message, "You're doing well.");

        let history = db.chat_history(10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "Am I overspending?");
        assert_eq!(history[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_system_prompt_reflects_data() {
        let now = fixed_now();
        let db = Database::in_memory().unwrap();
        db.insert_transaction(&NewTransaction {
            merchant: "Grab".to_string(),
            date: "Dec 5, 2024".to_string(),
            time: "8:00 AM".to_string(),
            timestamp: to_millis(now) - DAY_MS,
            category: "Transport".to_string(),
            amount: -25.0,
            emotion: Some("Necessary".to_string()),
            emotion_emoji: None,
            notes: None,
        })
        .unwrap();
        db.insert_insight(
            &NewInsight {
                period_start: 0,
                period_end: to_millis(now),
                period_type: PeriodType::SevenDays,
                total_spending: 25.0,
                transaction_count: 1,
                category_breakdown: vec![CategoryAmount {
                    category: "Transport".to_string(),
                    amount: 25.0,
                    percentage: 100.0,
                }],
                ai_analysis: AiAnalysis {
                    summary: "Mostly commuting".to_string(),
                    top_insight: "Transport dominates".to_string(),
                    spending_patterns: vec![],
                    emotional_triggers: vec![],
                },
            },
            to_millis(now),
        )
        .unwrap();

        let chat = TherapistChat::new(db, AdvisorClient::mock());
        let prompt = chat.build_system_prompt(now).unwrap();
        assert!(prompt.contains("Grab: RM 25.00 (Transport, felt: Necessary)"));
        assert!(prompt.contains("Key Insight: Transport dominates"));
        assert!(prompt.contains("No journal entries yet"));
        // 14/30 day sections have no insight
        assert!(prompt.contains("No data available"));
    }

    #[tokio::test]
    async fn test_backend_failure_gets_fallback_reply() {
        // Gemini backend with an empty key fails before any network call
        let db = Database::in_memory().unwrap();
        let chat = TherapistChat::new(db.clone(), AdvisorClient::gemini(""));

        let reply = chat.send("hello", fixed_now()).await.unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message, FALLBACK_REPLY);

        // Fallback reply is persisted like any other assistant turn
        let history = db.chat_history(10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, FALLBACK_REPLY);
    }
}
