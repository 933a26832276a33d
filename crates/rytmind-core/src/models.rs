//! Domain models for RytMind

use serde::{Deserialize, Serialize};

/// A logged spending or income event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub merchant: String,
    /// Display date, e.g. "Dec 6, 2024"
    pub date: String,
    /// Display time, e.g. "10:30 AM"
    pub time: String,
    /// Unix timestamp in milliseconds; authoritative for range queries
    pub timestamp: i64,
    pub category: String,
    /// Negative for expenses, positive for income
    pub amount: f64,
    /// Set once emotion or receipt metadata has been attached
    pub processed: bool,
    /// "Impulse", "Necessary", "Planned", "Waste" - free-form, not enumerated
    pub emotion: Option<String>,
    pub emotion_emoji: Option<String>,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
}

/// Transaction data for insertion (id assigned by the store)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub merchant: String,
    pub date: String,
    pub time: String,
    pub timestamp: i64,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub emotion_emoji: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A free-text reflection on spending, tagged with a mood
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: i64,
    pub content: String,
    pub mood: String,
    pub mood_emoji: String,
    pub timestamp: i64,
    pub date: String,
    /// Weak reference: deleting the transaction does not cascade
    pub related_transaction_id: Option<i64>,
}

/// Journal entry data for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalEntry {
    pub content: String,
    pub mood: String,
    pub mood_emoji: String,
    pub timestamp: i64,
    pub date: String,
    #[serde(default)]
    pub related_transaction_id: Option<i64>,
}

/// Partial update for a journal entry; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalPatch {
    pub content: Option<String>,
    pub mood: Option<String>,
    pub mood_emoji: Option<String>,
}

/// Analysis window identifiers used by the insight store and relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "14days")]
    FourteenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "7days",
            Self::FourteenDays => "14days",
            Self::ThirtyDays => "30days",
        }
    }

    /// Window length in days
    pub fn days(&self) -> i64 {
        match self {
            Self::SevenDays => 7,
            Self::FourteenDays => 14,
            Self::ThirtyDays => 30,
        }
    }

    /// Human-readable window label for narrative text
    pub fn label(&self) -> &'static str {
        match self {
            Self::SevenDays => "this week",
            Self::FourteenDays => "the past 2 weeks",
            Self::ThirtyDays => "this month",
        }
    }

    /// Parse a period string, falling back to the 7-day window on
    /// unrecognized input.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or(Self::SevenDays)
    }
}

impl std::str::FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "7days" => Ok(Self::SevenDays),
            "14days" => Ok(Self::FourteenDays),
            "30days" => Ok(Self::ThirtyDays),
            _ => Err(format!("Unknown period type: {}", s)),
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category spending share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

/// Per-emotion spending share over processed transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAmount {
    pub emotion: String,
    pub count: usize,
    pub amount: f64,
    pub percentage: f64,
}

/// Aggregated spending statistics for a time range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingStats {
    pub total_spending: f64,
    pub transaction_count: usize,
    pub processed_count: usize,
    pub category_breakdown: Vec<CategoryAmount>,
    pub emotion_breakdown: Vec<EmotionAmount>,
}

/// Narrative analysis attached to an insight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub summary: String,
    pub top_insight: String,
    #[serde(default)]
    pub spending_patterns: Vec<String>,
    #[serde(default)]
    pub emotional_triggers: Vec<String>,
}

/// A stored spending insight for one analysis window
///
/// The store is append-only; the "latest" insight for a period is the one
/// with the greatest `generated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: i64,
    pub period_start: i64,
    pub period_end: i64,
    pub period_type: PeriodType,
    pub total_spending: f64,
    pub transaction_count: i64,
    pub category_breakdown: Vec<CategoryAmount>,
    pub ai_analysis: AiAnalysis,
    pub generated_at: i64,
}

/// Insight data for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsight {
    pub period_start: i64,
    pub period_end: i64,
    pub period_type: PeriodType,
    pub total_spending: f64,
    pub transaction_count: i64,
    pub category_breakdown: Vec<CategoryAmount>,
    pub ai_analysis: AiAnalysis,
}

/// Speaker in the therapist chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("Unknown chat role: {}", s)),
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored therapist chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: i64,
}

/// How much latitude a category budget has relative to strict necessity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flexibility {
    High,
    #[default]
    Medium,
    Low,
}

impl Flexibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Flexibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived per-category statistics over the 90-day history window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: String,
    /// Total spending over the history window
    pub total: f64,
    /// Window total divided by the assumed month count (90 days = 3 months)
    pub monthly_average: f64,
    /// Number of expense transactions in the window
    pub frequency: usize,
    /// Share of total historical spending
    pub percentage: f64,
    /// Most frequent non-empty emotion tag; None when nothing is tagged
    pub dominant_emotion: Option<String>,
    pub current_month_spending: f64,
}

/// A single category budget recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecommendation {
    pub category: String,
    pub suggested_budget: f64,
    pub current_spending: f64,
    pub flexibility: Flexibility,
    pub reason: String,
    pub tips: Vec<String>,
    pub is_essential: bool,
    pub is_enjoyment: bool,
}
