//! Budget advisor prompt construction
//!
//! Pure string templating. Everything the model sees is assembled here:
//! the envelope, current-month spending, 90-day patterns with trend labels,
//! recent journal moods, and the fixed JSON schema instruction.

use std::collections::HashMap;
use std::fmt::Write;

use super::SpendingEnvelope;
use crate::models::{CategoryStat, JournalEntry, Transaction};
use crate::stats::spending_trend;

/// Journal entries included in the emotional-context section
const MAX_JOURNAL_ENTRIES: usize = 10;
/// Recent expenses included in the transaction listing
const MAX_RECENT_TRANSACTIONS: usize = 20;
/// Journal content is truncated to this many characters
const JOURNAL_SUMMARY_CHARS: usize = 100;

/// Emotion tags that mark a category as emotionally driven
const EMOTIONAL_TAGS: [&str; 2] = ["Impulse", "Waste"];

pub fn build_prompt(
    envelope: &SpendingEnvelope,
    current_spending: &HashMap<String, f64>,
    category_stats: &[CategoryStat],
    journal_entries: &[JournalEntry],
    recent_transactions: &[Transaction],
) -> String {
    let total_current: f64 = current_spending.values().sum();

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are an AI financial advisor helping create a personalized budget plan.\n"
    );

    let _ = writeln!(prompt, "USER FINANCIAL SITUATION:");
    let _ = writeln!(prompt, "- Monthly Income: RM {:.2}", envelope.income);
    let _ = writeln!(
        prompt,
        "- Savings Goal: RM {:.2} (over {} months)",
        envelope.savings_goal, envelope.duration_months
    );
    let _ = writeln!(
        prompt,
        "- Monthly Savings Needed: RM {:.2}",
        envelope.monthly_savings_needed
    );
    let _ = writeln!(
        prompt,
        "- Available for Monthly Spending: RM {:.2}\n",
        envelope.available_for_spending
    );

    let _ = writeln!(prompt, "CURRENT MONTH SPENDING (Real Data):");
    // Iterate via the sorted stats so the listing order is deterministic
    for stat in category_stats {
        let amount = current_spending.get(&stat.category).copied().unwrap_or(0.0);
        if amount > 0.0 {
            let percentage = if total_current > 0.0 {
                amount / total_current * 100.0
            } else {
                0.0
            };
            let _ = writeln!(
                prompt,
                "- {}: RM {:.2} ({:.1}% of current spending)",
                stat.category, amount, percentage
            );
        }
    }

    let _ = writeln!(prompt, "\nHISTORICAL SPENDING PATTERNS (Last 90 days):");
    for stat in category_stats {
        let trend = spending_trend(stat.current_month_spending, stat.monthly_average);
        let emotion = stat
            .dominant_emotion
            .as_deref()
            .map(|e| format!(", Emotion: {}", e))
            .unwrap_or_default();
        let _ = writeln!(
            prompt,
            "- {}: Avg RM {:.2}/month, Current: RM {:.2} ({} trend){}",
            stat.category, stat.monthly_average, stat.current_month_spending, trend, emotion
        );
    }

    let _ = writeln!(prompt, "\nEMOTIONAL CONTEXT:");
    if journal_entries.is_empty() {
        let _ = writeln!(prompt, "No recent journal entries");
    } else {
        let moods: Vec<&str> = journal_entries
            .iter()
            .take(MAX_JOURNAL_ENTRIES)
            .map(|j| j.mood.as_str())
            .collect();
        let _ = writeln!(prompt, "User's recent moods: {}", moods.join(", "));
        for entry in journal_entries.iter().take(MAX_JOURNAL_ENTRIES) {
            let summary: String = entry.content.chars().take(JOURNAL_SUMMARY_CHARS).collect();
            let _ = writeln!(prompt, "- [{}] {}: {}", entry.date, entry.mood, summary);
        }
    }

    let emotional_categories: Vec<&str> = category_stats
        .iter()
        .filter(|s| {
            s.dominant_emotion
                .as_deref()
                .is_some_and(|e| EMOTIONAL_TAGS.contains(&e))
        })
        .map(|s| s.category.as_str())
        .collect();
    if !emotional_categories.is_empty() {
        let _ = writeln!(
            prompt,
            "Categories with emotional spending: {}",
            emotional_categories.join(", ")
        );
    }

    let _ = writeln!(prompt, "\nRECENT TRANSACTIONS:");
    for tx in recent_transactions
        .iter()
        .filter(|t| t.amount < 0.0)
        .take(MAX_RECENT_TRANSACTIONS)
    {
        let emotion = tx
            .emotion
            .as_deref()
            .map(|e| format!(" [{}]", e))
            .unwrap_or_default();
        let _ = writeln!(
            prompt,
            "- {} | {} | RM {:.2} | {}{}",
            tx.date,
            tx.merchant,
            tx.amount.abs(),
            tx.category,
            emotion
        );
    }

    let _ = writeln!(
        prompt,
        r#"
TASK:
Generate a personalized budget plan that SCALES WITH INCOME:
1. **CRITICAL**: The user has RM {income:.2}/month income and RM {available:.2} available for spending after savings.
2. **IMPORTANT**: Budgets MUST scale proportionally with income. If income is high (RM 5k+), budgets should be higher. If income is low (RM 2k), budgets should be lower.
3. Use REAL current month spending as a baseline, but SCALE IT UP if income allows more spending.
4. For high income, allocate more generously to enjoyment categories while still meeting savings goals.
5. For low income, keep budgets closer to current spending to ensure savings goals are met.
6. Total of all category budgets MUST equal approximately RM {available:.2} (available for spending).
7. Allow flexibility for categories the user enjoys (Entertainment, Shopping) - give them MORE budget if income is high.
8. Keep essential categories (Bills, Transport, Food) reasonable but increase if income allows.
9. Consider emotional spending patterns.

SCALING RULES:
- If available spending (RM {available:.2}) is MUCH HIGHER than current spending (RM {current:.2}), scale budgets UP proportionally.
- If available spending is similar to current spending, keep budgets close to current spending with small buffers.
- Essential categories: Scale 1.0x to 1.2x of current spending based on income level.
- Enjoyment categories: Scale 1.1x to 1.5x of current spending if income allows.
- Other categories: Scale 1.05x to 1.3x based on income level.

For each category, provide:
- suggestedBudget: Realistic monthly budget that SCALES WITH INCOME. Higher income = higher budgets.
- flexibility: "high" (for enjoyment), "medium" (for others), or "low" (for essentials)
- reason: Brief explanation why this budget is recommended, mentioning income level
- tips: 2-3 actionable tips for managing this category

Return ONLY valid JSON in this exact format:
{{
  "budgets": [
    {{
      "category": "Food",
      "suggestedBudget": 600.00,
      "flexibility": "low",
      "reason": "Essential category - keeping close to current spending with small buffer",
      "tips": ["Meal prep to save money", "Track grocery spending weekly"],
      "isEssential": true,
      "isEnjoyment": false
    }}
  ],
  "insights": [
    "Your current spending is RM {current:.2} this month",
    "You have RM {remaining:.2} remaining for the rest of the month"
  ]
}}"#,
        income = envelope.income,
        available = envelope.available_for_spending,
        current = total_current,
        remaining = envelope.available_for_spending - total_current,
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(category: &str, monthly_average: f64, current: f64, emotion: Option<&str>) -> CategoryStat {
        CategoryStat {
            category: category.to_string(),
            total: monthly_average * 3.0,
            monthly_average,
            frequency: 5,
            percentage: 50.0,
            dominant_emotion: emotion.map(String::from),
            current_month_spending: current,
        }
    }

    #[test]
    fn test_prompt_embeds_envelope() {
        let envelope = SpendingEnvelope::new(3000.0, 6000.0, 12).unwrap();
        let prompt = build_prompt(&envelope, &HashMap::new(), &[], &[], &[]);
        assert!(prompt.contains("RM 3000.00"));
        assert!(prompt.contains("RM 500.00"));
        assert!(prompt.contains("RM 2500.00"));
        assert!(prompt.contains("No recent journal entries"));
    }

    #[test]
    fn test_prompt_flags_emotional_categories() {
        let envelope = SpendingEnvelope::new(3000.0, 0.0, 12).unwrap();
        let stats = vec![
            stat("Shopping", 200.0, 250.0, Some("Impulse")),
            stat("Food", 400.0, 300.0, Some("Necessary")),
        ];
        let prompt = build_prompt(&envelope, &HashMap::new(), &stats, &[], &[]);
        assert!(prompt.contains("Categories with emotional spending: Shopping"));
        assert!(prompt.contains("(increasing trend)"));
    }

    #[test]
    fn test_journal_content_truncated() {
        let envelope = SpendingEnvelope::new(3000.0, 0.0, 12).unwrap();
        let long_content = "x".repeat(300);
        let entries = vec![JournalEntry {
            id: 1,
            content: long_content,
            mood: "Anxious".to_string(),
            mood_emoji: "😟".to_string(),
            timestamp: 0,
            date: "Dec 6, 2024".to_string(),
            related_transaction_id: None,
        }];
        let prompt = build_prompt(&envelope, &HashMap::new(), &[], &entries, &[]);
        assert!(!prompt.contains(&"x".repeat(101)));
        assert!(prompt.contains(&"x".repeat(100)));
    }
}
