//! AI budget response parsing and reconciliation
//!
//! The model is asked for raw JSON but frequently wraps it in Markdown
//! fences. Extraction tries a "```json" fence, then a plain fence, then a
//! greedy brace match over the whole text. The decoded payload then goes
//! through two named steps: default filling and envelope reconciliation.

use std::collections::HashMap;

use serde::Deserialize;

use super::SpendingEnvelope;
use crate::error::{Error, Result};
use crate::models::{BudgetRecommendation, Flexibility};

/// Budget entry as the model returns it, before defaults are filled
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBudget {
    category: String,
    #[serde(default)]
    suggested_budget: f64,
    #[serde(default)]
    flexibility: Option<Flexibility>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    tips: Option<Vec<String>>,
    #[serde(default)]
    is_essential: Option<bool>,
    #[serde(default)]
    is_enjoyment: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    budgets: Option<serde_json::Value>,
    #[serde(default)]
    insights: Vec<String>,
}

/// Decoded model response after default filling
#[derive(Debug)]
pub struct AiBudgetResponse {
    pub budgets: Vec<BudgetRecommendation>,
    pub insights: Vec<String>,
}

fn fenced_block<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let start = text.find(fence)? + fence.len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Extract the JSON payload from model text
fn extract_json(text: &str) -> Result<serde_json::Value> {
    if let Some(block) = fenced_block(text, "```json") {
        if let Ok(value) = serde_json::from_str(block) {
            return Ok(value);
        }
    }
    if let Some(block) = fenced_block(text, "```") {
        if let Ok(value) = serde_json::from_str(block) {
            return Ok(value);
        }
    }
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }
    // Greedy brace match as the last resort
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&text[start..=end]) {
                return Ok(value);
            }
        }
    }
    Err(Error::InvalidData(
        "No JSON found in AI budget response".to_string(),
    ))
}

/// Default-filling step: raw model entries become complete recommendations
fn fill_defaults(raw: RawBudget) -> BudgetRecommendation {
    BudgetRecommendation {
        category: raw.category,
        suggested_budget: raw.suggested_budget,
        current_spending: 0.0,
        flexibility: raw.flexibility.unwrap_or_default(),
        reason: raw.reason.unwrap_or_else(|| {
            "AI-generated recommendation based on your spending patterns.".to_string()
        }),
        tips: raw.tips.unwrap_or_default(),
        is_essential: raw.is_essential.unwrap_or(false),
        is_enjoyment: raw.is_enjoyment.unwrap_or(false),
    }
}

/// Parse model text into a budget response, filling defaults.
pub fn parse_budget_response(text: &str) -> Result<AiBudgetResponse> {
    let value = extract_json(text)?;
    let plan: RawPlan = serde_json::from_value(value)?;

    let budgets_value = plan.budgets.ok_or_else(|| {
        Error::InvalidData("AI budget response has no budgets field".to_string())
    })?;
    if !budgets_value.is_array() {
        return Err(Error::InvalidData(
            "AI budget response budgets field is not an array".to_string(),
        ));
    }
    let raw_budgets: Vec<RawBudget> = serde_json::from_value(budgets_value)?;

    Ok(AiBudgetResponse {
        budgets: raw_budgets.into_iter().map(fill_defaults).collect(),
        insights: plan.insights,
    })
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reconcile budgets against the envelope.
///
/// If the suggested total exceeds the available-for-spending amount, every
/// budget is scaled by the same factor; nothing is protected, including
/// low-flexibility essentials. A set already within the envelope passes
/// through unchanged apart from cent rounding. Real current-month spending
/// is attached per category, defaulting to 0 for unseen categories.
pub fn reconcile(
    budgets: &mut Vec<BudgetRecommendation>,
    envelope: &SpendingEnvelope,
    current_spending: &HashMap<String, f64>,
) {
    let total: f64 = budgets.iter().map(|b| b.suggested_budget).sum();
    let scale = if total > envelope.available_for_spending && total > 0.0 {
        envelope.available_for_spending / total
    } else {
        1.0
    };

    for budget in budgets.iter_mut() {
        budget.suggested_budget = round_cents(budget.suggested_budget * scale);
        budget.current_spending = round_cents(
            current_spending
                .get(&budget.category)
                .copied()
                .unwrap_or(0.0),
        );
    }
}

/// Insights when the model supplied none
pub fn default_insights(total_current_spending: f64) -> Vec<String> {
    vec![
        "AI analyzed your spending and created a personalized budget plan.".to_string(),
        format!(
            "Current month spending: RM {:.2}",
            total_current_spending
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "budgets": [
            {"category": "Food", "suggestedBudget": 600.0, "flexibility": "low"},
            {"category": "Shopping", "suggestedBudget": 300.0}
        ],
        "insights": ["Watch weekend spending"]
    }"#;

    #[test]
    fn test_fence_variants_parse_identically() {
        let raw = parse_budget_response(PAYLOAD).unwrap();
        let json_fenced =
            parse_budget_response(&format!("Here you go:\n```json\n{}\n```", PAYLOAD)).unwrap();
        let plain_fenced =
            parse_budget_response(&format!("```\n{}\n```", PAYLOAD)).unwrap();

        for parsed in [&raw, &json_fenced, &plain_fenced] {
            assert_eq!(parsed.budgets.len(), 2);
            assert_eq!(parsed.budgets[0].category, "Food");
            assert_eq!(parsed.budgets[0].suggested_budget, 600.0);
            assert_eq!(parsed.insights, vec!["Watch weekend spending"]);
        }
    }

    #[test]
    fn test_brace_match_fallback() {
        let text = format!("The plan is as follows. {} Hope that helps!", PAYLOAD);
        let parsed = parse_budget_response(&text).unwrap();
        assert_eq!(parsed.budgets.len(), 2);
    }

    #[test]
    fn test_no_json_is_invalid_data() {
        assert!(matches!(
            parse_budget_response("I cannot help with that."),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_missing_budgets_field_rejected() {
        assert!(matches!(
            parse_budget_response(r#"{"insights": ["a"]}"#),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_defaults_filled() {
        let parsed = parse_budget_response(PAYLOAD).unwrap();
        let shopping = &parsed.budgets[1];
        assert_eq!(shopping.flexibility, Flexibility::Medium);
        assert!(!shopping.reason.is_empty());
        assert!(shopping.tips.is_empty());
        assert!(!shopping.is_essential);
    }

    fn budget(category: &str, amount: f64) -> BudgetRecommendation {
        BudgetRecommendation {
            category: category.to_string(),
            suggested_budget: amount,
            current_spending: 0.0,
            flexibility: Flexibility::Medium,
            reason: String::new(),
            tips: vec![],
            is_essential: false,
            is_enjoyment: false,
        }
    }

    #[test]
    fn test_reconcile_scales_down_proportionally() {
        let envelope = SpendingEnvelope::new(3000.0, 6000.0, 12).unwrap();
        let mut budgets = vec![budget("Food", 1800.0), budget("Shopping", 1200.0)];
        reconcile(&mut budgets, &envelope, &HashMap::new());

        let total: f64 = budgets.iter().map(|b| b.suggested_budget).sum();
        assert!((total - 2500.0).abs() < 0.05);
        // 60/40 split preserved
        assert!((budgets[0].suggested_budget - 1500.0).abs() < 0.05);
        assert!((budgets[1].suggested_budget - 1000.0).abs() < 0.05);
    }

    #[test]
    fn test_reconcile_noop_within_envelope() {
        let envelope = SpendingEnvelope::new(3000.0, 6000.0, 12).unwrap();
        let mut budgets = vec![budget("Food", 800.0), budget("Shopping", 400.0)];
        reconcile(&mut budgets, &envelope, &HashMap::new());
        assert_eq!(budgets[0].suggested_budget, 800.0);
        assert_eq!(budgets[1].suggested_budget, 400.0);
    }

    #[test]
    fn test_reconcile_attaches_current_spending() {
        let envelope = SpendingEnvelope::new(3000.0, 0.0, 12).unwrap();
        let current: HashMap<String, f64> = [("Food".to_string(), 312.345)].into();
        let mut budgets = vec![budget("Food", 500.0), budget("Transport", 100.0)];
        reconcile(&mut budgets, &envelope, &current);
        assert_eq!(budgets[0].current_spending, 312.35);
        assert_eq!(budgets[1].current_spending, 0.0);
    }
}
