//! Deterministic local budget heuristic
//!
//! Used whenever the AI path fails. Scales each category's baseline (real
//! current-month spend, else the 90-day monthly average) by a class-specific
//! factor, then reconciles against the envelope. Never calls the network.

use std::collections::HashMap;

use super::response::{reconcile, round_cents};
use super::SpendingEnvelope;
use crate::models::{BudgetRecommendation, CategoryStat, Flexibility};

const ESSENTIAL_CATEGORIES: [&str; 3] = ["Bills", "Transport", "Food"];
const ENJOYMENT_CATEGORIES: [&str; 2] = ["Entertainment", "Shopping"];

/// Income above this gets the more generous scaling formulas
const HIGH_INCOME_THRESHOLD: f64 = 4000.0;
/// Cap on the income scale factor to avoid runaway scaling
const MAX_INCOME_SCALE: f64 = 2.0;

/// Generate budgets from spending history alone.
///
/// Produces one recommendation per category in `category_stats`; empty
/// stats yield an empty list.
pub fn fallback_budgets(
    envelope: &SpendingEnvelope,
    category_stats: &[CategoryStat],
    current_spending: &HashMap<String, f64>,
) -> Vec<BudgetRecommendation> {
    let total_current: f64 = current_spending.values().sum();
    let income_scale = if total_current > 0.0 {
        (envelope.available_for_spending / total_current).min(MAX_INCOME_SCALE)
    } else {
        1.0
    };
    let high_income = envelope.income > HIGH_INCOME_THRESHOLD;

    let mut budgets: Vec<BudgetRecommendation> = category_stats
        .iter()
        .map(|stat| {
            let current = stat.current_month_spending;
            let base = if current > 0.0 {
                current
            } else {
                stat.monthly_average
            };
            let is_essential = ESSENTIAL_CATEGORIES.contains(&stat.category.as_str());
            let is_enjoyment = ENJOYMENT_CATEGORIES.contains(&stat.category.as_str());

            let (scale, flexibility, reason, tips) = if is_essential {
                let scale = if high_income {
                    (income_scale * 1.1).min(1.3)
                } else {
                    1.1
                };
                let suggested = base * scale;
                (
                    scale,
                    Flexibility::Low,
                    format!(
                        "Based on your RM {:.2}/month income and current spending of RM {:.2}, we recommend RM {:.2}/month for this essential category.",
                        envelope.income, current, suggested
                    ),
                    vec![
                        "Track bills closely to avoid surprises".to_string(),
                        "Set up auto-payments for consistency".to_string(),
                    ],
                )
            } else if is_enjoyment {
                let scale = if high_income {
                    (income_scale * 1.3).min(1.8)
                } else {
                    1.2
                };
                let suggested = base * scale;
                (
                    scale,
                    Flexibility::High,
                    format!(
                        "With RM {:.2}/month income, we suggest RM {:.2}/month here (current: RM {:.2}) to enjoy yourself while staying on track.",
                        envelope.income, suggested, current
                    ),
                    vec![
                        "Treat yourself, but set weekly limits".to_string(),
                        "Look for deals and discounts".to_string(),
                    ],
                )
            } else {
                let scale = if high_income {
                    (income_scale * 1.2).min(1.5)
                } else {
                    1.15
                };
                let suggested = base * scale;
                (
                    scale,
                    Flexibility::Medium,
                    format!(
                        "Based on your RM {:.2}/month income, we recommend RM {:.2}/month for this category (current: RM {:.2}).",
                        envelope.income, suggested, current
                    ),
                    vec!["Review monthly to adjust as needed".to_string()],
                )
            };

            BudgetRecommendation {
                category: stat.category.clone(),
                suggested_budget: round_cents(base * scale),
                current_spending: round_cents(current),
                flexibility,
                reason,
                tips,
                is_essential,
                is_enjoyment,
            }
        })
        .collect();

    reconcile(&mut budgets, envelope, current_spending);
    budgets
}

/// Insight strings for the fallback path
pub fn fallback_insights(envelope: &SpendingEnvelope, total_current_spending: f64) -> Vec<String> {
    vec![
        "Generated budget recommendations based on your real spending data.".to_string(),
        format!("Current month spending: RM {:.2}", total_current_spending),
        format!(
            "Available for rest of month: RM {:.2}",
            envelope.available_for_spending - total_current_spending
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(category: &str, monthly_average: f64, current: f64) -> CategoryStat {
        CategoryStat {
            category: category.to_string(),
            total: monthly_average * 3.0,
            monthly_average,
            frequency: 4,
            percentage: 0.0,
            dominant_emotion: None,
            current_month_spending: current,
        }
    }

    #[test]
    fn test_nonempty_whenever_history_exists() {
        let envelope = SpendingEnvelope::new(3000.0, 6000.0, 12).unwrap();
        let stats = vec![stat("Food", 400.0, 0.0)];
        let budgets = fallback_budgets(&envelope, &stats, &HashMap::new());
        assert_eq!(budgets.len(), 1);
        assert!(budgets[0].suggested_budget > 0.0);
    }

    #[test]
    fn test_classification_and_flexibility() {
        let envelope = SpendingEnvelope::new(3000.0, 0.0, 12).unwrap();
        let stats = vec![
            stat("Food", 400.0, 300.0),
            stat("Shopping", 200.0, 150.0),
            stat("Health", 100.0, 50.0),
        ];
        let current: HashMap<String, f64> = [
            ("Food".to_string(), 300.0),
            ("Shopping".to_string(), 150.0),
            ("Health".to_string(), 50.0),
        ]
        .into();
        let budgets = fallback_budgets(&envelope, &stats, &current);

        let food = budgets.iter().find(|b| b.category == "Food").unwrap();
        assert!(food.is_essential && !food.is_enjoyment);
        assert_eq!(food.flexibility, Flexibility::Low);

        let shopping = budgets.iter().find(|b| b.category == "Shopping").unwrap();
        assert!(shopping.is_enjoyment);
        assert_eq!(shopping.flexibility, Flexibility::High);

        let health = budgets.iter().find(|b| b.category == "Health").unwrap();
        assert!(!health.is_essential && !health.is_enjoyment);
        assert_eq!(health.flexibility, Flexibility::Medium);
    }

    #[test]
    fn test_low_income_uses_flat_multipliers() {
        // income 3000 <= 4000 threshold: Food scales by exactly 1.1
        let envelope = SpendingEnvelope::new(3000.0, 0.0, 12).unwrap();
        let stats = vec![stat("Food", 400.0, 500.0)];
        let current: HashMap<String, f64> = [("Food".to_string(), 500.0)].into();
        let budgets = fallback_budgets(&envelope, &stats, &current);
        assert!((budgets[0].suggested_budget - 550.0).abs() < 0.01);
    }

    #[test]
    fn test_high_income_caps_apply() {
        // income 10000, tiny spending: income_scale hits the 2.0 cap, then
        // the per-class caps bound the final multipliers
        let envelope = SpendingEnvelope::new(10000.0, 0.0, 12).unwrap();
        let stats = vec![stat("Food", 100.0, 100.0), stat("Shopping", 100.0, 100.0)];
        let current: HashMap<String, f64> = [
            ("Food".to_string(), 100.0),
            ("Shopping".to_string(), 100.0),
        ]
        .into();
        let budgets = fallback_budgets(&envelope, &stats, &current);
        let food = budgets.iter().find(|b| b.category == "Food").unwrap();
        let shopping = budgets.iter().find(|b| b.category == "Shopping").unwrap();
        assert!((food.suggested_budget - 130.0).abs() < 0.01);
        assert!((shopping.suggested_budget - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_total_never_exceeds_envelope() {
        let envelope = SpendingEnvelope::new(2000.0, 12000.0, 12).unwrap();
        // envelope = 1000, spending far above it
        let stats = vec![stat("Food", 900.0, 900.0), stat("Shopping", 600.0, 600.0)];
        let current: HashMap<String, f64> = [
            ("Food".to_string(), 900.0),
            ("Shopping".to_string(), 600.0),
        ]
        .into();
        let budgets = fallback_budgets(&envelope, &stats, &current);
        let total: f64 = budgets.iter().map(|b| b.suggested_budget).sum();
        assert!(total <= 1000.0 + 0.05);
    }
}
