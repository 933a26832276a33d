//! Category aggregation
//!
//! Pure functions over transaction lists: per-category spending totals and
//! percentages, emotion breakdowns, and the derived category statistics the
//! budget engine feeds into its prompt and fallback heuristic. Only
//! expenses (negative amounts) count toward spending aggregates.

use std::collections::HashMap;

use crate::models::{CategoryAmount, CategoryStat, EmotionAmount, SpendingStats, Transaction};
use crate::window::HISTORY_MONTHS;

/// Fallback category for transactions without one
pub const DEFAULT_CATEGORY: &str = "Others";

/// Absolute spending amount of a transaction, or None for income
fn expense_amount(tx: &Transaction) -> Option<f64> {
    (tx.amount < 0.0).then(|| tx.amount.abs())
}

fn category_of(tx: &Transaction) -> &str {
    if tx.category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        &tx.category
    }
}

/// Sum expenses per category
pub fn spending_by_category(transactions: &[Transaction]) -> HashMap<String, f64> {
    let mut map = HashMap::new();
    for tx in transactions {
        if let Some(amount) = expense_amount(tx) {
            *map.entry(category_of(tx).to_string()).or_insert(0.0) += amount;
        }
    }
    map
}

/// Per-category breakdown sorted by amount descending, plus the total.
///
/// An empty transaction list yields an empty breakdown and a zero total;
/// percentages are 0 whenever the total is 0.
pub fn category_breakdown(transactions: &[Transaction]) -> (Vec<CategoryAmount>, f64) {
    let map = spending_by_category(transactions);
    let total: f64 = map.values().sum();

    let mut breakdown: Vec<CategoryAmount> = map
        .into_iter()
        .map(|(category, amount)| CategoryAmount {
            category,
            amount,
            percentage: if total > 0.0 {
                amount / total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    (breakdown, total)
}

/// Per-emotion breakdown over processed transactions, sorted by count
pub fn emotion_breakdown(transactions: &[Transaction]) -> Vec<EmotionAmount> {
    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, (usize, f64)> = HashMap::new();
    for tx in transactions {
        if let Some(emotion) = tx.emotion.as_deref().filter(|e| !e.is_empty()) {
            if !map.contains_key(emotion) {
                order.push(emotion.to_string());
            }
            let entry = map.entry(emotion.to_string()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += tx.amount.abs();
        }
    }

    let processed_count = transactions.iter().filter(|t| t.processed).count();
    let mut breakdown: Vec<EmotionAmount> = order
        .into_iter()
        .map(|emotion| {
            let (count, amount) = map[&emotion];
            EmotionAmount {
                emotion,
                count,
                amount,
                percentage: if processed_count > 0 {
                    count as f64 / processed_count as f64 * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

/// Full spending statistics for a set of transactions
pub fn spending_stats(transactions: &[Transaction]) -> SpendingStats {
    let (category_breakdown, total_spending) = category_breakdown(transactions);
    SpendingStats {
        total_spending,
        transaction_count: transactions.len(),
        processed_count: transactions.iter().filter(|t| t.processed).count(),
        category_breakdown,
        emotion_breakdown: emotion_breakdown(transactions),
    }
}

/// Most frequent tag; ties go to the first encountered
pub fn dominant_emotion(emotions: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for e in emotions {
        *counts.entry(e.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for e in emotions {
        let count = counts[e.as_str()];
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((e.as_str(), count)),
        }
    }
    best.map(|(e, _)| e.to_string())
}

/// Derive per-category statistics from the 90-day history window.
///
/// `current_spending` maps categories to their real current-month totals;
/// categories unseen this month get 0. Sorted by historical total
/// descending.
pub fn category_stats(
    historical: &[Transaction],
    current_spending: &HashMap<String, f64>,
) -> Vec<CategoryStat> {
    struct Accum {
        total: f64,
        count: usize,
        emotions: Vec<String>,
    }

    // Preserve first-encountered order so equal totals sort deterministically
    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, Accum> = HashMap::new();
    let mut grand_total = 0.0;

    for tx in historical {
        let Some(amount) = expense_amount(tx) else {
            continue;
        };
        let category = category_of(tx).to_string();
        let entry = map.entry(category.clone()).or_insert_with(|| {
            order.push(category);
            Accum {
                total: 0.0,
                count: 0,
                emotions: Vec::new(),
            }
        });
        entry.total += amount;
        entry.count += 1;
        grand_total += amount;
        if let Some(emotion) = tx.emotion.as_deref().filter(|e| !e.is_empty()) {
            entry.emotions.push(emotion.to_string());
        }
    }

    let mut stats: Vec<CategoryStat> = order
        .into_iter()
        .map(|category| {
            let accum = &map[&category];
            let current = current_spending.get(&category).copied().unwrap_or(0.0);
            CategoryStat {
                total: accum.total,
                monthly_average: accum.total / HISTORY_MONTHS,
                frequency: accum.count,
                percentage: if grand_total > 0.0 {
                    accum.total / grand_total * 100.0
                } else {
                    0.0
                },
                dominant_emotion: dominant_emotion(&accum.emotions),
                current_month_spending: current,
                category,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    stats
}

/// Trend label for current-month spending against the historical average
pub fn spending_trend(current: f64, monthly_average: f64) -> &'static str {
    if current > monthly_average {
        "increasing"
    } else if current < monthly_average * 0.8 {
        "decreasing"
    } else {
        "stable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(merchant: &str, category: &str, amount: f64, emotion: Option<&str>) -> Transaction {
        Transaction {
            id: 0,
            merchant: merchant.to_string(),
            date: "Dec 6, 2024".to_string(),
            time: "10:30 AM".to_string(),
            timestamp: 0,
            category: category.to_string(),
            amount: -amount,
            processed: emotion.is_some(),
            emotion: emotion.map(String::from),
            emotion_emoji: None,
            notes: None,
            receipt_url: None,
        }
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let txs = vec![
            expense("Aeon", "Food", 300.0, None),
            expense("Shopee", "Shopping", 700.0, None),
        ];
        let (breakdown, total) = category_breakdown(&txs);
        assert_eq!(total, 1000.0);
        let sum: f64 = breakdown.iter().map(|c| c.amount).sum();
        assert_eq!(sum, total);
        let pct: f64 = breakdown.iter().map(|c| c.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_sorted_descending() {
        let txs = vec![
            expense("Aeon", "Food", 300.0, None),
            expense("Shopee", "Shopping", 700.0, None),
        ];
        let (breakdown, _) = category_breakdown(&txs);
        assert_eq!(breakdown[0].category, "Shopping");
        assert_eq!(breakdown[0].amount, 700.0);
        assert!((breakdown[0].percentage - 70.0).abs() < 1e-9);
        assert_eq!(breakdown[1].category, "Food");
        assert!((breakdown[1].percentage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_list_no_division_by_zero() {
        let (breakdown, total) = category_breakdown(&[]);
        assert!(breakdown.is_empty());
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_income_excluded_from_spending() {
        let mut salary = expense("Employer", "Income", 0.0, None);
        salary.amount = 5000.0;
        let txs = vec![salary, expense("Aeon", "Food", 100.0, None)];
        let (breakdown, total) = category_breakdown(&txs);
        assert_eq!(total, 100.0);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].category, "Food");
    }

    #[test]
    fn test_missing_category_defaults_to_others() {
        let txs = vec![expense("Mystery", "", 50.0, None)];
        let (breakdown, _) = category_breakdown(&txs);
        assert_eq!(breakdown[0].category, "Others");
    }

    #[test]
    fn test_dominant_emotion_plurality() {
        let emotions: Vec<String> = ["Impulse", "Planned", "Impulse"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dominant_emotion(&emotions), Some("Impulse".to_string()));
    }

    #[test]
    fn test_dominant_emotion_tie_first_wins() {
        let emotions: Vec<String> = ["Waste", "Impulse"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dominant_emotion(&emotions), Some("Waste".to_string()));
    }

    #[test]
    fn test_dominant_emotion_empty() {
        assert_eq!(dominant_emotion(&[]), None);
    }

    #[test]
    fn test_category_stats_monthly_average() {
        let txs = vec![
            expense("Aeon", "Food", 450.0, Some("Necessary")),
            expense("Sushi King", "Food", 150.0, Some("Impulse")),
            expense("Shopee", "Shopping", 300.0, Some("Impulse")),
        ];
        let current: HashMap<String, f64> = [("Food".to_string(), 180.0)].into();
        let stats = category_stats(&txs, &current);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "Food");
        assert_eq!(stats[0].total, 600.0);
        assert!((stats[0].monthly_average - 200.0).abs() < 1e-9);
        assert_eq!(stats[0].frequency, 2);
        assert_eq!(stats[0].current_month_spending, 180.0);
        assert_eq!(stats[1].current_month_spending, 0.0);
        assert_eq!(
            stats[1].dominant_emotion,
            Some("Impulse".to_string())
        );
    }

    #[test]
    fn test_spending_trend() {
        assert_eq!(spending_trend(120.0, 100.0), "increasing");
        assert_eq!(spending_trend(70.0, 100.0), "decreasing");
        assert_eq!(spending_trend(90.0, 100.0), "stable");
        // Exactly 80% of average is stable, not decreasing
        assert_eq!(spending_trend(80.0, 100.0), "stable");
    }

    #[test]
    fn test_emotion_breakdown_percentage_of_processed() {
        let txs = vec![
            expense("Shopee", "Shopping", 100.0, Some("Impulse")),
            expense("Aeon", "Food", 50.0, Some("Necessary")),
            expense("Grab", "Transport", 20.0, None),
        ];
        let breakdown = emotion_breakdown(&txs);
        assert_eq!(breakdown.len(), 2);
        for e in &breakdown {
            assert!((e.percentage - 50.0).abs() < 1e-9);
        }
    }
}
