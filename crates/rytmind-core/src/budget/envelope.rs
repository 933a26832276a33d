//! Monthly spending envelope

use serde::Serialize;

use crate::error::{Error, Result};

/// The monthly amount available for category budgets after savings.
///
/// Construction validates the inputs: a zero duration or a negative
/// available-for-spending is rejected instead of flowing into the scaling
/// math as a negative target.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingEnvelope {
    pub income: f64,
    pub savings_goal: f64,
    pub duration_months: u32,
    pub monthly_savings_needed: f64,
    pub available_for_spending: f64,
}

impl SpendingEnvelope {
    pub fn new(income: f64, savings_goal: f64, duration_months: u32) -> Result<Self> {
        if duration_months == 0 {
            return Err(Error::Validation(
                "durationMonths must be at least 1".to_string(),
            ));
        }
        if income < 0.0 || savings_goal < 0.0 {
            return Err(Error::Validation(
                "income and savingsGoal must be non-negative".to_string(),
            ));
        }

        let monthly_savings_needed = savings_goal / duration_months as f64;
        let available_for_spending = income - monthly_savings_needed;
        if available_for_spending < 0.0 {
            return Err(Error::Validation(format!(
                "savings goal requires RM {:.2}/month but income is only RM {:.2}/month",
                monthly_savings_needed, income
            )));
        }

        Ok(Self {
            income,
            savings_goal,
            duration_months,
            monthly_savings_needed,
            available_for_spending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_arithmetic() {
        let env = SpendingEnvelope::new(3000.0, 6000.0, 12).unwrap();
        assert_eq!(env.monthly_savings_needed, 500.0);
        assert_eq!(env.available_for_spending, 2500.0);
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(matches!(
            SpendingEnvelope::new(3000.0, 6000.0, 0),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_negative_envelope_rejected() {
        assert!(matches!(
            SpendingEnvelope::new(1000.0, 24000.0, 12),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_exact_break_even_allowed() {
        let env = SpendingEnvelope::new(2000.0, 24000.0, 12).unwrap();
        assert_eq!(env.available_for_spending, 0.0);
    }
}
