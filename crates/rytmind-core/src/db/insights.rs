//! Insight store operations
//!
//! Insights are append-only; the breakdown and analysis are stored as JSON
//! columns since they are only ever read back whole.

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{AiAnalysis, Insight, NewInsight, PeriodType};

fn row_to_insight(row: &Row<'_>) -> rusqlite::Result<Insight> {
    let period_type: String = row.get(3)?;
    let breakdown_json: String = row.get(6)?;
    let analysis_json: String = row.get(7)?;

    Ok(Insight {
        id: row.get(0)?,
        period_start: row.get(1)?,
        period_end: row.get(2)?,
        period_type: PeriodType::parse_or_default(&period_type),
        total_spending: row.get(4)?,
        transaction_count: row.get(5)?,
        category_breakdown: serde_json::from_str(&breakdown_json).unwrap_or_default(),
        ai_analysis: serde_json::from_str(&analysis_json).unwrap_or(AiAnalysis {
            summary: String::new(),
            top_insight: String::new(),
            spending_patterns: vec![],
            emotional_triggers: vec![],
        }),
        generated_at: row.get(8)?,
    })
}

const INSIGHT_COLUMNS: &str = "id, period_start, period_end, period_type, total_spending, \
     transaction_count, category_breakdown, ai_analysis, generated_at";

impl Database {
    /// Store a new insight, returning its id
    pub fn insert_insight(&self, insight: &NewInsight, generated_at: i64) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO insights (period_start, period_end, period_type, total_spending, transaction_count, category_breakdown, ai_analysis, generated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                insight.period_start,
                insight.period_end,
                insight.period_type.as_str(),
                insight.total_spending,
                insight.transaction_count,
                serde_json::to_string(&insight.category_breakdown)?,
                serde_json::to_string(&insight.ai_analysis)?,
                generated_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Latest insight for a period type, by generation time
    pub fn latest_insight(&self, period_type: PeriodType) -> Result<Option<Insight>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM insights WHERE period_type = ? ORDER BY generated_at DESC LIMIT 1",
            INSIGHT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![period_type.as_str()], row_to_insight)
            .optional()?)
    }

    /// Most recently generated insights across all periods
    pub fn list_insights(&self, limit: usize) -> Result<Vec<Insight>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM insights ORDER BY generated_at DESC LIMIT ?",
            INSIGHT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], row_to_insight)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Replace the analysis on an existing insight
    pub fn update_insight_analysis(
        &self,
        id: i64,
        analysis: &AiAnalysis,
        generated_at: i64,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE insights SET ai_analysis = ?, generated_at = ? WHERE id = ?",
            params![serde_json::to_string(analysis)?, generated_at, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Insight {} not found", id)));
        }
        Ok(())
    }

    /// Delete insights generated before the given timestamp, returning the count
    pub fn delete_insights_older_than(&self, timestamp: i64) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute(
            "DELETE FROM insights WHERE generated_at < ?",
            params![timestamp],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryAmount;

    fn sample_insight(period_type: PeriodType) -> NewInsight {
        NewInsight {
            period_start: 0,
            period_end: 1000,
            period_type,
            total_spending: 420.0,
            transaction_count: 7,
            category_breakdown: vec![CategoryAmount {
                category: "Food".to_string(),
                amount: 420.0,
                percentage: 100.0,
            }],
            ai_analysis: AiAnalysis {
                summary: "Mostly food spending".to_string(),
                top_insight: "Food dominates".to_string(),
                spending_patterns: vec!["meals cluster at lunch".to_string()],
                emotional_triggers: vec![],
            },
        }
    }

    #[test]
    fn test_latest_resolves_by_generated_at() {
        let db = Database::in_memory().unwrap();
        db.insert_insight(&sample_insight(PeriodType::SevenDays), 100)
            .unwrap();
        let mut newer = sample_insight(PeriodType::SevenDays);
        newer.total_spending = 999.0;
        db.insert_insight(&newer, 200).unwrap();

        let latest = db.latest_insight(PeriodType::SevenDays).unwrap().unwrap();
        assert_eq!(latest.total_spending, 999.0);
        assert_eq!(latest.generated_at, 200);
    }

    #[test]
    fn test_latest_is_per_period() {
        let db = Database::in_memory().unwrap();
        db.insert_insight(&sample_insight(PeriodType::SevenDays), 100)
            .unwrap();
        assert!(db.latest_insight(PeriodType::ThirtyDays).unwrap().is_none());
    }

    #[test]
    fn test_roundtrip_breakdown_and_analysis() {
        let db = Database::in_memory().unwrap();
        db.insert_insight(&sample_insight(PeriodType::FourteenDays), 100)
            .unwrap();
        let insight = db.latest_insight(PeriodType::FourteenDays).unwrap().unwrap();
        assert_eq!(insight.category_breakdown[0].category, "Food");
        assert_eq!(insight.ai_analysis.top_insight, "Food dominates");
    }

    #[test]
    fn test_update_analysis_in_place() {
        let db = Database::in_memory().unwrap();
        let id = db
            .insert_insight(&sample_insight(PeriodType::SevenDays), 100)
            .unwrap();

        let revised = AiAnalysis {
            summary: "Revised summary".to_string(),
            top_insight: "Revised insight".to_string(),
            spending_patterns: vec![],
            emotional_triggers: vec![],
        };
        db.update_insight_analysis(id, &revised, 200).unwrap();

        let insight = db.latest_insight(PeriodType::SevenDays).unwrap().unwrap();
        assert_eq!(insight.id, id);
        assert_eq!(insight.ai_analysis.summary, "Revised summary");
        assert_eq!(insight.generated_at, 200);
        // Untouched columns survive the update
        assert_eq!(insight.total_spending, 420.0);
    }

    #[test]
    fn test_update_analysis_missing_id() {
        let db = Database::in_memory().unwrap();
        let analysis = sample_insight(PeriodType::SevenDays).ai_analysis;
        assert!(matches!(
            db.update_insight_analysis(99, &analysis, 100),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_older_than() {
        let db = Database::in_memory().unwrap();
        db.insert_insight(&sample_insight(PeriodType::SevenDays), 100)
            .unwrap();
        db.insert_insight(&sample_insight(PeriodType::SevenDays), 500)
            .unwrap();

        let deleted = db.delete_insights_older_than(200).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(db.list_insights(10).unwrap().len(), 1);
    }
}
