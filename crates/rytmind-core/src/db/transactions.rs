//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, SpendingStats, Transaction};
use crate::stats;

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        merchant: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        timestamp: row.get(4)?,
        category: row.get(5)?,
        amount: row.get(6)?,
        processed: row.get::<_, i64>(7)? != 0,
        emotion: row.get(8)?,
        emotion_emoji: row.get(9)?,
        notes: row.get(10)?,
        receipt_url: row.get(11)?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, merchant, date, time, timestamp, category, amount, \
     processed, emotion, emotion_emoji, notes, receipt_url";

impl Database {
    /// Insert a transaction, returning its new id
    ///
    /// An empty category is stored as "Others". A transaction arriving with
    /// an emotion tag is already processed.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;
        let category = if tx.category.is_empty() {
            stats::DEFAULT_CATEGORY
        } else {
            &tx.category
        };

        conn.execute(
            r#"
            INSERT INTO transactions (merchant, date, time, timestamp, category, amount, processed, emotion, emotion_emoji, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.merchant,
                tx.date,
                tx.time,
                tx.timestamp,
                category,
                tx.amount,
                tx.emotion.is_some(),
                tx.emotion,
                tx.emotion_emoji,
                tx.notes,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all transactions, most recent first
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions ORDER BY timestamp DESC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// List transactions within a timestamp range (inclusive), most recent first
    pub fn transactions_in_range(&self, start: i64, end: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE timestamp >= ? AND timestamp <= ? ORDER BY timestamp DESC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![start, end], row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Get a single transaction
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE id = ?",
            TRANSACTION_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?)
    }

    /// Attach emotion metadata to a transaction and mark it processed
    pub fn update_transaction_emotion(
        &self,
        id: i64,
        emotion: &str,
        emotion_emoji: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE transactions
            SET emotion = ?, emotion_emoji = ?, notes = COALESCE(?, notes), processed = 1
            WHERE id = ?
            "#,
            params![emotion, emotion_emoji, notes, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }
        Ok(())
    }

    /// Attach a receipt reference to a transaction and mark it processed
    pub fn update_transaction_receipt(
        &self,
        id: i64,
        receipt_url: &str,
        emotion: Option<&str>,
        emotion_emoji: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE transactions
            SET receipt_url = ?,
                emotion = COALESCE(?, emotion),
                emotion_emoji = COALESCE(?, emotion_emoji),
                processed = 1
            WHERE id = ?
            "#,
            params![receipt_url, emotion, emotion_emoji, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }
        Ok(())
    }

    /// Delete a transaction (administrative operation; core flows never delete)
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }
        Ok(())
    }

    /// Spending statistics for a timestamp range
    pub fn spending_stats(&self, start: i64, end: i64) -> Result<SpendingStats> {
        let transactions = self.transactions_in_range(start, end)?;
        Ok(stats::spending_stats(&transactions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tx(merchant: &str, category: &str, amount: f64, timestamp: i64) -> NewTransaction {
        NewTransaction {
            merchant: merchant.to_string(),
            date: "Dec 6, 2024".to_string(),
            time: "10:30 AM".to_string(),
            timestamp,
            category: category.to_string(),
            amount,
            emotion: None,
            emotion_emoji: None,
            notes: None,
        }
    }

    #[test]
    fn test_insert_and_list() {
        let db = Database::in_memory().unwrap();
        db.insert_transaction(&new_tx("Aeon", "Food", -50.0, 100)).unwrap();
        db.insert_transaction(&new_tx("Shopee", "Shopping", -80.0, 200))
            .unwrap();

        let all = db.list_transactions().unwrap();
        assert_eq!(all.len(), 2);
        // Most recent first
        assert_eq!(all[0].merchant, "Shopee");
        assert!(!all[0].processed);
    }

    #[test]
    fn test_range_query_inclusive() {
        let db = Database::in_memory().unwrap();
        for ts in [100, 200, 300] {
            db.insert_transaction(&new_tx("Aeon", "Food", -10.0, ts)).unwrap();
        }
        let in_range = db.transactions_in_range(100, 200).unwrap();
        assert_eq!(in_range.len(), 2);
    }

    #[test]
    fn test_empty_category_defaults() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_transaction(&new_tx("Mystery", "", -10.0, 100)).unwrap();
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.category, "Others");
    }

    #[test]
    fn test_update_emotion_marks_processed() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_transaction(&new_tx("Shopee", "Shopping", -80.0, 100))
            .unwrap();
        db.update_transaction_emotion(id, "Impulse", "😬", Some("late night scroll"))
            .unwrap();

        let tx = db.get_transaction(id).unwrap().unwrap();
        assert!(tx.processed);
        assert_eq!(tx.emotion.as_deref(), Some("Impulse"));
        assert_eq!(tx.notes.as_deref(), Some("late night scroll"));
    }

    #[test]
    fn test_update_missing_transaction() {
        let db = Database::in_memory().unwrap();
        let err = db.update_transaction_emotion(999, "Impulse", "😬", None);
        assert!(matches!(err, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_spending_stats_expenses_only() {
        let db = Database::in_memory().unwrap();
        db.insert_transaction(&new_tx("Employer", "Income", 5000.0, 100))
            .unwrap();
        db.insert_transaction(&new_tx("Aeon", "Food", -300.0, 150)).unwrap();
        db.insert_transaction(&new_tx("Shopee", "Shopping", -700.0, 180))
            .unwrap();

        let stats = db.spending_stats(0, 1000).unwrap();
        assert_eq!(stats.total_spending, 1000.0);
        assert_eq!(stats.transaction_count, 3);
        assert_eq!(stats.category_breakdown[0].category, "Shopping");
    }
}
