//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `transactions` - Transaction CRUD and range queries
//! - `journal` - Journal entry CRUD
//! - `insights` - Append-only AI insight store
//! - `chat` - Therapist chat history

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod chat;
mod insights;
mod journal;
mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Row counts per store, for status reporting
#[derive(Debug, Clone, Copy)]
pub struct StoreCounts {
    pub transactions: i64,
    pub journal_entries: i64,
    pub insights: i64,
    pub chat_messages: i64,
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because each pooled
    /// connection to `:memory:` would see its own private database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/rytmind_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any stale file from a previous run
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    pub(crate) fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Row counts for all stores
    pub fn counts(&self) -> Result<StoreCounts> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<i64> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        };
        Ok(StoreCounts {
            transactions: count("transactions")?,
            journal_entries: count("journal_entries")?,
            insights: count("insights")?,
            chat_messages: count("chat_messages")?,
        })
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                merchant TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                category TEXT NOT NULL DEFAULT 'Others',
                amount REAL NOT NULL,
                processed INTEGER NOT NULL DEFAULT 0,
                emotion TEXT,
                emotion_emoji TEXT,
                notes TEXT,
                receipt_url TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_timestamp
                ON transactions(timestamp);

            CREATE TABLE IF NOT EXISTS journal_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                mood TEXT NOT NULL,
                mood_emoji TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                date TEXT NOT NULL,
                related_transaction_id INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_journal_entries_timestamp
                ON journal_entries(timestamp);

            CREATE TABLE IF NOT EXISTS insights (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                period_start INTEGER NOT NULL,
                period_end INTEGER NOT NULL,
                period_type TEXT NOT NULL,
                total_spending REAL NOT NULL,
                transaction_count INTEGER NOT NULL,
                category_breakdown TEXT NOT NULL,
                ai_analysis TEXT NOT NULL,
                generated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_insights_period_type
                ON insights(period_type);
            CREATE INDEX IF NOT EXISTS idx_insights_generated_at
                ON insights(generated_at);

            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chat_messages_timestamp
                ON chat_messages(timestamp);
            "#,
        )?;

        info!("Database migrations complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let db = Database::in_memory().unwrap();
        db.run_migrations().unwrap();
        let counts = db.counts().unwrap();
        assert_eq!(counts.transactions, 0);
        assert_eq!(counts.journal_entries, 0);
        assert_eq!(counts.insights, 0);
        assert_eq!(counts.chat_messages, 0);
    }
}
