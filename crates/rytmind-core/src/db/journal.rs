//! Journal entry operations

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{JournalEntry, JournalPatch, NewJournalEntry};

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        content: row.get(1)?,
        mood: row.get(2)?,
        mood_emoji: row.get(3)?,
        timestamp: row.get(4)?,
        date: row.get(5)?,
        related_transaction_id: row.get(6)?,
    })
}

const JOURNAL_COLUMNS: &str =
    "id, content, mood, mood_emoji, timestamp, date, related_transaction_id";

impl Database {
    /// Insert a journal entry, returning its new id
    pub fn insert_journal_entry(&self, entry: &NewJournalEntry) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO journal_entries (content, mood, mood_emoji, timestamp, date, related_transaction_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.content,
                entry.mood,
                entry.mood_emoji,
                entry.timestamp,
                entry.date,
                entry.related_transaction_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all journal entries, most recent first
    pub fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM journal_entries ORDER BY timestamp DESC",
            JOURNAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_entry)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// List journal entries within a timestamp range, most recent first
    pub fn journal_entries_in_range(&self, start: i64, end: i64) -> Result<Vec<JournalEntry>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE timestamp >= ? AND timestamp <= ? ORDER BY timestamp DESC",
            JOURNAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![start, end], row_to_entry)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Get a single journal entry
    pub fn get_journal_entry(&self, id: i64) -> Result<Option<JournalEntry>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM journal_entries WHERE id = ?", JOURNAL_COLUMNS);
        Ok(conn.query_row(&sql, params![id], row_to_entry).optional()?)
    }

    /// Patch a journal entry; fields left unset in the patch are unchanged
    pub fn update_journal_entry(&self, id: i64, patch: &JournalPatch) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE journal_entries
            SET content = COALESCE(?, content),
                mood = COALESCE(?, mood),
                mood_emoji = COALESCE(?, mood_emoji)
            WHERE id = ?
            "#,
            params![patch.content, patch.mood, patch.mood_emoji, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Journal entry {} not found", id)));
        }
        Ok(())
    }

    /// Delete a journal entry
    pub fn delete_journal_entry(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM journal_entries WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Journal entry {} not found", id)));
        }
        Ok(())
    }

    /// Journal entries linked to a specific transaction
    pub fn journal_entries_for_transaction(&self, transaction_id: i64) -> Result<Vec<JournalEntry>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE related_transaction_id = ? ORDER BY timestamp DESC",
            JOURNAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![transaction_id], row_to_entry)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
