//! Therapist chat history operations

use rusqlite::{params, Row};

use super::Database;
use crate::error::Result;
use crate::models::{ChatMessage, ChatRole};

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role: String = row.get(1)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        // Unknown roles are treated as user turns
        role: role.parse().unwrap_or(ChatRole::User),
        content: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

impl Database {
    /// Append a message to the chat history, returning its id
    pub fn insert_chat_message(
        &self,
        role: ChatRole,
        content: &str,
        timestamp: i64,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO chat_messages (role, content, timestamp) VALUES (?, ?, ?)",
            params![role.as_str(), content, timestamp],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent N messages, returned in chronological order (oldest first)
    pub fn chat_history(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, role, content, timestamp FROM chat_messages ORDER BY timestamp DESC, id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_message)?;
        let mut messages = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }

    /// Delete all chat history, returning the number of messages removed
    pub fn clear_chat_history(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM chat_messages", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_chronological_with_limit() {
        let db = Database::in_memory().unwrap();
        db.insert_chat_message(ChatRole::User, "first", 100).unwrap();
        db.insert_chat_message(ChatRole::Assistant, "second", 200)
            .unwrap();
        db.insert_chat_message(ChatRole::User, "third", 300).unwrap();

        let history = db.chat_history(2).unwrap();
        assert_eq!(history.len(), 2);
        // Last two messages, oldest first
        assert_eq!(history[0].content, "second");
        assert_eq!(history[0].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "third");
    }

    #[test]
    fn test_clear_history() {
        let db = Database::in_memory().unwrap();
        db.insert_chat_message(ChatRole::User, "hello", 100).unwrap();
        assert_eq!(db.clear_chat_history().unwrap(), 1);
        assert!(db.chat_history(10).unwrap().is_empty());
    }
}
