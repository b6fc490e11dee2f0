//! Message store - append-only persistence and conversation history

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::error::StoreError;
use crate::types::{ChatMessage, MessageId, UserId};
use crate::Database;

/// Message store - manages the append-only `messages` table.
///
/// Messages are never updated or deleted; ordering is by the
/// autoincrement `id`, assigned under the connection mutex so that
/// concurrent appends into the same conversation always receive distinct,
/// totally ordered identifiers.
pub struct MessageStore {
    db: Database,
}

impl MessageStore {
    /// Create a message store over an opened database handle
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a message to the conversation between `sender_id` and
    /// `receiver_id`.
    ///
    /// Validates before writing: the text must be non-empty after
    /// trimming, the participants must be distinct, and both must exist
    /// in the user registry. On success the returned [`ChatMessage`]
    /// carries the freshly assigned `id`, strictly greater than every id
    /// assigned before it.
    pub async fn append(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: &str,
    ) -> Result<ChatMessage, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }
        if sender_id == receiver_id {
            return Err(StoreError::SelfConversation);
        }

        // Millisecond precision, matching what the row stores: the
        // acknowledged message must equal the row read back later.
        let created_at = millis_to_datetime(Utc::now().timestamp_millis());
        let conn = self.db.lock();

        for user in [sender_id, receiver_id] {
            if !Self::user_exists(&conn, user)? {
                return Err(StoreError::UnknownUser(user));
            }
        }

        conn.execute(
            "INSERT INTO messages (sender_id, receiver_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![sender_id, receiver_id, text, created_at.timestamp_millis()],
        )?;
        let id = conn.last_insert_rowid();

        debug!("Stored message {} from {} to {}", id, sender_id, receiver_id);

        Ok(ChatMessage {
            id,
            sender_id,
            receiver_id,
            text: text.to_string(),
            created_at,
        })
    }

    /// Full conversation between two users, ascending by `id`.
    ///
    /// The participant pair is unordered: `conversation(a, b)` and
    /// `conversation(b, a)` return the same sequence.
    pub async fn conversation(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, sender_id, receiver_id, text, created_at
            FROM messages
            WHERE (sender_id = ?1 AND receiver_id = ?2)
               OR (sender_id = ?2 AND receiver_id = ?1)
            ORDER BY id ASC
            "#,
        )?;

        let messages = stmt
            .query_map(params![user_a, user_b], Self::row_to_message)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;

        debug!(
            "Retrieved {} messages between {} and {}",
            messages.len(),
            user_a,
            user_b
        );
        Ok(messages)
    }

    /// Look up a single message by id
    pub async fn message(&self, id: MessageId) -> Result<Option<ChatMessage>, StoreError> {
        let conn = self.db.lock();

        let message = conn
            .query_row(
                "SELECT id, sender_id, receiver_id, text, created_at
                 FROM messages WHERE id = ?1",
                params![id],
                Self::row_to_message,
            )
            .optional()?;

        Ok(message)
    }

    fn user_exists(conn: &rusqlite::Connection, user: UserId) -> Result<bool, StoreError> {
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![user],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    fn row_to_message(row: &Row<'_>) -> Result<ChatMessage, rusqlite::Error> {
        let created_millis: i64 = row.get(4)?;
        Ok(ChatMessage {
            id: row.get(0)?,
            sender_id: row.get(1)?,
            receiver_id: row.get(2)?,
            text: row.get(3)?,
            created_at: millis_to_datetime(created_millis),
        })
    }
}

pub(crate) fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}
