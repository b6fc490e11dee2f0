//! User store - the registry of chat participants

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::message_store::millis_to_datetime;
use crate::types::{User, UserId};
use crate::Database;

/// User store - manages the `users` table
pub struct UserStore {
    db: Database,
}

impl UserStore {
    /// Create a user store over an opened database handle
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a user under a unique, non-empty name
    pub async fn create(&self, name: &str) -> Result<User, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        // Millisecond precision, matching what the row stores.
        let created_at = millis_to_datetime(Utc::now().timestamp_millis());
        let conn = self.db.lock();

        let taken = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE name = ?1)",
            params![name],
            |row| row.get::<_, bool>(0),
        )?;
        if taken {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        conn.execute(
            "INSERT INTO users (name, created_at) VALUES (?1, ?2)",
            params![name, created_at.timestamp_millis()],
        )?;
        let id = conn.last_insert_rowid();

        info!("Registered user {} ({})", name, id);

        Ok(User {
            id,
            name: name.to_string(),
            created_at,
        })
    }

    /// Look up a user by id
    pub async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let conn = self.db.lock();

        let user = conn
            .query_row(
                "SELECT id, name, created_at FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// All registered users except `caller`, by name.
    ///
    /// Backs the contact listing a client shows when picking who to chat
    /// with.
    pub async fn list_others(&self, caller: UserId) -> Result<Vec<User>, StoreError> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, name, created_at FROM users WHERE id != ?1 ORDER BY name ASC",
        )?;

        let users = stmt
            .query_map(params![caller], Self::row_to_user)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;

        debug!("Listed {} contacts for user {}", users.len(), caller);
        Ok(users)
    }

    fn row_to_user(row: &Row<'_>) -> Result<User, rusqlite::Error> {
        let created_millis: i64 = row.get(2)?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: millis_to_datetime(created_millis),
        })
    }
}
