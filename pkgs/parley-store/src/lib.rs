//! Parley Store - persistent storage for the two-party chat backend
//!
//! This crate provides SQLite-based storage for users and chat messages.
//!
//! # Architecture
//!
//! The storage layer is organized into two managers sharing one database
//! handle:
//!
//! - **MessageStore**: append-only message persistence and conversation
//!   history queries
//! - **UserStore**: user registry (create, lookup, list)
//!
//! # Database Schema
//!
//! - `users`: registered users (`id` autoincrement, unique `name`)
//! - `messages`: one row per message; `id` autoincrement is the
//!   process-wide ordering authority, indexed on both orientations of the
//!   participant pair for conversation lookups
//!
//! Messages are immutable: there is no update or delete path, and the
//! conversation between two users is exactly the rows whose unordered
//! `{sender_id, receiver_id}` pair matches them.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use parley_store::{Database, MessageStore, StoreConfig, UserStore};
//!
//! # async fn example() -> Result<(), parley_store::StoreError> {
//! let db = Database::open(StoreConfig::default())?;
//! let users = UserStore::new(db.clone());
//! let messages = MessageStore::new(db);
//!
//! let alice = users.create("alice").await?;
//! let bob = users.create("bob").await?;
//!
//! let sent = messages.append(alice.id, bob.id, "hi").await?;
//! let history = messages.conversation(bob.id, alice.id).await?;
//! assert_eq!(history[0].id, sent.id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod message_store;
pub mod types;
pub mod user_store;

pub use error::StoreError;
pub use message_store::MessageStore;
pub use types::{ChatMessage, MessageId, User, UserId};
pub use user_store::UserStore;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::info;

/// Configuration for the storage layer
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("parley.db"),
        }
    }
}

/// Shared database handle.
///
/// Wraps a single SQLite connection behind a mutex; the connection is the
/// serialization point for identifier assignment, so concurrent appends
/// always observe a strictly increasing `messages.id` sequence.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl Database {
    /// Open (or create) the database at the configured path and apply the
    /// schema.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(&config.db_path)?;
        let db = Self::with_connection(conn)?;
        info!("Chat database opened at {}", config.db_path.display());
        Ok(db)
    }

    /// Open an in-memory database (tests, demos).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(rusqlite::Connection::open_in_memory()?)
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn create_schema(conn: &rusqlite::Connection) -> Result<(), StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        // AUTOINCREMENT (not bare rowid) so ids are never reused and the
        // sequence stays strictly monotonic for the lifetime of the store.
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id INTEGER NOT NULL REFERENCES users(id),
                receiver_id INTEGER NOT NULL REFERENCES users(id),
                text TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        // Both orientations of the participant pair, so either side of the
        // OR filter in conversation queries is index-served.
        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_messages_pair ON messages(sender_id, receiver_id)",
            "CREATE INDEX IF NOT EXISTS idx_messages_pair_rev ON messages(receiver_id, sender_id)",
        ];
        for idx in indexes {
            conn.execute(idx, [])?;
        }

        Ok(())
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, rusqlite::Connection> {
        // Mutex poisoning only happens if a holder panicked; storage code
        // does not panic while holding the lock.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
