use thiserror::Error;

use crate::types::UserId;

/// Errors surfaced by the storage layer.
///
/// Everything except [`StoreError::Database`] is a validation failure:
/// the input was rejected before touching the database and no row was
/// written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message text is empty")]
    EmptyText,

    #[error("sender and receiver must be distinct users")]
    SelfConversation,

    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    #[error("user name is empty")]
    EmptyName,

    #[error("user name already taken: {0}")]
    DuplicateName(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// True for input rejections, false for persistence failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StoreError::Database(_))
    }
}
