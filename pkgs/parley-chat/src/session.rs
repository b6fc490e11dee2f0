//! Session gate - the authentication seam
//!
//! The chat service never reads ambient auth state: every operation takes
//! the authenticated caller id as an explicit parameter. A [`SessionGate`]
//! sits at the edge, turning whatever credential the transport carries
//! into that id or rejecting the request.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::ChatError;
use parley_store::UserId;

/// Resolves a request credential to an authenticated user id.
///
/// The resolved id is trusted as the sender on writes and as the
/// conversation owner on reads; anything stricter (blocked contacts,
/// permitted-friend lists) is outside this seam.
pub trait SessionGate: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<UserId, ChatError>;
}

/// In-memory token table, for tests and single-process deployments.
#[derive(Default)]
pub struct TokenSessionGate {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl TokenSessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a token with a user, replacing any previous holder
    pub fn issue(&self, token: impl Into<String>, user: UserId) {
        let token = token.into();
        debug!("Issued session token for user {}", user);
        self.lock_mut().insert(token, user);
    }

    /// Invalidate a token
    pub fn revoke(&self, token: &str) {
        self.lock_mut().remove(token);
    }

    fn lock_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, UserId>> {
        self.tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionGate for TokenSessionGate {
    fn authenticate(&self, token: &str) -> Result<UserId, ChatError> {
        let tokens = self
            .tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match tokens.get(token) {
            Some(&user) => Ok(user),
            None => {
                warn!("Rejected unknown session token");
                Err(ChatError::Unauthenticated)
            }
        }
    }
}
