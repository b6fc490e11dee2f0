//! Chat service - send, history and push subscription over one store

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::ChatError;
use parley_delivery::DeliveryHub;
use parley_store::{ChatMessage, Database, MessageStore, StoreConfig, User, UserId, UserStore};

/// The chat backend: durable store plus best-effort live delivery.
///
/// Callers pass the authenticated user id explicitly (see
/// [`crate::session::SessionGate`]); nothing here reads ambient identity.
pub struct ChatService {
    users: UserStore,
    messages: MessageStore,
    delivery: DeliveryHub,
}

impl ChatService {
    /// Open the service over the database at the configured path
    pub fn open(config: StoreConfig) -> Result<Self, ChatError> {
        Ok(Self::with_database(Database::open(config)?))
    }

    /// Open the service over an in-memory database (tests, demos)
    pub fn in_memory() -> Result<Self, ChatError> {
        Ok(Self::with_database(Database::in_memory()?))
    }

    fn with_database(db: Database) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            messages: MessageStore::new(db),
            delivery: DeliveryHub::default(),
        }
    }

    /// Register a new user
    pub async fn register_user(&self, name: &str) -> Result<User, ChatError> {
        Ok(self.users.create(name).await?)
    }

    /// Send a message from `sender` to `friend`.
    ///
    /// The message is durably stored first; only then is it pushed to the
    /// live sessions of both participants. A failed or unsubscribed push
    /// never fails the send; the recipient will see the message on the
    /// next history load. The created message, including its assigned
    /// `id`, is returned to the sender synchronously.
    pub async fn send_message(
        &self,
        sender: UserId,
        friend: UserId,
        text: &str,
    ) -> Result<ChatMessage, ChatError> {
        let message = self.messages.append(sender, friend, text).await?;

        self.delivery.publish(&message);

        info!(
            "User {} sent message {} to {}",
            sender, message.id, friend
        );
        Ok(message)
    }

    /// Conversation history between `caller` and `friend`, ascending by
    /// message id.
    ///
    /// Keyed by the caller's own id, so the caller is a participant in
    /// every row returned by construction.
    pub async fn history(
        &self,
        caller: UserId,
        friend: UserId,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let history = self.messages.conversation(caller, friend).await?;
        debug!(
            "User {} loaded {} messages with {}",
            caller,
            history.len(),
            friend
        );
        Ok(history)
    }

    /// Everyone the caller could start a conversation with
    pub async fn contacts(&self, caller: UserId) -> Result<Vec<User>, ChatError> {
        Ok(self.users.list_others(caller).await?)
    }

    /// Look up a user by id
    pub async fn user(&self, id: UserId) -> Result<Option<User>, ChatError> {
        Ok(self.users.get(id).await?)
    }

    /// Subscribe a live session to `user`'s push channel
    pub fn subscribe(&self, user: UserId) -> broadcast::Receiver<ChatMessage> {
        self.delivery.subscribe(user)
    }
}
