//! Parley Chat - two-party chat service
//!
//! Ties the durable store and the live delivery hub together behind one
//! service surface, and specifies the two contracts that make the
//! conversation consistent on both ends:
//!
//! - **Ordering**: message ids come from the store's autoincrement
//!   sequence; history is always ascending by id, never by wall-clock
//!   time.
//! - **Reconciliation**: a client keys its view by message id
//!   ([`ConversationView`]), so a message arriving both in the send
//!   response and over the push channel renders exactly once.
//!
//! Authentication is a seam, not a dependency: a [`SessionGate`] resolves
//! request credentials to a user id at the edge, and every service call
//! takes that id explicitly.
//!
//! ```rust,no_run
//! use parley_chat::{ChatService, ConversationView};
//!
//! # async fn example() -> Result<(), parley_chat::ChatError> {
//! let service = ChatService::in_memory()?;
//! let alice = service.register_user("alice").await?;
//! let bob = service.register_user("bob").await?;
//!
//! let mut bob_session = service.subscribe(bob.id);
//! let sent = service.send_message(alice.id, bob.id, "hi").await?;
//!
//! let mut view = ConversationView::new();
//! view.seed(service.history(bob.id, alice.id).await?);
//! if let Ok(pushed) = bob_session.try_recv() {
//!     view.apply(pushed); // no-op: already in the seeded history
//! }
//! assert_eq!(view.messages().next().map(|m| m.id), Some(sent.id));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod service;
pub mod session;
pub mod view;

pub use error::ChatError;
pub use service::ChatService;
pub use session::{SessionGate, TokenSessionGate};
pub use view::ConversationView;

pub use parley_store::{ChatMessage, MessageId, StoreConfig, User, UserId};
