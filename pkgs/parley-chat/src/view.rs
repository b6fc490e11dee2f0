//! Conversation view - the client-side reconciliation contract
//!
//! A client sees the same message twice: once in the synchronous send
//! response (or a history load) and once over the push channel. The view
//! keys everything by message id, so the second arrival is a no-op and
//! out-of-order pushes still render in id order.

use std::collections::BTreeMap;

use parley_store::{ChatMessage, MessageId};

/// Ordered, deduplicated view of one conversation.
#[derive(Debug, Default)]
pub struct ConversationView {
    messages: BTreeMap<MessageId, ChatMessage>,
}

impl ConversationView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a history query result into the view
    pub fn seed(&mut self, history: impl IntoIterator<Item = ChatMessage>) {
        for message in history {
            self.apply(message);
        }
    }

    /// Insert a message, keyed by id.
    ///
    /// Returns `false` and changes nothing if the id is already present:
    /// the dedup against an optimistic append or an already-fetched
    /// history row.
    pub fn apply(&mut self, message: ChatMessage) -> bool {
        match self.messages.entry(message.id) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(message);
                true
            }
        }
    }

    /// Messages in ascending id order, regardless of arrival order
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
