//! Parley Delivery - per-user live push channels
//!
//! Fans a freshly stored [`ChatMessage`] out to the live sessions of both
//! participants via `tokio::sync::broadcast`. Delivery is a best-effort,
//! at-least-once hint to currently connected sessions: nothing is queued
//! for disconnected users, who catch up from conversation history on
//! reconnect. The durable store, not this hub, is the source of truth.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::debug;

use parley_store::{ChatMessage, UserId};

/// Default per-user broadcast channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// Distributes new messages to the live sessions of their participants.
///
/// One broadcast channel per user; every device a user has connected is a
/// subscriber on that user's channel. Publishing never blocks and never
/// fails the caller: a user with no live session simply misses the hint.
pub struct DeliveryHub {
    capacity: usize,
    channels: Mutex<HashMap<UserId, broadcast::Sender<ChatMessage>>>,
}

impl DeliveryHub {
    /// Create a hub with the given per-user channel capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe a live session to `user`'s push channel.
    ///
    /// Each subscriber receives every message published for `user` from
    /// this point on; a slow subscriber that lags past the channel
    /// capacity loses the oldest hints and is expected to reload history.
    pub fn subscribe(&self, user: UserId) -> broadcast::Receiver<ChatMessage> {
        let mut channels = self.lock();
        channels
            .entry(user)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish a stored message to the live sessions of both participants.
    ///
    /// Fire-and-forget: the message is already durable, so a failed or
    /// unsubscribed push is logged and dropped, never surfaced to the
    /// sender. The sender's own channel is included so their other
    /// devices stay consistent.
    pub fn publish(&self, message: &ChatMessage) {
        let mut channels = self.lock();
        for user in [message.receiver_id, message.sender_id] {
            let Some(tx) = channels.get(&user).cloned() else {
                debug!("No push channel for user {}, skipping", user);
                continue;
            };
            match tx.send(message.clone()) {
                Ok(n) => {
                    debug!("Pushed message {} to {} session(s) of user {}", message.id, n, user);
                }
                Err(_) => {
                    // All receivers dropped; the user will catch up via
                    // history. Prune the dead channel.
                    debug!("All sessions of user {} gone, dropping channel", user);
                    channels.remove(&user);
                }
            }
        }
    }

    /// Number of live sessions subscribed for `user`
    pub fn subscriber_count(&self, user: UserId) -> usize {
        self.lock()
            .get(&user)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, broadcast::Sender<ChatMessage>>> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DeliveryHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(id: i64, sender_id: UserId, receiver_id: UserId) -> ChatMessage {
        ChatMessage {
            id,
            sender_id,
            receiver_id,
            text: format!("message {}", id),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn publish_without_subscriber_does_not_panic() {
        let hub = DeliveryHub::default();
        hub.publish(&message(1, 1, 2));
        assert_eq!(hub.subscriber_count(2), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let hub = DeliveryHub::default();
        let mut rx = hub.subscribe(2);

        hub.publish(&message(1, 1, 2));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, 1);
        assert_eq!(received.text, "message 1");
    }

    #[tokio::test]
    async fn sender_devices_receive_their_own_message() {
        let hub = DeliveryHub::default();
        let mut sender_rx = hub.subscribe(1);
        let mut receiver_rx = hub.subscribe(2);

        hub.publish(&message(7, 1, 2));

        assert_eq!(sender_rx.recv().await.unwrap().id, 7);
        assert_eq!(receiver_rx.recv().await.unwrap().id, 7);
    }

    #[tokio::test]
    async fn every_device_of_the_receiver_gets_the_push() {
        let hub = DeliveryHub::default();
        let mut phone = hub.subscribe(2);
        let mut laptop = hub.subscribe(2);
        assert_eq!(hub.subscriber_count(2), 2);

        hub.publish(&message(3, 1, 2));

        assert_eq!(phone.recv().await.unwrap().id, 3);
        assert_eq!(laptop.recv().await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn dropped_subscriber_prunes_the_channel() {
        let hub = DeliveryHub::default();
        let rx = hub.subscribe(2);
        drop(rx);

        hub.publish(&message(1, 1, 2));
        assert_eq!(hub.subscriber_count(2), 0);
    }

    #[tokio::test]
    async fn uninvolved_user_receives_nothing() {
        let hub = DeliveryHub::default();
        let mut other = hub.subscribe(3);

        hub.publish(&message(1, 1, 2));

        assert!(matches!(
            other.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
