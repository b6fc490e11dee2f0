// Tests for MessageStore: append validation, ordering, history symmetry

use std::sync::Arc;

use parley_store::{Database, MessageStore, StoreError, UserId, UserStore};
use tempfile::NamedTempFile;

async fn store_with_users() -> (MessageStore, UserId, UserId, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::open(parley_store::StoreConfig {
        db_path: temp_file.path().to_path_buf(),
    })
    .expect("Failed to open database");

    let users = UserStore::new(db.clone());
    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();

    (MessageStore::new(db), alice.id, bob.id, temp_file)
}

#[tokio::test]
async fn append_then_history_contains_message_exactly_once() {
    let (store, alice, bob, _guard) = store_with_users().await;

    let sent = store.append(alice, bob, "hi").await.expect("append failed");

    let history = store.conversation(alice, bob).await.unwrap();
    let matching: Vec<_> = history.iter().filter(|m| m.id == sent.id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].text, "hi");
    assert_eq!(matching[0].sender_id, alice);
    assert_eq!(matching[0].receiver_id, bob);
}

#[tokio::test]
async fn history_preserves_append_order_by_id() {
    let (store, alice, bob, _guard) = store_with_users().await;

    let first = store.append(alice, bob, "hi").await.unwrap();
    let second = store.append(bob, alice, "hello").await.unwrap();

    assert!(first.id < second.id);

    let history = store.conversation(alice, bob).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, first.id);
    assert_eq!(history[0].text, "hi");
    assert_eq!(history[0].sender_id, alice);
    assert_eq!(history[1].id, second.id);
    assert_eq!(history[1].text, "hello");
    assert_eq!(history[1].sender_id, bob);
}

#[tokio::test]
async fn conversation_is_symmetric_in_its_arguments() {
    let (store, alice, bob, _guard) = store_with_users().await;

    store.append(alice, bob, "one").await.unwrap();
    store.append(bob, alice, "two").await.unwrap();
    store.append(alice, bob, "three").await.unwrap();

    let a_view = store.conversation(alice, bob).await.unwrap();
    let b_view = store.conversation(bob, alice).await.unwrap();
    assert_eq!(a_view, b_view);
}

#[tokio::test]
async fn empty_text_is_rejected_and_nothing_is_stored() {
    let (store, alice, bob, _guard) = store_with_users().await;

    for text in ["", "   ", "\n\t"] {
        let err = store.append(alice, bob, text).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyText));
        assert!(err.is_validation());
    }

    let history = store.conversation(alice, bob).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn sending_to_yourself_is_rejected() {
    let (store, alice, _bob, _guard) = store_with_users().await;

    let err = store.append(alice, alice, "dear diary").await.unwrap_err();
    assert!(matches!(err, StoreError::SelfConversation));
}

#[tokio::test]
async fn unknown_participants_are_rejected() {
    let (store, alice, _bob, _guard) = store_with_users().await;

    let err = store.append(alice, 999, "hello?").await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownUser(999)));

    let err = store.append(999, alice, "hello?").await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownUser(999)));
}

#[tokio::test]
async fn other_conversations_do_not_leak_into_history() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::open(parley_store::StoreConfig {
        db_path: temp_file.path().to_path_buf(),
    })
    .unwrap();
    let users = UserStore::new(db.clone());
    let store = MessageStore::new(db);

    let alice = users.create("alice").await.unwrap().id;
    let bob = users.create("bob").await.unwrap().id;
    let carol = users.create("carol").await.unwrap().id;

    store.append(alice, bob, "for bob").await.unwrap();
    store.append(alice, carol, "for carol").await.unwrap();
    store.append(carol, bob, "between the others").await.unwrap();

    let history = store.conversation(alice, bob).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "for bob");
}

#[tokio::test]
async fn message_lookup_by_id() {
    let (store, alice, bob, _guard) = store_with_users().await;

    let sent = store.append(alice, bob, "findable").await.unwrap();

    // The acknowledged message and the stored row must be identical,
    // timestamp included: the broadcast payload is the returned value
    // while reloads read the row.
    let found = store.message(sent.id).await.unwrap().expect("message not found");
    assert_eq!(found.created_at, sent.created_at);
    assert_eq!(found, sent);

    let missing = store.message(4242).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn concurrent_appends_get_distinct_increasing_ids() {
    let (store, alice, bob, _guard) = store_with_users().await;
    let store = Arc::new(store);

    const N: usize = 50;
    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let (from, to) = if i % 2 == 0 { (alice, bob) } else { (bob, alice) };
            store.append(from, to, &format!("message {}", i)).await
        }));
    }

    let mut ids = Vec::with_capacity(N);
    for handle in handles {
        let message = handle.await.unwrap().expect("concurrent append failed");
        ids.push(message.id);
    }

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), N, "ids must be distinct");

    // History observes the same total order.
    let history = store.conversation(alice, bob).await.unwrap();
    assert_eq!(history.len(), N);
    for pair in history.windows(2) {
        assert!(pair[0].id < pair[1].id, "history must be strictly increasing by id");
    }
}
