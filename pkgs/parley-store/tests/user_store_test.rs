// Tests for UserStore: registration, lookup, contact listing

use parley_store::{Database, StoreError, UserStore};

fn user_store() -> UserStore {
    UserStore::new(Database::in_memory().expect("Failed to open database"))
}

#[tokio::test]
async fn create_and_get_user() {
    let users = user_store();

    let alice = users.create("alice").await.expect("Failed to create user");
    assert_eq!(alice.name, "alice");

    // Round-trip equality, timestamp included.
    let found = users.get(alice.id).await.unwrap().expect("user not found");
    assert_eq!(found.created_at, alice.created_at);
    assert_eq!(found, alice);
}

#[tokio::test]
async fn names_are_trimmed_and_must_be_non_empty() {
    let users = user_store();

    let padded = users.create("  alice  ").await.unwrap();
    assert_eq!(padded.name, "alice");

    let err = users.create("   ").await.unwrap_err();
    assert!(matches!(err, StoreError::EmptyName));
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let users = user_store();
    users.create("alice").await.unwrap();

    let err = users.create("alice").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateName(name) if name == "alice"));
}

#[tokio::test]
async fn list_others_excludes_the_caller() {
    let users = user_store();
    let alice = users.create("alice").await.unwrap();
    let bob = users.create("bob").await.unwrap();
    let carol = users.create("carol").await.unwrap();

    let contacts = users.list_others(alice.id).await.unwrap();
    let ids: Vec<_> = contacts.iter().map(|u| u.id).collect();
    assert_eq!(contacts.len(), 2);
    assert!(ids.contains(&bob.id));
    assert!(ids.contains(&carol.id));
    assert!(!ids.contains(&alice.id));
}

#[tokio::test]
async fn unknown_user_lookup_returns_none() {
    let users = user_store();
    assert!(users.get(404).await.unwrap().is_none());
}
