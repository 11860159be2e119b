//! Security-focused integration tests.
//!
//! - Concurrent signups for the same account cannot both succeed
//! - Forged and foreign tokens are rejected
//! - Public identities never carry password material

#![allow(clippy::unwrap_used, clippy::panic)]

use eventhub_auth::stores::InMemoryCredentialStore;
use eventhub_auth::{
    AccountService, AuthError, AuthGate, CredentialStore, SessionConfig, SessionTokenCodec,
    SignupRequest,
};
use std::sync::Arc;

fn setup() -> (AccountService, AuthGate, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let codec = SessionTokenCodec::new(&SessionConfig::new("integration-secret".to_string()));
    (
        AccountService::new(store.clone(), codec.clone()),
        AuthGate::new(codec, store.clone()),
        store,
    )
}

fn signup(username: &str, email: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
        role: None,
    }
}

#[tokio::test]
async fn test_concurrent_signup_creates_one_account() {
    let (accounts, _, store) = setup();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let accounts = accounts.clone();
            tokio::spawn(async move { accounts.signup(signup("alice", "alice@example.com")).await })
        })
        .collect();

    let mut ok = 0;
    let mut duplicate = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AuthError::DuplicateAccount) => duplicate += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(duplicate, 7);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_signup_token_authenticates() {
    let (accounts, gate, _) = setup();
    let (user, token) = accounts
        .signup(signup("alice", "alice@example.com"))
        .await
        .unwrap();

    let authenticated = gate.authenticate(Some(&token.token)).await.unwrap();
    assert_eq!(authenticated, user);
}

#[tokio::test]
async fn test_token_from_other_deployment_rejected() {
    let (accounts, _, store) = setup();
    let (_, token) = accounts
        .signup(signup("alice", "alice@example.com"))
        .await
        .unwrap();

    let other_codec = SessionTokenCodec::new(&SessionConfig::new("other-secret".to_string()));
    let other_gate = AuthGate::new(other_codec, store);

    assert_eq!(
        other_gate.authenticate(Some(&token.token)).await,
        Err(AuthError::InvalidToken)
    );
}

#[tokio::test]
async fn test_stored_password_is_hashed() {
    let (accounts, _, store) = setup();
    let (user, _) = accounts
        .signup(signup("alice", "alice@example.com"))
        .await
        .unwrap();

    let stored = store.find_by_id(user.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "correct horse battery");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}
