//! In-memory credential store.

use crate::error::{AuthError, Result};
use crate::providers::CredentialStore;
use crate::state::{NewUser, User, UserId};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Credential store backed by a `HashMap`.
///
/// Enforces the same uniqueness rules as the Postgres schema: one account
/// per email and one per username. The uniqueness check and the insert run
/// under one lock, so concurrent signups cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or_default()
    }

    /// Whether the store has no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every operation fail with a database error, to exercise
    /// store-failure paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn with_users<T>(&self, f: impl FnOnce(&mut HashMap<UserId, User>) -> Result<T>) -> Result<T> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::DatabaseError(
                "credential store unavailable".to_string(),
            ));
        }

        let mut users = self.users.lock().map_err(|_| AuthError::InternalError)?;
        f(&mut users)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_email_or_username<'a>(
        &'a self,
        email: &'a str,
        username: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + 'a>> {
        Box::pin(async move {
            self.with_users(|users| {
                Ok(users
                    .values()
                    .find(|u| u.email == email || u.username == username)
                    .cloned())
            })
        })
    }

    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + 'a>> {
        Box::pin(async move {
            self.with_users(|users| Ok(users.values().find(|u| u.email == email).cloned()))
        })
    }

    fn find_by_id(
        &self,
        user_id: UserId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + '_>> {
        Box::pin(async move { self.with_users(|users| Ok(users.get(&user_id).cloned())) })
    }

    fn create(&self, user: NewUser) -> Pin<Box<dyn Future<Output = Result<User>> + Send + '_>> {
        Box::pin(async move {
            self.with_users(|users| {
                if users
                    .values()
                    .any(|u| u.email == user.email || u.username == user.username)
                {
                    return Err(AuthError::DuplicateAccount);
                }

                let created = User {
                    id: UserId::new(),
                    username: user.username,
                    email: user.email,
                    password_hash: user.password_hash,
                    role: user.role,
                    created_at: Utc::now(),
                };
                users.insert(created.id, created.clone());
                Ok(created)
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::Role;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Student,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryCredentialStore::new();
        let user = store
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(store.find_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            store.find_by_email("alice@example.com").await.unwrap(),
            Some(user.clone())
        );
        assert_eq!(
            store
                .find_by_email_or_username("other@example.com", "alice")
                .await
                .unwrap(),
            Some(user)
        );
        assert_eq!(store.find_by_email("bob@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_or_username_rejected() {
        let store = InMemoryCredentialStore::new();
        store
            .create(new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(
            store.create(new_user("alice2", "alice@example.com")).await,
            Err(AuthError::DuplicateAccount)
        );
        assert_eq!(
            store.create(new_user("alice", "other@example.com")).await,
            Err(AuthError::DuplicateAccount)
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryCredentialStore::new();
        store.set_unavailable(true);

        let err = store.find_by_id(UserId::new()).await.unwrap_err();
        assert!(err.is_internal());
    }
}
