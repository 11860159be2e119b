//! Credential store trait.

use crate::error::Result;
use crate::state::{NewUser, User, UserId};
use std::future::Future;
use std::pin::Pin;

/// Persistent user accounts.
///
/// Lookups return `Ok(None)` for a missing user; `Err` is reserved for store
/// failures, which callers must not confuse with "not found".
///
/// # Dyn Compatibility
///
/// Methods return `Pin<Box<dyn Future>>` so the store can be shared as
/// `Arc<dyn CredentialStore>` in application state.
pub trait CredentialStore: Send + Sync {
    /// Find a user whose email OR username matches.
    ///
    /// Used by signup to reject duplicates before hashing the password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DatabaseError`](crate::AuthError::DatabaseError) if the query fails.
    fn find_by_email_or_username<'a>(
        &'a self,
        email: &'a str,
        username: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + 'a>>;

    /// Find a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DatabaseError`](crate::AuthError::DatabaseError) if the query fails.
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + 'a>>;

    /// Find a user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DatabaseError`](crate::AuthError::DatabaseError) if the query fails.
    fn find_by_id(
        &self,
        user_id: UserId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>>> + Send + '_>>;

    /// Create a user.
    ///
    /// # Errors
    ///
    /// - [`AuthError::DuplicateAccount`](crate::AuthError::DuplicateAccount): email or username taken
    /// - [`AuthError::DatabaseError`](crate::AuthError::DatabaseError): query failed
    fn create(&self, user: NewUser) -> Pin<Box<dyn Future<Output = Result<User>> + Send + '_>>;
}
