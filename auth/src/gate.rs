//! Authentication and role authorization gates.
//!
//! [`AuthGate::authenticate`] turns a raw cookie value into an
//! [`AuthenticatedUser`]; [`authorize`] decides whether that identity may
//! proceed. The web layer always runs them in that order.

use crate::error::{AuthError, Result};
use crate::providers::CredentialStore;
use crate::state::{AuthenticatedUser, Role};
use crate::token::SessionTokenCodec;
use std::sync::Arc;

/// Validates session tokens and resolves them to users.
#[derive(Clone)]
pub struct AuthGate {
    codec: SessionTokenCodec,
    users: Arc<dyn CredentialStore>,
}

impl AuthGate {
    /// Create a gate over a token codec and a credential store.
    #[must_use]
    pub fn new(codec: SessionTokenCodec, users: Arc<dyn CredentialStore>) -> Self {
        Self { codec, users }
    }

    /// Token codec used by this gate.
    #[must_use]
    pub const fn codec(&self) -> &SessionTokenCodec {
        &self.codec
    }

    /// Authenticate a request from its session cookie value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingToken`]: no cookie, or an empty one
    /// - [`AuthError::InvalidToken`] / [`AuthError::TokenExpired`]: token rejected
    /// - [`AuthError::UserNotFound`]: token names a user that no longer exists
    /// - [`AuthError::DatabaseError`]: the credential store failed (not retried)
    pub async fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        let claims = self.codec.verify(token)?;
        let user_id = claims.user_id()?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            tracing::debug!(user_id = %user_id, "Session token for unknown user");
            AuthError::UserNotFound
        })?;

        Ok(user.to_authenticated())
    }
}

/// Admit `user` iff it is present and its role is in `permitted`.
///
/// # Errors
///
/// Returns [`AuthError::Forbidden`] naming the rejected role, or `unknown`
/// when no identity is attached.
///
/// # Example
///
/// ```
/// use eventhub_auth::{AuthError, Role, authorize};
///
/// assert!(authorize(&[Role::Admin], None).is_err());
/// ```
pub fn authorize(permitted: &[Role], user: Option<&AuthenticatedUser>) -> Result<()> {
    match user {
        Some(user) if permitted.contains(&user.role) => Ok(()),
        Some(user) => Err(AuthError::Forbidden {
            role: user.role.to_string(),
        }),
        None => Err(AuthError::Forbidden {
            role: "unknown".to_string(),
        }),
    }
}
