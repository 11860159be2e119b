//! Account signup and login.
//!
//! Both operations end by issuing a session token; the web layer turns it
//! into the `jwt` cookie.

use crate::error::{AuthError, Result};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::providers::CredentialStore;
use crate::state::{AuthenticatedUser, NewUser, Role};
use crate::token::{IssuedToken, SessionTokenCodec};
use crate::utils::is_valid_email;
use serde::Deserialize;
use std::sync::Arc;

/// Signup request body.
///
/// Missing fields deserialize as empty and are rejected by validation, so
/// clients get one consistent error shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// `student` (default) or `admin`.
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Creates accounts and logs users in.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn CredentialStore>,
    codec: SessionTokenCodec,
}

impl AccountService {
    /// Create an account service.
    #[must_use]
    pub fn new(users: Arc<dyn CredentialStore>, codec: SessionTokenCodec) -> Self {
        Self { users, codec }
    }

    /// Register a new account and issue its first session token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`]: empty field, malformed email, or unknown role
    /// - [`AuthError::DuplicateAccount`]: email or username already taken
    /// - [`AuthError::DatabaseError`] / [`AuthError::CryptoError`]: server failure
    pub async fn signup(&self, request: SignupRequest) -> Result<(AuthenticatedUser, IssuedToken)> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        if username.is_empty() || email.is_empty() || request.password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }
        if !is_valid_email(&email) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Role::default(),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| AuthError::Validation(format!("Invalid role: {raw}")))?,
        };

        if self
            .users
            .find_by_email_or_username(&email, &username)
            .await?
            .is_some()
        {
            tracing::info!(username = %username, "Signup rejected: account exists");
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = hash_password_blocking(request.password).await?;

        // A concurrent signup can still win the race; the store's uniqueness
        // constraint reports it as DuplicateAccount.
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                role,
            })
            .await?;

        let token = self.codec.issue(user.id)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Account created");

        Ok((user.to_authenticated(), token))
    }

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`]: email or password missing
    /// - [`AuthError::InvalidCredentials`]: unknown email or wrong password
    /// - [`AuthError::DatabaseError`] / [`AuthError::CryptoError`]: server failure
    pub async fn login(&self, request: LoginRequest) -> Result<(AuthenticatedUser, IssuedToken)> {
        let email = request.email.trim();
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.codec.issue(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok((user.to_authenticated(), token))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::stores::InMemoryCredentialStore;

    fn service() -> (AccountService, Arc<InMemoryCredentialStore>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let codec = SessionTokenCodec::new(&SessionConfig::default());
        (AccountService::new(store.clone(), codec), store)
    }

    fn signup(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_signup_defaults_to_student_and_issues_token() {
        let (service, store) = service();

        let (user, token) = service
            .signup(signup("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Student);
        assert_eq!(store.len(), 1);
        let claims = service.codec.verify(&token.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_signup_with_admin_role() {
        let (service, _) = service();
        let mut request = signup("root", "root@example.com");
        request.role = Some("admin".to_string());

        let (user, _) = service.signup(request).await.unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_or_username() {
        let (service, store) = service();
        service
            .signup(signup("alice", "alice@example.com"))
            .await
            .unwrap();

        let by_email = service.signup(signup("alice2", "alice@example.com")).await;
        let by_username = service.signup(signup("alice", "elsewhere@example.com")).await;

        assert_eq!(by_email.unwrap_err(), AuthError::DuplicateAccount);
        assert_eq!(by_username.unwrap_err(), AuthError::DuplicateAccount);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let (service, store) = service();

        let mut bad_role = signup("bob", "bob@example.com");
        bad_role.role = Some("professor".to_string());

        for request in [
            signup("", "bob@example.com"),
            signup("bob", "   "),
            signup("bob", "not-an-email"),
            SignupRequest {
                password: " ".to_string(),
                ..signup("bob", "bob@example.com")
            },
            bad_role,
        ] {
            let err = service.signup(request).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (service, _) = service();
        let (created, _) = service
            .signup(signup("alice", "alice@example.com"))
            .await
            .unwrap();

        let (user, _) = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user, created);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email() {
        let (service, _) = service();
        service
            .signup(signup("alice", "alice@example.com"))
            .await
            .unwrap();

        let wrong = service
            .login(LoginRequest {
                email: "alice@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await;
        let unknown = service
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await;

        assert_eq!(wrong.unwrap_err(), AuthError::InvalidCredentials);
        assert_eq!(unknown.unwrap_err(), AuthError::InvalidCredentials);
    }
}
