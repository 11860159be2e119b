//! Error types for authentication and authorization operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for authentication and authorization.
///
/// Variants are grouped by the HTTP-facing category they map to; use
/// [`AuthError::is_unauthenticated`] and friends rather than matching on
/// individual variants when only the category matters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// No session cookie was sent.
    #[error("Not authorized, no token")]
    MissingToken,

    /// Session token failed signature or format verification.
    #[error("Not authorized, token failed")]
    InvalidToken,

    /// Session token is past its expiry.
    #[error("Not authorized, token failed")]
    TokenExpired,

    /// Token is valid but the user it names no longer exists.
    #[error("Not authorized, user not found")]
    UserNotFound,

    /// Login with an unknown email or a wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Identity is missing or its role is not in the permitted set.
    #[error("User role {role} is not authorized to access this route")]
    Forbidden {
        /// Role of the rejected identity, or `unknown` when none was attached
        role: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Account Errors
    // ═══════════════════════════════════════════════════════════

    /// Another account already uses the email or username.
    #[error("User with that email or username already exists")]
    DuplicateAccount,

    /// Malformed signup or login input.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Credential store operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Token signing or password hashing failed.
    #[error("Crypto error: {0}")]
    CryptoError(String),

    /// Internal server error (should not be exposed to users).
    #[error("Internal error")]
    InternalError,
}

impl AuthError {
    /// Returns `true` if the request should be answered with 401.
    ///
    /// # Examples
    ///
    /// ```
    /// # use eventhub_auth::AuthError;
    /// assert!(AuthError::MissingToken.is_unauthenticated());
    /// assert!(AuthError::TokenExpired.is_unauthenticated());
    /// assert!(!AuthError::DatabaseError("down".into()).is_unauthenticated());
    /// ```
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::InvalidToken
                | Self::TokenExpired
                | Self::UserNotFound
                | Self::InvalidCredentials
        )
    }

    /// Returns `true` for failures of the server itself (storage, crypto).
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::CryptoError(_) | Self::InternalError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message_names_role() {
        let err = AuthError::Forbidden {
            role: "student".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "User role student is not authorized to access this route"
        );
    }

    #[test]
    fn test_token_failures_share_message() {
        assert_eq!(
            AuthError::InvalidToken.to_string(),
            AuthError::TokenExpired.to_string()
        );
    }

    #[test]
    fn test_categories_are_disjoint() {
        let all = [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::TokenExpired,
            AuthError::UserNotFound,
            AuthError::InvalidCredentials,
            AuthError::Forbidden {
                role: "unknown".to_string(),
            },
            AuthError::DuplicateAccount,
            AuthError::Validation("bad".to_string()),
            AuthError::DatabaseError("down".to_string()),
            AuthError::CryptoError("bad key".to_string()),
            AuthError::InternalError,
        ];

        for err in &all {
            assert!(
                !(err.is_unauthenticated() && err.is_internal()),
                "{err:?} is in two categories"
            );
        }
    }
}
