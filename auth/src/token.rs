//! Session token codec.
//!
//! A session token is an HS256-signed JWT with claims `{sub, iat, exp, exp_ms}`.
//! Nothing is stored server-side: a token is valid iff its signature
//! verifies and `now < exp_ms`, where "now" comes from the codec's [`Clock`].
//!
//! Expiry is checked here, not by `jsonwebtoken`, so that it uses the
//! injected clock and no leeway. The issuance instant `T` is kept to the
//! millisecond and a token is accepted for `now` in `[T, T + ttl)`.
//! `iat` and `exp` stay whole seconds for standard JWT readers, with `exp`
//! rounded up so they never see a token expire early.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{AuthError, Result};
use crate::state::UserId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds, rounded up).
    pub exp: i64,
    /// Expiration (Unix milliseconds), the instant `verify` enforces.
    pub exp_ms: i64,
}

impl SessionClaims {
    /// User the token was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<UserId> {
        uuid::Uuid::parse_str(&self.sub)
            .map(UserId)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// A freshly signed token plus its validity window.
///
/// The token is accepted for `now` in `[issued_at, expires_at)`.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded JWT, the session cookie value.
    pub token: String,
    /// Clock reading at issuance, truncated to the millisecond.
    pub issued_at: DateTime<Utc>,
    /// First instant at which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Remaining lifetime at issuance, used as the cookie max-age.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionTokenCodec {
    /// Create a codec that reads wall-clock time.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a codec with an explicit time source.
    #[must_use]
    pub fn with_clock(config: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: config.ttl,
            clock,
        }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user_id`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CryptoError`] if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken> {
        let issued_at = from_millis(self.clock.now().timestamp_millis())?;
        let expires_at = issued_at + self.ttl;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp() + i64::from(expires_at.timestamp_subsec_millis() > 0),
            exp_ms: expires_at.timestamp_millis(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::CryptoError(format!("Token signing failed: {e}")))?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`]: malformed token, bad signature, or non-UUID subject
    /// - [`AuthError::TokenExpired`]: `now >= exp_ms`
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                AuthError::InvalidToken
            })?;

        let claims = data.claims;
        if self.clock.now().timestamp_millis() >= claims.exp_ms {
            return Err(AuthError::TokenExpired);
        }

        // Surface a bad subject here rather than at lookup time.
        claims.user_id()?;

        Ok(claims)
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AuthError::CryptoError(format!("Timestamp out of range: {millis}")))
}
