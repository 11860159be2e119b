//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: request correlation ID
//! - [`SessionToken`]: raw value of the `jwt` session cookie
//!
//! Both are infallible; authentication decisions belong to the
//! application's auth extractors, which consume [`SessionToken`].

use crate::cookie::SESSION_COOKIE_NAME;
use crate::middleware::correlation_id_from_headers;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use std::convert::Infallible;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Taken from the request extensions when
/// [`correlation_id_layer`](crate::correlation_id_layer) is installed,
/// otherwise from the `X-Correlation-ID` header, otherwise freshly generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        Ok(Self(
            correlation_id_from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}

/// Value of the session cookie, if one was sent.
///
/// Only the cookie is consulted; an `Authorization` header or body field is
/// never treated as a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    /// Token value, treating an empty cookie as absent.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref().filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(Self(
            jar.get(SESSION_COOKIE_NAME)
                .map(|cookie| cookie.value().to_string()),
        ))
    }
}
