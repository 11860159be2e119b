//! Authentication extractors.
//!
//! - [`CurrentUser`]: requires a valid `jwt` session cookie
//! - [`Authorized<P>`]: requires a session whose role is in `P::ROLES`
//!
//! ```rust,ignore
//! async fn create_event(
//!     Authorized { user, .. }: Authorized<AdminOnly>,
//!     Json(body): Json<CreateEventBody>,
//! ) -> Result<(StatusCode, Json<Event>), AppError> { ... }
//! ```
//!
//! [`Authorized`] always authenticates before checking the role, so a
//! handler taking it can never run for an anonymous request.

use crate::metrics;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use eventhub_auth::{AuthError, AuthGate, AuthenticatedUser, Role, authorize};
use eventhub_web::{AppError, SessionToken};
use std::marker::PhantomData;
use std::sync::Arc;

/// Authenticated user behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match SessionToken::from_request_parts(parts, state).await {
            Ok(token) => token,
            Err(never) => match never {},
        };
        let gate = Arc::<AuthGate>::from_ref(state);

        gate.authenticate(token.as_deref())
            .await
            .map(Self)
            .map_err(|e| {
                record_rejection(&e);
                AppError::from(e)
            })
    }
}

/// A set of roles allowed through [`Authorized`].
pub trait RolePolicy: Send + Sync + 'static {
    /// Permitted roles.
    const ROLES: &'static [Role];
}

/// Admins only.
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    const ROLES: &'static [Role] = &[Role::Admin];
}

/// Any signed-up user.
#[derive(Debug, Clone, Copy)]
pub struct StudentOrAdmin;

impl RolePolicy for StudentOrAdmin {
    const ROLES: &'static [Role] = &[Role::Student, Role::Admin];
}

/// Authenticated user whose role satisfies `P`.
#[derive(Debug, Clone)]
pub struct Authorized<P: RolePolicy> {
    /// The admitted user.
    pub user: AuthenticatedUser,
    _policy: PhantomData<fn() -> P>,
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Authorized<P>
where
    Arc<AuthGate>: FromRef<S>,
    S: Send + Sync,
    P: RolePolicy,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        authorize(P::ROLES, Some(&user)).map_err(|e| {
            tracing::warn!(user_id = %user.id, role = user.role.as_str(), "Role not permitted");
            record_rejection(&e);
            AppError::from(e)
        })?;

        Ok(Self {
            user,
            _policy: PhantomData,
        })
    }
}

fn record_rejection(err: &AuthError) {
    let reason = if err.is_unauthenticated() {
        "unauthenticated"
    } else if matches!(err, AuthError::Forbidden { .. }) {
        "forbidden"
    } else {
        "error"
    };
    metrics::record_auth_failure(reason);
}
