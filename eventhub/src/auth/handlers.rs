//! Account endpoints: signup, login, logout and profile.
//!
//! Successful signup and login set the `jwt` session cookie and return the
//! public profile; the token itself never appears in a response body.

use super::middleware::CurrentUser;
use crate::api::{MessageResponse, parse_body};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use eventhub_auth::{AccountService, AuthenticatedUser, IssuedToken, LoginRequest, SignupRequest};
use eventhub_web::{AppError, SessionCookieConfig};
use std::sync::Arc;

fn with_session(jar: CookieJar, cookies: SessionCookieConfig, token: IssuedToken) -> CookieJar {
    let cookie = cookies
        .with_max_age_secs(token.lifetime().num_seconds())
        .session_cookie(token.token);
    jar.add(cookie)
}

/// Create an account and start a session.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/signup
/// { "username": "alice", "email": "alice@example.com", "password": "...", "role": "student" }
/// ```
///
/// 201 with `{_id, username, email, role}`; 400 for invalid input or a
/// taken email/username.
pub async fn signup(
    State(accounts): State<Arc<AccountService>>,
    State(cookies): State<SessionCookieConfig>,
    jar: CookieJar,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<AuthenticatedUser>), AppError> {
    let request = parse_body(body)?;
    let (user, token) = accounts.signup(request).await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "Account created");
    Ok((StatusCode::CREATED, with_session(jar, cookies, token), Json(user)))
}

/// Start a session with email and password.
///
/// 200 with the profile; 401 "Invalid email or password" otherwise.
pub async fn login(
    State(accounts): State<Arc<AccountService>>,
    State(cookies): State<SessionCookieConfig>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthenticatedUser>), AppError> {
    let request = parse_body(body)?;
    let (user, token) = accounts.login(request).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok((with_session(jar, cookies, token), Json(user)))
}

/// Clear the session cookie.
///
/// The token itself stays valid until it expires.
pub async fn logout(
    CurrentUser(user): CurrentUser,
    State(cookies): State<SessionCookieConfig>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    tracing::info!(user_id = %user.id, "User logged out");
    (
        jar.add(cookies.removal_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Profile of the signed-in user.
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<AuthenticatedUser> {
    Json(user)
}
