//! Session cookie construction.
//!
//! The session token travels only in the `jwt` cookie. It is always
//! HttpOnly with Path `/`; `Secure` and `SameSite` come from
//! [`SessionCookieConfig`], which the application derives from its
//! environment.

use axum_extra::extract::cookie::{Cookie, SameSite};
use std::str::FromStr;
use thiserror::Error;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "jwt";

/// Unknown `SameSite` setting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid SameSite policy '{0}' (expected strict, lax or none)")]
pub struct InvalidSameSite(pub String);

/// `SameSite` policy as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// Same-site requests only.
    Strict,
    /// Top-level cross-site navigations allowed.
    Lax,
    /// Cross-site allowed; browsers require `Secure`.
    None,
}

impl FromStr for SameSitePolicy {
    type Err = InvalidSameSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            _ => Err(InvalidSameSite(s.to_string())),
        }
    }
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => Self::Strict,
            SameSitePolicy::Lax => Self::Lax,
            SameSitePolicy::None => Self::None,
        }
    }
}

/// Attributes of the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookieConfig {
    /// Send only over HTTPS.
    pub secure: bool,
    /// Cross-site policy.
    pub same_site: SameSitePolicy,
    /// Cookie lifetime in seconds; matches the token lifetime.
    pub max_age_secs: i64,
}

impl SessionCookieConfig {
    /// Production defaults: `Secure`, `SameSite=Strict`, one hour.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            secure: true,
            same_site: SameSitePolicy::Strict,
            max_age_secs: 3600,
        }
    }

    /// Development defaults: plain HTTP, `SameSite=Lax`, one hour.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            secure: false,
            same_site: SameSitePolicy::Lax,
            max_age_secs: 3600,
        }
    }

    /// Override the `SameSite` policy.
    #[must_use]
    pub const fn with_same_site(mut self, same_site: SameSitePolicy) -> Self {
        self.same_site = same_site;
        self
    }

    /// Override the lifetime.
    #[must_use]
    pub const fn with_max_age_secs(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    /// Cookie carrying a freshly issued session token.
    #[must_use]
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token))
            .http_only(true)
            .path("/")
            .secure(self.secure)
            .same_site(self.same_site.into())
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build()
    }

    /// Cookie that makes the browser drop the session: empty value,
    /// `Max-Age=0` and an expiry in the past.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
            .http_only(true)
            .path("/")
            .secure(self.secure)
            .same_site(self.same_site.into())
            .build();
        cookie.make_removal();
        cookie
    }
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self::development()
    }
}
