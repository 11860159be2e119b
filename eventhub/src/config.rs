//! Configuration management for the EventHub server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Binaries load `.env` first (via `dotenvy`), then call
//! [`Config::from_env`] once and pass the pieces to the components that need
//! them; nothing else reads the environment.

use chrono::Duration;
use eventhub_auth::SessionConfig;
use eventhub_auth::config::DEV_JWT_SECRET;
use eventhub_web::{SameSitePolicy, SessionCookieConfig};
use serde::Serialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder credentials shipped in sample `.env` files.
const PLACEHOLDER_EMAIL_USER: &str = "your-email@gmail.com";
const PLACEHOLDER_EMAIL_PASS: &str = "your-app-password";

/// Configuration rejected at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `AUTH_JWT_SECRET` is set but empty.
    #[error("AUTH_JWT_SECRET must not be empty")]
    EmptyJwtSecret,

    /// `AUTH_COOKIE_SAME_SITE` is not strict, lax or none.
    #[error(transparent)]
    SameSite(#[from] eventhub_web::cookie::InvalidSameSite),

    /// `SameSite=None` without `Secure` is rejected by browsers.
    #[error("AUTH_COOKIE_SAME_SITE=none requires APP_ENV=production (Secure cookies)")]
    InsecureSameSiteNone,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// `PostgreSQL` configuration
    pub database: DatabaseConfig,
    /// Session configuration
    pub auth: AuthConfig,
    /// Outbound email configuration
    pub email: EmailConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Prometheus metrics port; metrics are disabled when unset
    pub metrics_port: Option<u16>,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_allowed_origins: Vec<String>,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    /// Connection URL; in-memory stores are used when unset
    #[serde(skip)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize)]
pub struct AuthConfig {
    /// Secret for signing session tokens
    #[serde(skip)]
    pub jwt_secret: String,
    /// Session lifetime in seconds.
    ///
    /// Deployment override via `AUTH_SESSION_TTL`; unset means 3600, the
    /// standard one-hour session.
    pub session_ttl: u64,
    /// `APP_ENV=production`: Secure cookies, `SameSite=Strict`
    pub production: bool,
    /// Explicit `SameSite` override (strict, lax or none)
    pub cookie_same_site: Option<String>,
}

/// Outbound email configuration
#[derive(Debug, Clone, Serialize)]
pub struct EmailConfig {
    /// SMTP username and sender address
    pub user: Option<String>,
    /// SMTP password
    #[serde(skip)]
    pub pass: Option<String>,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port (STARTTLS)
    pub smtp_port: u16,
    /// Sender display name
    pub from_name: String,
    /// Frontend base URL for links in emails
    pub frontend_url: String,
}

impl EmailConfig {
    /// SMTP credentials, if real ones are configured.
    ///
    /// Missing or placeholder credentials yield `None`, which selects the
    /// console notifier.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let user = self.user.as_deref().filter(|u| !u.is_empty())?;
        let pass = self.pass.as_deref().filter(|p| !p.is_empty())?;
        if user == PLACEHOLDER_EMAIL_USER || pass == PLACEHOLDER_EMAIL_PASS {
            return None;
        }
        Some((user, pass))
    }
}

/// Typed access to a string lookup; unparsable values count as unset.
struct ParsedLookup<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> ParsedLookup<'_, F> {
    fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        (self.0)(key).and_then(|s| s.trim().parse().ok())
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = ParsedLookup(&lookup);

        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed.get("PORT").unwrap_or(5000),
                metrics_port: parsed.get("METRICS_PORT"),
                cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").map_or_else(
                    || {
                        vec![
                            "http://localhost:3000".to_string(),
                            "http://localhost:5173".to_string(),
                        ]
                    },
                    |origins| {
                        origins
                            .split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(ToString::to_string)
                            .collect()
                    },
                ),
                shutdown_timeout: parsed.get("SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|u| !u.is_empty()),
                max_connections: parsed.get("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
                min_connections: parsed.get("DATABASE_MIN_CONNECTIONS").unwrap_or(2),
                connect_timeout: parsed.get("DATABASE_CONNECT_TIMEOUT").unwrap_or(30),
            },
            auth: AuthConfig {
                jwt_secret: lookup("AUTH_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
                session_ttl: parsed.get("AUTH_SESSION_TTL").unwrap_or(3600),
                production: lookup("APP_ENV")
                    .is_some_and(|env| env.trim().eq_ignore_ascii_case("production")),
                cookie_same_site: lookup("AUTH_COOKIE_SAME_SITE").filter(|s| !s.is_empty()),
            },
            email: EmailConfig {
                user: lookup("EMAIL_USER"),
                pass: lookup("EMAIL_PASS"),
                smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                smtp_port: parsed.get("SMTP_PORT").unwrap_or(587),
                from_name: lookup("EMAIL_FROM_NAME").unwrap_or_else(|| "EventHub".to_string()),
                frontend_url: lookup("FRONTEND_URL")
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
            },
        }
    }

    /// Check the configuration before starting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty JWT secret or an unusable
    /// cookie policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if self.session().uses_dev_secret() {
            tracing::warn!(
                "AUTH_JWT_SECRET not set, using the development secret. Do not run this in production!"
            );
        }

        let cookies = self.session_cookie()?;
        if cookies.same_site == SameSitePolicy::None && !cookies.secure {
            return Err(ConfigError::InsecureSameSiteNone);
        }

        if self.email.credentials().is_none() {
            tracing::warn!("Email credentials not configured, confirmations will only be logged");
        }
        Ok(())
    }

    /// Session token settings.
    #[must_use]
    pub fn session(&self) -> SessionConfig {
        let ttl = i64::try_from(self.auth.session_ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::hours(1));
        SessionConfig::new(self.auth.jwt_secret.clone()).with_ttl(ttl)
    }

    /// Session cookie attributes for the configured environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SameSite`] for an unknown `SameSite` value.
    pub fn session_cookie(&self) -> Result<SessionCookieConfig, ConfigError> {
        let base = if self.auth.production {
            SessionCookieConfig::production()
        } else {
            SessionCookieConfig::development()
        };

        let cookies = match &self.auth.cookie_same_site {
            Some(policy) => base.with_same_site(policy.parse()?),
            None => base,
        };
        Ok(cookies.with_max_age_secs(i64::try_from(self.auth.session_ttl).unwrap_or(3600)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.metrics_port, None);
        assert_eq!(config.server.cors_allowed_origins.len(), 2);
        assert!(config.database.url.is_none());
        assert_eq!(config.auth.session_ttl, 3600);
        assert_eq!(config.session().ttl, Duration::hours(1));
        assert_eq!(config.session_cookie().unwrap().max_age_secs, 3600);
        assert_eq!(config.email.frontend_url, "http://localhost:3000");
        assert!(config.email.credentials().is_none());
        assert!(config.session().uses_dev_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("METRICS_PORT", "9090"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("DATABASE_URL", "postgres://localhost/eventhub"),
            ("AUTH_JWT_SECRET", "s3cret"),
            ("EMAIL_USER", "events@example.com"),
            ("EMAIL_PASS", "app-password"),
        ]);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.metrics_port, Some(9090));
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.database.url.is_some());
        assert!(!config.session().uses_dev_secret());
        assert_eq!(config.email.credentials(), Some(("events@example.com", "app-password")));
    }

    #[test]
    fn test_placeholder_email_credentials_ignored() {
        let config = config(&[
            ("EMAIL_USER", PLACEHOLDER_EMAIL_USER),
            ("EMAIL_PASS", "real"),
        ]);
        assert!(config.email.credentials().is_none());
    }

    #[test]
    fn test_session_ttl_override() {
        let config = config(&[("AUTH_SESSION_TTL", "900")]);

        assert_eq!(config.session().ttl, Duration::minutes(15));
        assert_eq!(config.session_cookie().unwrap().max_age_secs, 900);
    }

    #[test]
    fn test_dev_secret_only_warns() {
        let config = config(&[("AUTH_JWT_SECRET", DEV_JWT_SECRET)]);

        assert!(config.session().uses_dev_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = config(&[("AUTH_JWT_SECRET", "  ")]);
        assert_eq!(config.validate(), Err(ConfigError::EmptyJwtSecret));
    }

    #[test]
    fn test_cookie_policy_by_environment() {
        let dev = config(&[]).session_cookie().unwrap();
        assert!(!dev.secure);
        assert_eq!(dev.same_site, SameSitePolicy::Lax);

        let prod = config(&[("APP_ENV", "production")]).session_cookie().unwrap();
        assert!(prod.secure);
        assert_eq!(prod.same_site, SameSitePolicy::Strict);

        let cross_site = config(&[("APP_ENV", "production"), ("AUTH_COOKIE_SAME_SITE", "none")]);
        assert_eq!(cross_site.session_cookie().unwrap().same_site, SameSitePolicy::None);
        assert!(cross_site.validate().is_ok());
    }

    #[test]
    fn test_invalid_cookie_policy_rejected() {
        assert!(matches!(
            config(&[("AUTH_COOKIE_SAME_SITE", "sometimes")]).validate(),
            Err(ConfigError::SameSite(_))
        ));
        assert_eq!(
            config(&[("AUTH_COOKIE_SAME_SITE", "none")]).validate(),
            Err(ConfigError::InsecureSameSiteNone)
        );
    }
}
