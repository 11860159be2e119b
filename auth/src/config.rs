//! Session configuration.
//!
//! Values come from the application's configuration loader; nothing here
//! reads the environment.

use chrono::Duration;

/// Placeholder secret used when none is configured.
///
/// Applications should refuse or at least warn when they see it.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";

/// Session token configuration.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC secret used to sign and verify session tokens.
    pub secret: String,

    /// Token lifetime, fixed at issuance.
    ///
    /// Default: 1 hour
    pub ttl: Duration,
}

impl SessionConfig {
    /// Create a new session configuration with the default 1 hour lifetime.
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self {
            secret,
            ttl: Duration::hours(1),
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether the development placeholder secret is in use.
    #[must_use]
    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_JWT_SECRET
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEV_JWT_SECRET.to_string())
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::new("s3cret".to_string()).with_ttl(Duration::minutes(30));

        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.ttl, Duration::minutes(30));
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl, Duration::hours(1));
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = SessionConfig::new("top-secret-value".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret-value"));
    }
}
