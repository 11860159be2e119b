//! # EventHub Authentication & Authorization
//!
//! Cookie-carried session tokens, user credentials and role checks for the
//! EventHub backend. Nothing in this crate depends on an HTTP framework: the
//! web layer reads the cookie, hands the raw token to the [`AuthGate`], and
//! asks [`authorize`] whether the resulting identity may proceed.
//!
//! ## Flow
//!
//! ```text
//! signup / login ──► AccountService ──► SessionTokenCodec::issue ──► cookie "jwt"
//!
//! request cookie ──► AuthGate::authenticate ──► AuthenticatedUser ──► authorize(roles)
//!                        │                          │
//!                        ├─ verify signature/expiry ├─ admit
//!                        └─ CredentialStore lookup  └─ Forbidden
//! ```
//!
//! Tokens are stateless. Logging out only removes the cookie on the client;
//! a copied token stays valid until it expires.
//!
//! ## Example
//!
//! ```rust,ignore
//! use eventhub_auth::{AuthGate, Role, SessionTokenCodec, authorize};
//!
//! let user = gate.authenticate(cookie_value.as_deref()).await?;
//! authorize(&[Role::Admin], Some(&user))?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod account;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod providers;
pub mod state;
pub mod stores;
pub mod token;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use account::{AccountService, LoginRequest, SignupRequest};
pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use error::{AuthError, Result};
pub use gate::{AuthGate, authorize};
pub use providers::CredentialStore;
pub use state::{AuthenticatedUser, NewUser, Role, User, UserId};
pub use token::{IssuedToken, SessionClaims, SessionTokenCodec};
