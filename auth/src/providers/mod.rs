//! Authentication providers.
//!
//! Traits for the external dependencies of the auth layer. Handlers and the
//! [`AuthGate`](crate::AuthGate) depend on these traits; the application
//! picks the implementation:
//!
//! - **Testing / development**: [`InMemoryCredentialStore`](crate::stores::InMemoryCredentialStore)
//! - **Production**: `PostgresCredentialStore` (feature `postgres`)

pub mod credential;

pub use credential::CredentialStore;
