//! PostgreSQL storage implementations.
//!
//! The schema is owned by the application's migrations; this module only
//! issues queries against the `users` table.

pub mod user;

// Re-exports
pub use user::PostgresCredentialStore;
