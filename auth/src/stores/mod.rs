//! Credential store implementations.
//!
//! - **In-memory** - tests and the development server
//! - **PostgreSQL** - production (feature `postgres`)

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports
pub use memory::InMemoryCredentialStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCredentialStore;
