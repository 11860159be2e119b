//! Test doubles for the auth layer.
//!
//! The in-memory credential store lives in [`crate::stores`] because the
//! development server uses it too; this module only holds what production
//! never needs.

pub mod clock;

pub use clock::{FixedClock, test_clock};
