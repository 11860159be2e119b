//! Time source abstraction.
//!
//! Token issuance and expiry checks read time through [`Clock`] so tests can
//! pin "now" to an exact instant.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// # Example
///
/// ```
/// use eventhub_auth::clock::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let _now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
