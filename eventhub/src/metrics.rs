//! Operational metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `eventhub_registrations_total{status}` - Registration attempts by outcome
//!   (`registered`, `duplicate`, `cancelled`, `failed`)
//! - `eventhub_consistency_failures_total{operation}` - Writes that left a
//!   registration and its event's attendee list out of sync
//! - `eventhub_notifications_total{status}` - Confirmation emails (`sent`, `failed`)
//! - `eventhub_auth_failures_total{reason}` - Rejected requests (`unauthenticated`,
//!   `forbidden`, `error`)
//! - `eventhub_attendee_repairs_total` - Attendee lists rewritten by reconciliation

use metrics::describe_counter;

/// Register metric descriptions.
///
/// Call once at startup, before any metrics are recorded.
pub fn register_metrics() {
    describe_counter!(
        "eventhub_registrations_total",
        "Registration attempts by outcome (registered, duplicate, cancelled, failed)"
    );
    describe_counter!(
        "eventhub_consistency_failures_total",
        "Operations that left a registration without a matching attendee entry"
    );
    describe_counter!(
        "eventhub_notifications_total",
        "Registration confirmation emails by status (sent, failed)"
    );
    describe_counter!(
        "eventhub_auth_failures_total",
        "Requests rejected by authentication or authorization"
    );
    describe_counter!(
        "eventhub_attendee_repairs_total",
        "Event attendee lists rewritten by reconciliation"
    );

    tracing::info!("Metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record the outcome of a register or cancel call.
pub fn record_registration(status: &'static str) {
    metrics::counter!("eventhub_registrations_total", "status" => status).increment(1);
    tracing::debug!(status, "Recorded registration metric");
}

/// Record a partial write across the two stores.
pub fn record_consistency_failure(operation: &'static str) {
    metrics::counter!("eventhub_consistency_failures_total", "operation" => operation)
        .increment(1);
}

/// Record a confirmation email attempt.
pub fn record_notification(sent: bool) {
    let status = if sent { "sent" } else { "failed" };
    metrics::counter!("eventhub_notifications_total", "status" => status).increment(1);
    tracing::debug!(status, "Recorded notification metric");
}

/// Record a rejected request.
pub fn record_auth_failure(reason: &'static str) {
    metrics::counter!("eventhub_auth_failures_total", "reason" => reason).increment(1);
}

/// Record attendee lists rewritten by one reconciliation pass.
pub fn record_attendee_repairs(count: u64) {
    metrics::counter!("eventhub_attendee_repairs_total").increment(count);
}
