use serde::Serialize;

use skylane_shared::models::events::{BookingCreatedEvent, PaymentRefundedEvent, PaymentSettledEvent};

/// Structured domain-event log. Events are serialized once and emitted on a
/// dedicated tracing target so downstream collectors can pick them up.
pub struct Telemetry;

impl Telemetry {
    pub fn new() -> Self {
        Self
    }

    pub fn booking_created(&self, event: BookingCreatedEvent) {
        self.emit("booking.created", &event);
    }

    pub fn payment_settled(&self, event: PaymentSettledEvent) {
        self.emit("payment.settled", &event);
    }

    pub fn payment_refunded(&self, event: PaymentRefundedEvent) {
        self.emit("payment.refunded", &event);
    }

    fn emit<T: Serialize>(&self, kind: &str, event: &T) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                tracing::info!(target: "skylane::telemetry", kind = %kind, payload = %payload, "domain event")
            }
            Err(e) => tracing::warn!(kind = %kind, error = %e, "failed to serialize domain event"),
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
