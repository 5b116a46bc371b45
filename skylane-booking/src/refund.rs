use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use skylane_core::booking::BookingPaymentStatus;
use skylane_core::error::PaymentError;
use skylane_core::identity::Actor;
use skylane_core::payment::{Payment, PaymentGateway, PaymentStatus, RefundReason};
use skylane_core::repository::{BookingRepository, PaymentRepository};

/// Staff-only refund flow: reverse a settled charge at the gateway, then
/// cascade locally (Payment -> Refunded, Booking -> Cancelled). A gateway
/// failure leaves local state untouched.
pub struct RefundProcessor {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl RefundProcessor {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            bookings,
            payments,
            gateway,
        }
    }

    pub async fn refund(
        &self,
        payment_id: Uuid,
        reason: &str,
        actor: Actor,
    ) -> Result<Payment, PaymentError> {
        if !actor.role.is_staff() {
            return Err(PaymentError::NotAuthorized);
        }

        let payment = self
            .payments
            .get(payment_id)
            .await
            .map_err(PaymentError::Storage)?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;

        if payment.status != PaymentStatus::Success {
            return Err(PaymentError::NotRefundable(payment_id));
        }
        let Some(transaction_id) = payment.transaction_id.clone() else {
            return Err(PaymentError::NotRefundable(payment_id));
        };

        let reason_code = RefundReason::from_operator_reason(reason);

        // Gateway first: if the provider rejects the refund nothing local
        // changes and the error is surfaced to the operator.
        self.gateway
            .refund(&transaction_id, reason_code)
            .await
            .map_err(PaymentError::Gateway)?;

        let changed = self
            .payments
            .mark_refunded(payment_id)
            .await
            .map_err(PaymentError::Storage)?;
        if !changed {
            // Lost a race with another refund of the same payment.
            warn!(payment_id = %payment_id, "payment no longer refundable after gateway call");
            return Err(PaymentError::NotRefundable(payment_id));
        }

        self.bookings
            .update_payment_status(payment.booking_id, BookingPaymentStatus::Cancelled)
            .await
            .map_err(PaymentError::Storage)?;

        info!(
            payment_id = %payment_id,
            booking_id = %payment.booking_id,
            reason = reason_code.as_str(),
            "payment refunded, booking cancelled"
        );

        Ok(Payment {
            status: PaymentStatus::Refunded,
            ..payment
        })
    }
}
