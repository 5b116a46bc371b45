use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use skylane_core::booking::BookingPaymentStatus;
use skylane_core::error::PaymentError;
use skylane_core::payment::{GatewayIntentStatus, Payment, PaymentGateway};
use skylane_core::repository::{BookingRepository, PaymentRepository};

use crate::signature::SignatureVerifier;
use crate::tickets::TicketIssuer;

pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

// ============================================================================
// Webhook payload
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GatewayEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: GatewayEventData,
}

#[derive(Debug, Deserialize)]
pub struct GatewayEventData {
    pub object: GatewayIntentObject,
}

#[derive(Debug, Deserialize)]
pub struct GatewayIntentObject {
    pub id: String,
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: EventMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventMetadata {
    #[serde(rename = "BookingId")]
    pub booking_id: Option<Uuid>,
    #[serde(rename = "BookingRef")]
    pub booking_ref: Option<String>,
    #[serde(rename = "UserId")]
    pub user_id: Option<Uuid>,
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of driving a payment towards Success through the shared transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// This caller won the Pending->Success transition and ran the downstream
    /// booking confirmation and ticket issuance.
    Completed {
        payment_id: Uuid,
        booking_id: Uuid,
        tickets_issued: usize,
    },
    /// The payment was already settled; observed state returned as a no-op.
    AlreadySettled,
    /// Payment settled and booking confirmed, but ticketing failed. Surfaced
    /// as "payment received, ticketing pending" rather than a hard failure.
    TicketsPending {
        payment_id: Uuid,
        booking_id: Uuid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Settled(SettlementOutcome),
    MarkedFailed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Settled(SettlementOutcome),
    Processing,
    RequiresAction,
    Failed,
}

// ============================================================================
// Processor
// ============================================================================

/// Drives Payment/Booking/Ticket state from gateway notifications. The
/// webhook path and the synchronous confirmation path both converge on
/// [`ReconciliationProcessor::complete_payment`], whose conditional-update
/// guard makes the Success side effects run exactly once no matter how many
/// deliveries or concurrent callers race for the same transaction.
pub struct ReconciliationProcessor {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    issuer: TicketIssuer,
    verifier: SignatureVerifier,
}

impl ReconciliationProcessor {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        issuer: TicketIssuer,
        verifier: SignatureVerifier,
    ) -> Self {
        Self {
            bookings,
            payments,
            gateway,
            issuer,
            verifier,
        }
    }

    /// Webhook entry point: raw body plus the gateway's signature header.
    /// Signature failures are fatal for the delivery (the gateway retries);
    /// consistency failures are logged and reported so redelivery happens.
    pub async fn handle_gateway_event(
        &self,
        raw_body: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, PaymentError> {
        if !self.verifier.verify(raw_body, signature_header) {
            warn!("webhook rejected: signature verification failed");
            return Err(PaymentError::SignatureInvalid);
        }

        let event: GatewayEvent = serde_json::from_slice(raw_body)
            .map_err(|e| PaymentError::MalformedEvent(e.to_string()))?;

        info!(event_id = %event.id, event_type = %event.type_, intent = %event.data.object.id, "gateway event received");

        match event.type_.as_str() {
            EVENT_PAYMENT_SUCCEEDED => {
                let payment = self.resolve_succeeded_payment(&event.data.object).await?;
                let outcome = self.complete_payment(&payment, None).await?;
                Ok(WebhookOutcome::Settled(outcome))
            }
            EVENT_PAYMENT_FAILED => self.handle_failed_event(&event.data.object).await,
            other => {
                info!(event_type = other, "ignoring unrecognized gateway event type");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Synchronous confirmation entry point, for clients that want an
    /// immediate result instead of waiting on webhook delivery. Converges on
    /// the same transition as the webhook path.
    pub async fn confirm_payment(
        &self,
        transaction_id: &str,
        payment_method: Option<&str>,
        return_url: Option<&str>,
    ) -> Result<ConfirmationStatus, PaymentError> {
        let intent = self
            .gateway
            .get_intent(transaction_id)
            .await
            .map_err(PaymentError::Gateway)?;

        // Already settled gateway-side: no duplicate confirm call, just
        // reconcile local state.
        if intent.status == GatewayIntentStatus::Succeeded {
            let payment = self.find_by_transaction(transaction_id).await?;
            let outcome = self.complete_payment(&payment, payment_method).await?;
            return Ok(ConfirmationStatus::Settled(outcome));
        }

        let confirmed = match intent.status {
            GatewayIntentStatus::RequiresPaymentMethod
            | GatewayIntentStatus::RequiresAction
            | GatewayIntentStatus::Processing => self
                .gateway
                .confirm_intent(transaction_id, payment_method, return_url)
                .await
                .map_err(PaymentError::Gateway)?,
            _ => intent,
        };

        match confirmed.status {
            GatewayIntentStatus::Succeeded => {
                let payment = self.find_by_transaction(transaction_id).await?;
                let outcome = self.complete_payment(&payment, payment_method).await?;
                Ok(ConfirmationStatus::Settled(outcome))
            }
            GatewayIntentStatus::Processing => Ok(ConfirmationStatus::Processing),
            GatewayIntentStatus::RequiresAction | GatewayIntentStatus::RequiresPaymentMethod => {
                Ok(ConfirmationStatus::RequiresAction)
            }
            GatewayIntentStatus::Canceled | GatewayIntentStatus::Failed => {
                Ok(ConfirmationStatus::Failed)
            }
        }
    }

    /// The single idempotent transition both entry points share: settle the
    /// payment, confirm the booking, issue tickets. The conditional update in
    /// the payment ledger decides which of any concurrent callers runs the
    /// downstream sequence; everyone else observes the applied state.
    pub async fn complete_payment(
        &self,
        payment: &Payment,
        method: Option<&str>,
    ) -> Result<SettlementOutcome, PaymentError> {
        let won = self
            .payments
            .mark_succeeded(payment.id, method, Utc::now())
            .await
            .map_err(PaymentError::Storage)?;

        if !won {
            info!(payment_id = %payment.id, "payment already settled; no-op");
            return Ok(SettlementOutcome::AlreadySettled);
        }

        self.bookings
            .update_payment_status(payment.booking_id, BookingPaymentStatus::Confirmed)
            .await
            .map_err(PaymentError::Storage)?;

        info!(
            payment_id = %payment.id,
            booking_id = %payment.booking_id,
            "payment settled, booking confirmed"
        );

        // A successful charge is never reversed for a ticketing fault; the
        // anomaly is logged and surfaced as pending instead.
        match self.issuer.issue_for_booking(payment.booking_id).await {
            Ok(tickets) => Ok(SettlementOutcome::Completed {
                payment_id: payment.id,
                booking_id: payment.booking_id,
                tickets_issued: tickets.len(),
            }),
            Err(e) => {
                error!(
                    booking_id = %payment.booking_id,
                    error = %e,
                    "payment received but ticket issuance failed; ticketing pending"
                );
                Ok(SettlementOutcome::TicketsPending {
                    payment_id: payment.id,
                    booking_id: payment.booking_id,
                })
            }
        }
    }

    async fn resolve_succeeded_payment(
        &self,
        object: &GatewayIntentObject,
    ) -> Result<Payment, PaymentError> {
        if let Some(payment) = self
            .payments
            .get_by_transaction_id(&object.id)
            .await
            .map_err(PaymentError::Storage)?
        {
            return Ok(payment);
        }

        // The local row may not have been persisted yet (or this is a
        // test-mode event with no prior intent-creation call). Fall back to
        // the booking's open payment and backfill the transaction id.
        let booking_id = object
            .metadata
            .booking_id
            .ok_or_else(|| PaymentError::MalformedEvent("missing BookingId metadata".into()))?;

        let Some(pending) = self
            .payments
            .latest_pending_for_booking(booking_id)
            .await
            .map_err(PaymentError::Storage)?
        else {
            error!(
                booking_id = %booking_id,
                transaction_id = %object.id,
                "succeeded event references a booking with no pending payment"
            );
            return Err(PaymentError::NoPendingPaymentForBooking(booking_id));
        };

        self.payments
            .set_transaction_id(pending.id, &object.id)
            .await
            .map_err(PaymentError::Storage)?;

        info!(
            payment_id = %pending.id,
            booking_id = %booking_id,
            transaction_id = %object.id,
            "adopted pending payment and backfilled transaction id"
        );

        Ok(Payment {
            transaction_id: Some(object.id.clone()),
            ..pending
        })
    }

    async fn handle_failed_event(
        &self,
        object: &GatewayIntentObject,
    ) -> Result<WebhookOutcome, PaymentError> {
        match self
            .payments
            .get_by_transaction_id(&object.id)
            .await
            .map_err(PaymentError::Storage)?
        {
            Some(payment) => {
                let changed = self
                    .payments
                    .mark_failed(payment.id)
                    .await
                    .map_err(PaymentError::Storage)?;
                if changed {
                    // Booking stays Pending so the customer can retry payment.
                    warn!(
                        payment_id = %payment.id,
                        booking_id = %payment.booking_id,
                        transaction_id = %object.id,
                        "payment marked failed; booking left pending for retry"
                    );
                }
                Ok(WebhookOutcome::MarkedFailed)
            }
            None => {
                warn!(transaction_id = %object.id, "failure event for unknown transaction; acknowledged");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn find_by_transaction(&self, transaction_id: &str) -> Result<Payment, PaymentError> {
        self.payments
            .get_by_transaction_id(transaction_id)
            .await
            .map_err(PaymentError::Storage)?
            .ok_or_else(|| PaymentError::UnknownTransaction(transaction_id.to_string()))
    }
}
