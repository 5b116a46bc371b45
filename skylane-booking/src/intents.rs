use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use skylane_core::booking::BookingPaymentStatus;
use skylane_core::error::PaymentError;
use skylane_core::identity::Actor;
use skylane_core::payment::{to_minor_units, IntentMetadata, Payment, PaymentGateway};
use skylane_core::repository::{BookingRepository, PaymentRepository};

#[derive(Debug, Serialize)]
pub struct PaymentIntentCreated {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub publishable_key: String,
    pub amount: i64,
    pub currency: String,
}

/// Creates gateway payment intents for pending bookings and records the local
/// ledger row that later joins webhook events back to the booking.
pub struct PaymentIntents {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    publishable_key: String,
}

impl PaymentIntents {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        publishable_key: String,
    ) -> Self {
        Self {
            bookings,
            payments,
            gateway,
            publishable_key,
        }
    }

    pub async fn create(
        &self,
        booking_id: Uuid,
        amount_override: Option<Decimal>,
        currency: Option<String>,
        actor: Actor,
    ) -> Result<PaymentIntentCreated, PaymentError> {
        let booking = self
            .bookings
            .get(booking_id)
            .await
            .map_err(PaymentError::Storage)?
            .ok_or(PaymentError::BookingNotFound(booking_id))?;

        if !actor.can_act_for(booking.user_id) {
            return Err(PaymentError::NotAuthorized);
        }
        if booking.payment_status != BookingPaymentStatus::Pending {
            return Err(PaymentError::BookingNotPending(booking_id));
        }

        // An explicit override must be positive; absent one, charge the
        // booking's stored total.
        let amount = match amount_override {
            Some(o) if o > Decimal::ZERO => o,
            Some(o) => return Err(PaymentError::InvalidAmount(o)),
            None => booking.total_amount,
        };
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }
        let amount_minor = to_minor_units(amount).ok_or(PaymentError::InvalidAmount(amount))?;

        let currency = currency.unwrap_or_else(|| booking.currency.clone());
        let metadata = IntentMetadata {
            booking_id: booking.id,
            booking_ref: booking.booking_reference.clone(),
            user_id: booking.user_id,
        };

        let intent = self
            .gateway
            .create_intent(amount_minor, &currency, &metadata)
            .await
            .map_err(PaymentError::Gateway)?;

        // Persist the local row before returning the client secret, so the
        // join key exists before any webhook for this intent can arrive.
        let payment = Payment::new(booking.id, amount, currency.clone(), intent.id.clone());
        self.payments
            .create(&payment)
            .await
            .map_err(PaymentError::Storage)?;

        info!(
            booking_id = %booking.id,
            payment_id = %payment.id,
            transaction_id = %intent.id,
            amount_minor,
            "payment intent created"
        );

        Ok(PaymentIntentCreated {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            publishable_key: self.publishable_key.clone(),
            amount: amount_minor,
            currency,
        })
    }
}
