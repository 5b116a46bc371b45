use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a local payment row. Pending is the only non-terminal state;
/// Success may later move to Refunded through the staff refund flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "SUCCESS" => Some(PaymentStatus::Success),
            "FAILED" => Some(PaymentStatus::Failed),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// One attempted charge against a booking. A booking may accumulate several
/// Failed rows before one reaches Success; at most one ever does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub method: Option<String>,
    pub status: PaymentStatus,
    /// Gateway intent id (e.g. pi_123). Set when the intent is created; the
    /// webhook fallback path may backfill it for adopted rows.
    pub transaction_id: Option<String>,
    pub transacted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        booking_id: Uuid,
        amount: Decimal,
        currency: String,
        transaction_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            amount,
            currency,
            method: None,
            status: PaymentStatus::Pending,
            transaction_id: Some(transaction_id),
            transacted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Gateway-side view of an in-progress charge attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatewayIntentStatus {
    RequiresPaymentMethod,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayIntent {
    pub id: String,
    pub status: GatewayIntentStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub client_secret: Option<String>,
}

/// Fixed set of refund-reason codes the gateway understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    Duplicate,
    Fraudulent,
    RequestedByCustomer,
}

impl RefundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundReason::Duplicate => "duplicate",
            RefundReason::Fraudulent => "fraudulent",
            RefundReason::RequestedByCustomer => "requested_by_customer",
        }
    }

    /// Map a free-form operator reason onto a gateway code.
    pub fn from_operator_reason(reason: &str) -> Self {
        match reason.trim().to_ascii_lowercase().as_str() {
            "duplicate" => RefundReason::Duplicate,
            "fraud" | "fraudulent" => RefundReason::Fraudulent,
            _ => RefundReason::RequestedByCustomer,
        }
    }
}

/// Metadata attached to every intent so webhook events can be joined back to
/// local state even when the transaction id lookup misses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub booking_id: Uuid,
    pub booking_ref: String,
    pub user_id: Uuid,
}

/// I/O boundary around the external payment provider. No business state.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> Result<GatewayIntent, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<GatewayIntent, Box<dyn std::error::Error + Send + Sync>>;

    async fn confirm_intent(
        &self,
        intent_id: &str,
        payment_method: Option<&str>,
        return_url: Option<&str>,
    ) -> Result<GatewayIntent, Box<dyn std::error::Error + Send + Sync>>;

    async fn refund(
        &self,
        intent_id: &str,
        reason: RefundReason,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Convert a decimal major-unit amount into gateway minor units (two decimal
/// places for all supported currencies). Returns None on overflow.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).round().to_i64()
}
