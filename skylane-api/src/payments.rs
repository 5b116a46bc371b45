use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skylane_booking::{ConfirmationStatus, PaymentIntentCreated, SettlementOutcome};
use skylane_core::payment::RefundReason;
use skylane_shared::models::events::{PaymentRefundedEvent, PaymentSettledEvent};

use crate::auth::authenticate;
use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub amount_override: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub transaction_id: String,
    pub payment_method: Option<String>,
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets_issued: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticketing: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub payment_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{id}/payment-intent", post(create_payment_intent))
        .route("/v1/payments/confirm", post(confirm_payment))
        .route("/v1/payments/refund", post(refund_payment))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings/{id}/payment-intent
/// Create a gateway intent and the local payment row for a pending booking
async fn create_payment_intent(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<Json<PaymentIntentCreated>, AppError> {
    let actor = authenticate(&state.auth.secret, bearer.token())?;

    let created = state
        .intents
        .create(booking_id, req.amount_override, req.currency, actor)
        .await?;

    Ok(Json(created))
}

/// POST /v1/payments/confirm
/// Synchronous confirmation: drive the intent to a terminal state now instead
/// of waiting for webhook delivery
async fn confirm_payment(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, AppError> {
    authenticate(&state.auth.secret, bearer.token())?;

    let status = state
        .reconciler
        .confirm_payment(
            &req.transaction_id,
            req.payment_method.as_deref(),
            req.return_url.as_deref(),
        )
        .await?;

    let response = match status {
        ConfirmationStatus::Settled(outcome) => {
            emit_settlement(&state, &outcome);
            match outcome {
                SettlementOutcome::Completed { tickets_issued, .. } => ConfirmPaymentResponse {
                    status: "succeeded",
                    tickets_issued: Some(tickets_issued),
                    ticketing: None,
                },
                SettlementOutcome::AlreadySettled => ConfirmPaymentResponse {
                    status: "succeeded",
                    tickets_issued: None,
                    ticketing: None,
                },
                SettlementOutcome::TicketsPending { .. } => ConfirmPaymentResponse {
                    status: "succeeded",
                    tickets_issued: None,
                    ticketing: Some("pending"),
                },
            }
        }
        ConfirmationStatus::Processing => ConfirmPaymentResponse {
            status: "processing",
            tickets_issued: None,
            ticketing: None,
        },
        ConfirmationStatus::RequiresAction => ConfirmPaymentResponse {
            status: "requires_action",
            tickets_issued: None,
            ticketing: None,
        },
        ConfirmationStatus::Failed => ConfirmPaymentResponse {
            status: "failed",
            tickets_issued: None,
            ticketing: None,
        },
    };

    Ok(Json(response))
}

/// POST /v1/payments/refund
/// Staff-only: reverse a settled charge and cancel its booking
async fn refund_payment(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, AppError> {
    let actor = authenticate(&state.auth.secret, bearer.token())?;

    let payment = state.refunds.refund(req.payment_id, &req.reason, actor).await?;

    state.telemetry.payment_refunded(PaymentRefundedEvent {
        payment_id: payment.id,
        booking_id: payment.booking_id,
        reason_code: RefundReason::from_operator_reason(&req.reason)
            .as_str()
            .to_string(),
        timestamp: Utc::now().timestamp(),
    });

    Ok(Json(RefundResponse {
        payment_id: payment.id,
        booking_id: payment.booking_id,
        status: payment.status.as_str().to_string(),
    }))
}

pub(crate) fn emit_settlement(state: &AppState, outcome: &SettlementOutcome) {
    match outcome {
        SettlementOutcome::Completed {
            payment_id,
            booking_id,
            tickets_issued,
        } => state.telemetry.payment_settled(PaymentSettledEvent {
            payment_id: *payment_id,
            booking_id: *booking_id,
            tickets_issued: Some(*tickets_issued),
            timestamp: Utc::now().timestamp(),
        }),
        SettlementOutcome::TicketsPending {
            payment_id,
            booking_id,
        } => state.telemetry.payment_settled(PaymentSettledEvent {
            payment_id: *payment_id,
            booking_id: *booking_id,
            tickets_issued: None,
            timestamp: Utc::now().timestamp(),
        }),
        // Nothing new happened; the original settlement was already logged.
        SettlementOutcome::AlreadySettled => {}
    }
}
