use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};

use skylane_booking::WebhookOutcome;

use crate::error::AppError;
use crate::payments::emit_settlement;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "Skylane-Signature";

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

/// POST /v1/webhooks/payments
/// Gateway notification endpoint. Authenticated by payload signature, not by
/// bearer token. Any non-2xx response makes the gateway redeliver.
async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let outcome = state
        .reconciler
        .handle_gateway_event(&body, signature)
        .await?;

    if let WebhookOutcome::Settled(settlement) = &outcome {
        emit_settlement(&state, settlement);
    }

    Ok(StatusCode::OK)
}
