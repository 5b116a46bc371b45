use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use skylane_core::booking::{Booking, BookingPassenger, CreateBookingRequest};
use skylane_shared::models::events::BookingCreatedEvent;
use skylane_shared::pii::Masked;

use crate::auth::authenticate;
use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub booking_reference: String,
    pub status: String,
    pub flight_instance_id: Uuid,
    pub fare_basis_code: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub passengers: Vec<PassengerResponse>,
}

#[derive(Debug, Serialize)]
pub struct PassengerResponse {
    pub id: Uuid,
    pub first_name: Masked<String>,
    pub last_name: Masked<String>,
    pub seat_id: Option<Uuid>,
}

fn booking_response(booking: Booking, passengers: Vec<BookingPassenger>) -> BookingResponse {
    BookingResponse {
        booking_id: booking.id,
        booking_reference: booking.booking_reference,
        status: booking.payment_status.as_str().to_string(),
        flight_instance_id: booking.flight_instance_id,
        fare_basis_code: booking.fare_basis_code,
        total_amount: booking.total_amount,
        currency: booking.currency,
        passengers: passengers
            .into_iter()
            .map(|p| PassengerResponse {
                id: p.id,
                first_name: Masked(p.first_name),
                last_name: Masked(p.last_name),
                seat_id: p.seat.map(|s| s.seat_id),
            })
            .collect(),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// Create a booking (status PENDING) with its passengers
async fn create_booking(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let actor = authenticate(&state.auth.secret, bearer.token())?;

    let (booking, passengers) = state.orchestrator.create_booking(req, actor).await?;

    state.telemetry.booking_created(BookingCreatedEvent {
        booking_id: booking.id,
        booking_reference: booking.booking_reference.clone(),
        user_id: booking.user_id,
        flight_instance_id: booking.flight_instance_id,
        passenger_count: passengers.len(),
        total_amount: booking.total_amount,
        currency: booking.currency.clone(),
        timestamp: Utc::now().timestamp(),
    });

    Ok((
        StatusCode::CREATED,
        Json(booking_response(booking, passengers)),
    ))
}

/// GET /v1/bookings/{id}
/// Retrieve a booking; owner or staff only
async fn get_booking(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let actor = authenticate(&state.auth.secret, bearer.token())?;

    let (booking, passengers) = state
        .orchestrator
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("booking not found: {}", booking_id)))?;

    if !actor.can_act_for(booking.user_id) {
        return Err(AppError::AuthorizationError(
            "booking belongs to another customer".to_string(),
        ));
    }

    Ok(Json(booking_response(booking, passengers)))
}
