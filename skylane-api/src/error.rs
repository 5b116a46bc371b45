use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use skylane_core::error::{BookingError, PaymentError, TicketError};

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    GatewayError(String),
    ConsistencyError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::GatewayError(msg) => {
                tracing::error!("Payment gateway error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::ConsistencyError(msg) => {
                // Operational anomaly; the webhook caller is the gateway, so
                // the body stays terse and the detail goes to the log.
                tracing::error!("Consistency error: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match &err {
            BookingError::FlightNotFound(_) => AppError::NotFoundError(err.to_string()),
            BookingError::FlightDeparted(_)
            | BookingError::InvalidFareBasis(_)
            | BookingError::NoPassengers => AppError::ValidationError(err.to_string()),
            BookingError::InsufficientCapacity { .. } | BookingError::SeatAlreadyTaken { .. } => {
                AppError::ConflictError(err.to_string())
            }
            BookingError::Inventory(_) => AppError::GatewayError(err.to_string()),
            BookingError::Storage(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match &err {
            PaymentError::BookingNotFound(_) | PaymentError::PaymentNotFound(_) => {
                AppError::NotFoundError(err.to_string())
            }
            PaymentError::BookingNotPending(_) | PaymentError::NotRefundable(_) => {
                AppError::ConflictError(err.to_string())
            }
            PaymentError::InvalidAmount(_)
            | PaymentError::SignatureInvalid
            | PaymentError::MalformedEvent(_) => AppError::ValidationError(err.to_string()),
            PaymentError::NotAuthorized => AppError::AuthorizationError(err.to_string()),
            PaymentError::Gateway(_) => AppError::GatewayError(err.to_string()),
            PaymentError::NoPendingPaymentForBooking(_) | PaymentError::UnknownTransaction(_) => {
                AppError::ConsistencyError(err.to_string())
            }
            PaymentError::Storage(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match &err {
            TicketError::BookingNotFound(_) => AppError::NotFoundError(err.to_string()),
            TicketError::PaymentNotSettled(_) => AppError::ConflictError(err.to_string()),
            TicketError::Storage(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}
