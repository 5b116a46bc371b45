use rust_decimal::Decimal;
use uuid::Uuid;

/// Failures of booking creation. All variants are returned synchronously to
/// the caller and never retried by the system.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("flight instance not found: {0}")]
    FlightNotFound(Uuid),

    #[error("flight instance {0} has already departed")]
    FlightDeparted(Uuid),

    #[error("insufficient capacity on flight {flight_instance_id}: requested {requested}, available {available}")]
    InsufficientCapacity {
        flight_instance_id: Uuid,
        requested: u32,
        available: u32,
    },

    #[error("invalid fare basis code: {0}")]
    InvalidFareBasis(String),

    #[error("booking must include at least one passenger")]
    NoPassengers,

    #[error("seat {seat_id} on flight {flight_instance_id} is already taken")]
    SeatAlreadyTaken {
        flight_instance_id: Uuid,
        seat_id: Uuid,
    },

    #[error("inventory gateway error")]
    Inventory(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures of the payment/reconciliation flows, grouped by how they
/// propagate: validation and authorization go back to the caller, gateway
/// errors are retryable by the client or the gateway's own redelivery,
/// consistency errors are operational anomalies.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    // -- Validation --
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("booking {0} is not awaiting payment")]
    BookingNotPending(Uuid),

    #[error("invalid payment amount: {0}")]
    InvalidAmount(Decimal),

    #[error("payment not found: {0}")]
    PaymentNotFound(Uuid),

    #[error("payment {0} is not refundable in its current state")]
    NotRefundable(Uuid),

    // -- Authorization --
    #[error("caller is neither the booking owner nor authorized staff")]
    NotAuthorized,

    // -- Gateway --
    #[error("webhook signature verification failed")]
    SignatureInvalid,

    #[error("malformed gateway event: {0}")]
    MalformedEvent(String),

    #[error("payment gateway error")]
    Gateway(#[source] Box<dyn std::error::Error + Send + Sync>),

    // -- Consistency --
    #[error("no pending payment found for booking {0}")]
    NoPendingPaymentForBooking(Uuid),

    #[error("no local payment recorded for transaction {0}")]
    UnknownTransaction(String),

    // -- Internal --
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Raised by storage implementations when a seat claim trips the
/// (flight_instance_id, seat_id) uniqueness constraint. Travels boxed through
/// the repository seam; callers recover it by downcast.
#[derive(Debug, thiserror::Error)]
#[error("seat {seat_id} on flight {flight_instance_id} is already claimed")]
pub struct SeatConflict {
    pub flight_instance_id: Uuid,
    pub seat_id: Uuid,
}

/// Failures of ticket issuance.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("booking {0} has no settled payment")]
    PaymentNotSettled(Uuid),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}
