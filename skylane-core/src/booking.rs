use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment-facing lifecycle of a booking. A booking is created Pending and is
/// only moved by the reconciliation engine (Confirmed/Cancelled) or an
/// explicit cancel action. Rows are never hard-deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingPaymentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Failed,
}

impl BookingPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingPaymentStatus::Pending => "PENDING",
            BookingPaymentStatus::Confirmed => "CONFIRMED",
            BookingPaymentStatus::Cancelled => "CANCELLED",
            BookingPaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingPaymentStatus::Pending),
            "CONFIRMED" => Some(BookingPaymentStatus::Confirmed),
            "CANCELLED" => Some(BookingPaymentStatus::Cancelled),
            "FAILED" => Some(BookingPaymentStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reservation attempt against a flight instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_instance_id: Uuid,
    pub fare_basis_code: String,
    pub booking_reference: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_status: BookingPaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        user_id: Uuid,
        flight_instance_id: Uuid,
        fare_basis_code: String,
        total_amount: Decimal,
        currency: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            flight_instance_id,
            fare_basis_code,
            booking_reference: new_booking_reference(),
            total_amount,
            currency,
            payment_status: BookingPaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_payment_status(&mut self, status: BookingPaymentStatus) {
        self.payment_status = status;
        self.updated_at = Utc::now();
    }
}

/// One passenger on a booking. Created alongside the booking; the seat claim
/// may be attached later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPassenger {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub seat: Option<SeatAssignment>,
}

impl BookingPassenger {
    pub fn new(
        booking_id: Uuid,
        first_name: String,
        last_name: String,
        seat: Option<SeatAssignment>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            first_name,
            last_name,
            seat,
        }
    }
}

/// A claim on a seat of a flight instance. Exclusivity is enforced by the
/// storage layer: one active claim per (flight_instance_id, seat_id).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatAssignment {
    pub flight_instance_id: Uuid,
    pub seat_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub flight_instance_id: Uuid,
    pub fare_basis_code: String,
    pub passengers: Vec<PassengerInput>,
    pub ancillary_total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct PassengerInput {
    pub first_name: String,
    pub last_name: String,
    pub seat_id: Option<Uuid>,
}

/// Short human-readable reference, distinct from the booking's uuid.
pub fn new_booking_reference() -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("SKY{}", &raw[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            BookingPaymentStatus::Pending,
            BookingPaymentStatus::Confirmed,
            BookingPaymentStatus::Cancelled,
            BookingPaymentStatus::Failed,
        ] {
            assert_eq!(BookingPaymentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingPaymentStatus::parse("PAID"), None);
    }

    #[test]
    fn new_booking_starts_pending() {
        let booking = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Y1FLEX".to_string(),
            Decimal::new(30000, 2),
            "SGD".to_string(),
        );
        assert_eq!(booking.payment_status, BookingPaymentStatus::Pending);
        assert!(booking.booking_reference.starts_with("SKY"));
        assert_eq!(booking.booking_reference.len(), 9);
    }
}
