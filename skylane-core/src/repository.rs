use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingPassenger, BookingPaymentStatus};
use crate::payment::Payment;
use crate::ticket::Ticket;

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a booking together with its passenger rows in one storage
    /// transaction. Either everything lands or nothing does.
    async fn create_with_passengers(
        &self,
        booking: &Booking,
        passengers: &[BookingPassenger],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn passengers(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<BookingPassenger>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: BookingPaymentStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the payment ledger. The conditional transitions are
/// the concurrency guard for the whole engine: they must be implemented as a
/// single atomic compare-and-set against the stored status, reporting whether
/// the calling request performed the transition.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(
        &self,
        payment: &Payment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>>;

    /// Most recently created Pending payment for the booking, if any. Used by
    /// the webhook fallback when the transaction id lookup misses.
    async fn latest_pending_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>>;

    async fn set_transaction_id(
        &self,
        id: Uuid,
        transaction_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Pending -> Success. Returns true only for the single caller that won
    /// the transition; false means the row was no longer Pending.
    async fn mark_succeeded(
        &self,
        id: Uuid,
        method: Option<&str>,
        transacted_at: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Pending -> Failed. Returns false if the row was not Pending (a late
    /// failure event for a settled payment is a no-op).
    async fn mark_failed(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Success -> Refunded. Returns false if the row was not Success.
    async fn mark_refunded(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for issued tickets
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Persist the full ticket set for a booking in one transaction.
    async fn create_all(
        &self,
        tickets: &[Ticket],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>>;
}
