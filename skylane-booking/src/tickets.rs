use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use skylane_core::booking::BookingPaymentStatus;
use skylane_core::error::TicketError;
use skylane_core::repository::{BookingRepository, TicketRepository};
use skylane_core::ticket::Ticket;

/// Issues the ticket set for a confirmed booking. Idempotent by existence
/// check: if any tickets exist for the booking the stored set is returned
/// unchanged, no matter how many times issuance is invoked.
pub struct TicketIssuer {
    bookings: Arc<dyn BookingRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl TicketIssuer {
    pub fn new(bookings: Arc<dyn BookingRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { bookings, tickets }
    }

    pub async fn issue_for_booking(&self, booking_id: Uuid) -> Result<Vec<Ticket>, TicketError> {
        let booking = self
            .bookings
            .get(booking_id)
            .await
            .map_err(TicketError::Storage)?
            .ok_or(TicketError::BookingNotFound(booking_id))?;

        let existing = self
            .tickets
            .list_for_booking(booking_id)
            .await
            .map_err(TicketError::Storage)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        if booking.payment_status != BookingPaymentStatus::Confirmed {
            return Err(TicketError::PaymentNotSettled(booking_id));
        }

        let passengers = self
            .bookings
            .passengers(booking_id)
            .await
            .map_err(TicketError::Storage)?;

        let tickets: Vec<Ticket> = passengers
            .iter()
            .map(|p| {
                Ticket::new(
                    booking_id,
                    p.id,
                    booking.flight_instance_id,
                    p.seat.map(|s| s.seat_id),
                )
            })
            .collect();

        self.tickets
            .create_all(&tickets)
            .await
            .map_err(TicketError::Storage)?;

        info!(
            booking_id = %booking_id,
            count = tickets.len(),
            "tickets issued"
        );

        Ok(tickets)
    }
}
