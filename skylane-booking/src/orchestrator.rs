use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use skylane_core::booking::{Booking, BookingPassenger, CreateBookingRequest, SeatAssignment};
use skylane_core::error::{BookingError, SeatConflict};
use skylane_core::identity::Actor;
use skylane_core::inventory::InventoryGateway;
use skylane_core::repository::BookingRepository;

/// Creates bookings: validates the flight instance and capacity against the
/// inventory subsystem, prices the request, and persists the booking with its
/// passenger rows in one transaction.
pub struct BookingOrchestrator {
    inventory: Arc<dyn InventoryGateway>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingOrchestrator {
    pub fn new(inventory: Arc<dyn InventoryGateway>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self {
            inventory,
            bookings,
        }
    }

    pub async fn create_booking(
        &self,
        req: CreateBookingRequest,
        actor: Actor,
    ) -> Result<(Booking, Vec<BookingPassenger>), BookingError> {
        if req.passengers.is_empty() {
            return Err(BookingError::NoPassengers);
        }
        let requested = req.passengers.len() as u32;

        // 1. Flight instance must exist and still be in the future
        let instance = self
            .inventory
            .flight_instance(req.flight_instance_id)
            .await
            .map_err(BookingError::Inventory)?
            .ok_or(BookingError::FlightNotFound(req.flight_instance_id))?;

        if instance.has_departed(Utc::now()) {
            return Err(BookingError::FlightDeparted(instance.id));
        }

        // 2. Capacity check against reported availability
        let available = self
            .inventory
            .available_seats(req.flight_instance_id)
            .await
            .map_err(BookingError::Inventory)?;
        if available < requested {
            return Err(BookingError::InsufficientCapacity {
                flight_instance_id: req.flight_instance_id,
                requested,
                available,
            });
        }

        // 3. Price from the fare basis plus ancillaries
        let quote = self
            .inventory
            .fare_quote(req.flight_instance_id, &req.fare_basis_code)
            .await
            .map_err(BookingError::Inventory)?
            .ok_or_else(|| BookingError::InvalidFareBasis(req.fare_basis_code.clone()))?;

        let total = quote.base_fare * Decimal::from(requested)
            + req.ancillary_total.unwrap_or(Decimal::ZERO);

        let booking = Booking::new(
            actor.user_id,
            req.flight_instance_id,
            req.fare_basis_code,
            total,
            quote.currency,
        );

        let passengers: Vec<BookingPassenger> = req
            .passengers
            .into_iter()
            .map(|p| {
                let seat = p.seat_id.map(|seat_id| SeatAssignment {
                    flight_instance_id: req.flight_instance_id,
                    seat_id,
                });
                BookingPassenger::new(booking.id, p.first_name, p.last_name, seat)
            })
            .collect();

        // 4. One transaction: booking + passengers + seat claims, or nothing
        if let Err(e) = self
            .bookings
            .create_with_passengers(&booking, &passengers)
            .await
        {
            if let Some(conflict) = e.downcast_ref::<SeatConflict>() {
                return Err(BookingError::SeatAlreadyTaken {
                    flight_instance_id: conflict.flight_instance_id,
                    seat_id: conflict.seat_id,
                });
            }
            return Err(BookingError::Storage(e));
        }

        info!(
            booking_id = %booking.id,
            reference = %booking.booking_reference,
            passengers = passengers.len(),
            "booking created"
        );

        Ok((booking, passengers))
    }

    pub async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<(Booking, Vec<BookingPassenger>)>, BookingError> {
        let Some(booking) = self.bookings.get(id).await.map_err(BookingError::Storage)? else {
            return Ok(None);
        };
        let passengers = self
            .bookings
            .passengers(id)
            .await
            .map_err(BookingError::Storage)?;
        Ok(Some((booking, passengers)))
    }
}
