#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use skylane_core::booking::{Booking, BookingPassenger, BookingPaymentStatus, SeatAssignment};
use skylane_core::error::SeatConflict;
use skylane_core::inventory::{FareQuote, FlightInstance, InventoryGateway};
use skylane_core::payment::{Payment, PaymentStatus};
use skylane_core::repository::{BookingRepository, PaymentRepository, TicketRepository};
use skylane_core::ticket::Ticket;

/// Single in-memory store backing all three repository traits. Conditional
/// transitions run under one mutex, which makes them atomic the same way the
/// row-count-checked UPDATEs are in the Postgres implementations.
pub struct MemoryStore {
    bookings: Mutex<HashMap<Uuid, Booking>>,
    passengers: Mutex<HashMap<Uuid, Vec<BookingPassenger>>>,
    payments: Mutex<HashMap<Uuid, Payment>>,
    tickets: Mutex<Vec<Ticket>>,
    seat_claims: Mutex<HashSet<(Uuid, Uuid)>>,
    /// Number of times a ticket set was written, for exactly-once assertions.
    pub ticket_writes: AtomicUsize,
    /// When set, ticket writes fail, to exercise the ticketing-pending path.
    pub fail_ticket_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            bookings: Mutex::new(HashMap::new()),
            passengers: Mutex::new(HashMap::new()),
            payments: Mutex::new(HashMap::new()),
            tickets: Mutex::new(Vec::new()),
            seat_claims: Mutex::new(HashSet::new()),
            ticket_writes: AtomicUsize::new(0),
            fail_ticket_writes: AtomicBool::new(false),
        })
    }

    pub fn insert_booking(&self, booking: Booking, passengers: Vec<BookingPassenger>) {
        self.passengers
            .lock()
            .unwrap()
            .insert(booking.id, passengers);
        self.bookings.lock().unwrap().insert(booking.id, booking);
    }

    pub fn insert_payment(&self, payment: Payment) {
        self.payments.lock().unwrap().insert(payment.id, payment);
    }

    pub fn claim_seat(&self, flight_instance_id: Uuid, seat_id: Uuid) {
        self.seat_claims
            .lock()
            .unwrap()
            .insert((flight_instance_id, seat_id));
    }

    pub fn booking(&self, id: Uuid) -> Booking {
        self.bookings.lock().unwrap().get(&id).unwrap().clone()
    }

    pub fn payment(&self, id: Uuid) -> Payment {
        self.payments.lock().unwrap().get(&id).unwrap().clone()
    }

    pub fn tickets_for(&self, booking_id: Uuid) -> Vec<Ticket> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.booking_id == booking_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_with_passengers(
        &self,
        booking: &Booking,
        passengers: &[BookingPassenger],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        {
            let mut claims = self.seat_claims.lock().unwrap();
            for p in passengers {
                if let Some(seat) = p.seat {
                    if !claims.insert((seat.flight_instance_id, seat.seat_id)) {
                        return Err(Box::new(SeatConflict {
                            flight_instance_id: seat.flight_instance_id,
                            seat_id: seat.seat_id,
                        }));
                    }
                }
            }
        }
        self.insert_booking(booking.clone(), passengers.to_vec());
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .values()
            .find(|b| b.booking_reference == reference)
            .cloned())
    }

    async fn passengers(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<BookingPassenger>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .passengers
            .lock()
            .unwrap()
            .get(&booking_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: BookingPaymentStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings.get_mut(&id).ok_or("booking not found")?;
        booking.update_payment_status(status);
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn create(
        &self,
        payment: &Payment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.insert_payment(payment.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.payments.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .find(|p| p.transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    async fn latest_pending_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.booking_id == booking_id && p.status == PaymentStatus::Pending)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn set_transaction_id(
        &self,
        id: Uuid,
        transaction_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments.get_mut(&id).ok_or("payment not found")?;
        payment.transaction_id = Some(transaction_id.to_string());
        payment.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_succeeded(
        &self,
        id: Uuid,
        method: Option<&str>,
        transacted_at: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments.get_mut(&id).ok_or("payment not found")?;
        if payment.status != PaymentStatus::Pending {
            return Ok(false);
        }
        payment.status = PaymentStatus::Success;
        if let Some(m) = method {
            payment.method = Some(m.to_string());
        }
        payment.transacted_at = Some(transacted_at);
        payment.updated_at = Utc::now();
        Ok(true)
    }

    async fn mark_failed(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments.get_mut(&id).ok_or("payment not found")?;
        if payment.status != PaymentStatus::Pending {
            return Ok(false);
        }
        payment.status = PaymentStatus::Failed;
        payment.updated_at = Utc::now();
        Ok(true)
    }

    async fn mark_refunded(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments.get_mut(&id).ok_or("payment not found")?;
        if payment.status != PaymentStatus::Success {
            return Ok(false);
        }
        payment.status = PaymentStatus::Refunded;
        payment.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create_all(
        &self,
        tickets: &[Ticket],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_ticket_writes.load(Ordering::SeqCst) {
            return Err("ticket store unavailable".into());
        }
        self.ticket_writes.fetch_add(1, Ordering::SeqCst);
        self.tickets.lock().unwrap().extend_from_slice(tickets);
        Ok(())
    }

    async fn list_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.tickets_for(booking_id))
    }
}

/// Inventory stub answering for a single flight instance.
pub struct StaticInventory {
    pub instance: FlightInstance,
    pub available: u32,
    pub fares: HashMap<String, FareQuote>,
}

impl StaticInventory {
    pub fn with_flight(departs_in_hours: i64, available: u32) -> Self {
        let mut fares = HashMap::new();
        fares.insert(
            "Y1FLEX".to_string(),
            FareQuote {
                fare_basis_code: "Y1FLEX".to_string(),
                base_fare: Decimal::new(15000, 2),
                currency: "SGD".to_string(),
            },
        );
        Self {
            instance: FlightInstance {
                id: Uuid::new_v4(),
                flight_number: "SL042".to_string(),
                departs_at: Utc::now() + Duration::hours(departs_in_hours),
            },
            available,
            fares,
        }
    }
}

#[async_trait]
impl InventoryGateway for StaticInventory {
    async fn flight_instance(
        &self,
        id: Uuid,
    ) -> Result<Option<FlightInstance>, Box<dyn std::error::Error + Send + Sync>> {
        if id == self.instance.id {
            Ok(Some(self.instance.clone()))
        } else {
            Ok(None)
        }
    }

    async fn available_seats(
        &self,
        _flight_instance_id: Uuid,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.available)
    }

    async fn fare_quote(
        &self,
        _flight_instance_id: Uuid,
        fare_basis_code: &str,
    ) -> Result<Option<FareQuote>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.fares.get(fare_basis_code).cloned())
    }
}

/// Seed a Pending booking with the given passenger count directly into the
/// store, bypassing the orchestrator.
pub fn seeded_booking(
    store: &Arc<MemoryStore>,
    passenger_count: usize,
    total_amount: Decimal,
) -> Booking {
    let booking = Booking::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "Y1FLEX".to_string(),
        total_amount,
        "SGD".to_string(),
    );
    let passengers: Vec<BookingPassenger> = (0..passenger_count)
        .map(|i| {
            BookingPassenger::new(
                booking.id,
                format!("Pax{}", i + 1),
                "Traveler".to_string(),
                None,
            )
        })
        .collect();
    store.insert_booking(booking.clone(), passengers);
    booking
}

#[allow(dead_code)]
pub fn seat(flight_instance_id: Uuid, seat_id: Uuid) -> SeatAssignment {
    SeatAssignment {
        flight_instance_id,
        seat_id,
    }
}
