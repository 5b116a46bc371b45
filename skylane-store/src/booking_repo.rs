use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use skylane_core::booking::{Booking, BookingPassenger, BookingPaymentStatus, SeatAssignment};
use skylane_core::error::SeatConflict;
use skylane_core::repository::BookingRepository;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    flight_instance_id: Uuid,
    fare_basis_code: String,
    booking_reference: String,
    total_amount: Decimal,
    currency: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let payment_status = BookingPaymentStatus::parse(&self.payment_status)
            .ok_or_else(|| format!("unknown booking payment status: {}", self.payment_status))?;
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            flight_instance_id: self.flight_instance_id,
            fare_basis_code: self.fare_basis_code,
            booking_reference: self.booking_reference,
            total_amount: self.total_amount,
            currency: self.currency,
            payment_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    booking_id: Uuid,
    first_name: String,
    last_name: String,
    seat_flight_instance_id: Option<Uuid>,
    seat_id: Option<Uuid>,
}

impl PassengerRow {
    fn into_passenger(self) -> BookingPassenger {
        let seat = match (self.seat_flight_instance_id, self.seat_id) {
            (Some(flight_instance_id), Some(seat_id)) => Some(SeatAssignment {
                flight_instance_id,
                seat_id,
            }),
            _ => None,
        };
        BookingPassenger {
            id: self.id,
            booking_id: self.booking_id,
            first_name: self.first_name,
            last_name: self.last_name,
            seat,
        }
    }
}

const SELECT_BOOKING: &str = "SELECT id, user_id, flight_instance_id, fare_basis_code, \
     booking_reference, total_amount, currency, payment_status, created_at, updated_at \
     FROM bookings";

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_with_passengers(
        &self,
        booking: &Booking,
        passengers: &[BookingPassenger],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO bookings (id, user_id, flight_instance_id, fare_basis_code, \
             booking_reference, total_amount, currency, payment_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.flight_instance_id)
        .bind(&booking.fare_basis_code)
        .bind(&booking.booking_reference)
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .bind(booking.payment_status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        for p in passengers {
            let result = sqlx::query(
                "INSERT INTO booking_passengers \
                 (id, booking_id, first_name, last_name, seat_flight_instance_id, seat_id) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(p.id)
            .bind(p.booking_id)
            .bind(&p.first_name)
            .bind(&p.last_name)
            .bind(p.seat.map(|s| s.flight_instance_id))
            .bind(p.seat.map(|s| s.seat_id))
            .execute(&mut *tx)
            .await;

            if let Err(sqlx::Error::Database(db_err)) = &result {
                if db_err.is_unique_violation() {
                    if let Some(seat) = p.seat {
                        return Err(Box::new(SeatConflict {
                            flight_instance_id: seat.flight_instance_id,
                            seat_id: seat.seat_id,
                        }));
                    }
                }
            }
            result?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("{} WHERE id = $1 AND is_deleted = FALSE", SELECT_BOOKING))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "{} WHERE booking_reference = $1 AND is_deleted = FALSE",
            SELECT_BOOKING
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn passengers(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<BookingPassenger>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<PassengerRow> = sqlx::query_as(
            "SELECT id, booking_id, first_name, last_name, seat_flight_instance_id, seat_id \
             FROM booking_passengers WHERE booking_id = $1 ORDER BY created_at",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PassengerRow::into_passenger).collect())
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: BookingPaymentStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE bookings SET payment_status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
