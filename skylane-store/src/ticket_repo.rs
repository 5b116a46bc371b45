use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use skylane_core::repository::TicketRepository;
use skylane_core::ticket::{Ticket, TicketStatus};

pub struct StoreTicketRepository {
    pool: PgPool,
}

impl StoreTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    ticket_code: String,
    booking_id: Uuid,
    passenger_id: Uuid,
    flight_instance_id: Uuid,
    seat_id: Option<Uuid>,
    status: String,
    issued_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> Result<Ticket, Box<dyn std::error::Error + Send + Sync>> {
        let status = TicketStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown ticket status: {}", self.status))?;
        Ok(Ticket {
            id: self.id,
            ticket_code: self.ticket_code,
            booking_id: self.booking_id,
            passenger_id: self.passenger_id,
            flight_instance_id: self.flight_instance_id,
            seat_id: self.seat_id,
            status,
            issued_at: self.issued_at,
        })
    }
}

#[async_trait]
impl TicketRepository for StoreTicketRepository {
    async fn create_all(
        &self,
        tickets: &[Ticket],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;
        for ticket in tickets {
            sqlx::query(
                "INSERT INTO tickets (id, ticket_code, booking_id, passenger_id, \
                 flight_instance_id, seat_id, status, issued_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(ticket.id)
            .bind(&ticket.ticket_code)
            .bind(ticket.booking_id)
            .bind(ticket.passenger_id)
            .bind(ticket.flight_instance_id)
            .bind(ticket.seat_id)
            .bind(ticket.status.as_str())
            .bind(ticket.issued_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<Ticket>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT id, ticket_code, booking_id, passenger_id, flight_instance_id, \
             seat_id, status, issued_at \
             FROM tickets WHERE booking_id = $1 ORDER BY issued_at",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TicketRow::into_ticket).collect()
    }
}
