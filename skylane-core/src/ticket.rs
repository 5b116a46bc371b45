use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Issued,
    Voided,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Issued => "ISSUED",
            TicketStatus::Voided => "VOIDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ISSUED" => Some(TicketStatus::Issued),
            "VOIDED" => Some(TicketStatus::Voided),
            _ => None,
        }
    }
}

/// Append-only output of a successful payment: one per booking passenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub ticket_code: String,
    pub booking_id: Uuid,
    pub passenger_id: Uuid,
    pub flight_instance_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub status: TicketStatus,
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(
        booking_id: Uuid,
        passenger_id: Uuid,
        flight_instance_id: Uuid,
        seat_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_code: new_ticket_code(),
            booking_id,
            passenger_id,
            flight_instance_id,
            seat_id,
            status: TicketStatus::Issued,
            issued_at: Utc::now(),
        }
    }
}

/// Globally unique ticket code shown on itineraries and boarding passes.
pub fn new_ticket_code() -> String {
    format!("TKT-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_codes_are_unique() {
        let a = new_ticket_code();
        let b = new_ticket_code();
        assert_ne!(a, b);
        assert!(a.starts_with("TKT-"));
    }

    #[test]
    fn new_ticket_is_issued() {
        let ticket = Ticket::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None);
        assert_eq!(ticket.status, TicketStatus::Issued);
    }
}
