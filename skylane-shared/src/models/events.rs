use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub booking_reference: String,
    pub user_id: Uuid,
    pub flight_instance_id: Uuid,
    pub passenger_count: usize,
    pub total_amount: Decimal,
    pub currency: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentSettledEvent {
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub tickets_issued: Option<usize>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentRefundedEvent {
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub reason_code: String,
    pub timestamp: i64,
}
