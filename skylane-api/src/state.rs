use std::sync::Arc;

use skylane_booking::{BookingOrchestrator, PaymentIntents, ReconciliationProcessor, RefundProcessor};

use crate::telemetry::Telemetry;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub intents: Arc<PaymentIntents>,
    pub reconciler: Arc<ReconciliationProcessor>,
    pub refunds: Arc<RefundProcessor>,
    pub telemetry: Arc<Telemetry>,
    pub auth: AuthConfig,
}
