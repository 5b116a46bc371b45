pub mod gateway;
pub mod intents;
pub mod orchestrator;
pub mod reconcile;
pub mod refund;
pub mod signature;
pub mod tickets;

pub use intents::{PaymentIntentCreated, PaymentIntents};
pub use orchestrator::BookingOrchestrator;
pub use reconcile::{ConfirmationStatus, ReconciliationProcessor, SettlementOutcome, WebhookOutcome};
pub use refund::RefundProcessor;
pub use signature::SignatureVerifier;
pub use tickets::TicketIssuer;
