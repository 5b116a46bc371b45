use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use skylane_api::{app, state::{AppState, AuthConfig}};
use skylane_booking::gateway::MockPaymentGateway;
use skylane_booking::{
    BookingOrchestrator, PaymentIntents, ReconciliationProcessor, RefundProcessor,
    SignatureVerifier, TicketIssuer,
};
use skylane_core::inventory::{FlightInstance, InventoryGateway, MockInventoryGateway};
use skylane_core::payment::PaymentGateway;
use skylane_core::repository::{BookingRepository, PaymentRepository, TicketRepository};
use skylane_store::{
    DbClient, StoreBookingRepository, StorePaymentRepository, StoreTicketRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skylane_store::app_config::Config::load()?;
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let bookings: Arc<dyn BookingRepository> =
        Arc::new(StoreBookingRepository::new(db.pool.clone()));
    let payments: Arc<dyn PaymentRepository> =
        Arc::new(StorePaymentRepository::new(db.pool.clone()));
    let tickets: Arc<dyn TicketRepository> = Arc::new(StoreTicketRepository::new(db.pool.clone()));

    // External collaborators: swapped for the real reference-data service and
    // payment provider by configuration at deployment time.
    let inventory = MockInventoryGateway::new();
    let demo_flight = FlightInstance {
        id: Uuid::new_v4(),
        flight_number: "SL042".to_string(),
        departs_at: Utc::now() + Duration::days(30),
    };
    tracing::info!(flight_instance_id = %demo_flight.id, "seeded demo flight instance");
    inventory.add_flight(demo_flight, 180);
    let inventory: Arc<dyn InventoryGateway> = Arc::new(inventory);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(MockPaymentGateway::new());

    let orchestrator = BookingOrchestrator::new(inventory, bookings.clone());
    let intents = PaymentIntents::new(
        bookings.clone(),
        payments.clone(),
        gateway.clone(),
        config.gateway.publishable_key.clone(),
    );
    let issuer = TicketIssuer::new(bookings.clone(), tickets.clone());
    let reconciler = ReconciliationProcessor::new(
        bookings.clone(),
        payments.clone(),
        gateway.clone(),
        issuer,
        SignatureVerifier::new(config.gateway.webhook_secret.clone()),
    );
    let refunds = RefundProcessor::new(bookings.clone(), payments.clone(), gateway.clone());

    let app_state = AppState {
        orchestrator: Arc::new(orchestrator),
        intents: Arc::new(intents),
        reconciler: Arc::new(reconciler),
        refunds: Arc::new(refunds),
        telemetry: Arc::new(skylane_api::telemetry::Telemetry::new()),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
