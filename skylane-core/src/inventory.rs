use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightInstance {
    pub id: Uuid,
    pub flight_number: String,
    pub departs_at: DateTime<Utc>,
}

impl FlightInstance {
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.departs_at <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareQuote {
    pub fare_basis_code: String,
    pub base_fare: Decimal,
    pub currency: String,
}

/// Seam onto the flight/schedule reference-data subsystem. The reconciliation
/// core only consults it at booking-creation time.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn flight_instance(
        &self,
        id: Uuid,
    ) -> Result<Option<FlightInstance>, Box<dyn std::error::Error + Send + Sync>>;

    async fn available_seats(
        &self,
        flight_instance_id: Uuid,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>>;

    async fn fare_quote(
        &self,
        flight_instance_id: Uuid,
        fare_basis_code: &str,
    ) -> Result<Option<FareQuote>, Box<dyn std::error::Error + Send + Sync>>;
}

/// In-memory inventory used until the reference-data service is wired in.
pub struct MockInventoryGateway {
    flights: std::sync::Mutex<std::collections::HashMap<Uuid, (FlightInstance, u32)>>,
    fares: std::collections::HashMap<String, Decimal>,
}

impl MockInventoryGateway {
    pub fn new() -> Self {
        let mut fares = std::collections::HashMap::new();
        fares.insert("Y2SAVER".to_string(), Decimal::new(9000, 2));
        fares.insert("Y1FLEX".to_string(), Decimal::new(15000, 2));
        fares.insert("J1BIZ".to_string(), Decimal::new(42000, 2));
        Self {
            flights: std::sync::Mutex::new(std::collections::HashMap::new()),
            fares,
        }
    }

    pub fn add_flight(&self, instance: FlightInstance, available: u32) {
        tracing::debug!(
            flight_instance_id = %instance.id,
            flight_number = %instance.flight_number,
            available,
            "inventory stub registered flight instance"
        );
        self.flights
            .lock()
            .unwrap()
            .insert(instance.id, (instance, available));
    }
}

impl Default for MockInventoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryGateway for MockInventoryGateway {
    async fn flight_instance(
        &self,
        id: Uuid,
    ) -> Result<Option<FlightInstance>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .flights
            .lock()
            .unwrap()
            .get(&id)
            .map(|(instance, _)| instance.clone()))
    }

    async fn available_seats(
        &self,
        flight_instance_id: Uuid,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .flights
            .lock()
            .unwrap()
            .get(&flight_instance_id)
            .map(|(_, available)| *available)
            .unwrap_or(0))
    }

    async fn fare_quote(
        &self,
        _flight_instance_id: Uuid,
        fare_basis_code: &str,
    ) -> Result<Option<FareQuote>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.fares.get(fare_basis_code).map(|fare| FareQuote {
            fare_basis_code: fare_basis_code.to_string(),
            base_fare: *fare,
            currency: "SGD".to_string(),
        }))
    }
}
