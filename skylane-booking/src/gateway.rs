use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use skylane_core::payment::{
    GatewayIntent, GatewayIntentStatus, IntentMetadata, PaymentGateway, RefundReason,
};

/// In-process stand-in for the external payment provider. Holds intents in
/// memory and settles them on confirm, so the full reconciliation flow can be
/// exercised without network I/O.
pub struct MockPaymentGateway {
    intents: Mutex<HashMap<String, GatewayIntent>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            intents: Mutex::new(HashMap::new()),
        }
    }

    /// Force a gateway-side status, e.g. to simulate an intent that settled
    /// before the client called confirm.
    pub fn set_intent_status(&self, intent_id: &str, status: GatewayIntentStatus) {
        let mut intents = self.intents.lock().unwrap();
        if let Some(intent) = intents.get_mut(intent_id) {
            intent.status = status;
        }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        _metadata: &IntentMetadata,
    ) -> Result<GatewayIntent, Box<dyn std::error::Error + Send + Sync>> {
        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = GatewayIntent {
            id: id.clone(),
            status: GatewayIntentStatus::RequiresPaymentMethod,
            amount_minor,
            currency: currency.to_string(),
            client_secret: Some(format!("{}_secret_{}", id, Uuid::new_v4().simple())),
        };
        self.intents.lock().unwrap().insert(id, intent.clone());
        Ok(intent)
    }

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<GatewayIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| format!("no such intent: {}", intent_id).into())
    }

    async fn confirm_intent(
        &self,
        intent_id: &str,
        payment_method: Option<&str>,
        _return_url: Option<&str>,
    ) -> Result<GatewayIntent, Box<dyn std::error::Error + Send + Sync>> {
        let mut intents = self.intents.lock().unwrap();
        let intent = intents
            .get_mut(intent_id)
            .ok_or_else(|| format!("no such intent: {}", intent_id))?;

        // Trigger for exercising the declined path.
        intent.status = if payment_method == Some("card_declined") {
            GatewayIntentStatus::Failed
        } else {
            GatewayIntentStatus::Succeeded
        };
        Ok(intent.clone())
    }

    async fn refund(
        &self,
        intent_id: &str,
        _reason: RefundReason,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let intents = self.intents.lock().unwrap();
        let intent = intents
            .get(intent_id)
            .ok_or_else(|| format!("no such intent: {}", intent_id))?;
        if intent.status != GatewayIntentStatus::Succeeded {
            return Err(format!("intent {} is not refundable", intent_id).into());
        }
        Ok(())
    }
}
