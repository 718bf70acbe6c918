use std::sync::Arc;

use shared::domain::EventRecord;
use tracing::{error, info};

use crate::{error::RegistrationError, gateway::EventGateway};

/// Fetches the single active event once. There is no retry and no timeout
/// beyond whatever the gateway's HTTP client carries.
pub struct EventLoader {
    gateway: Arc<dyn EventGateway>,
}

impl EventLoader {
    pub fn new(gateway: Arc<dyn EventGateway>) -> Self {
        Self { gateway }
    }

    pub async fn fetch(&self) -> Result<EventRecord, RegistrationError> {
        self.gateway
            .latest_event()
            .await
            .map_err(|err| RegistrationError::UnrecoverableLoadFailure(err.to_string()))
    }

    /// Like [`fetch`](Self::fetch), but a failure is only logged and the
    /// event stays unset.
    pub async fn load(&self) -> Option<EventRecord> {
        match self.fetch().await {
            Ok(event) => {
                info!(event_id = %event.id, title = %event.title, "event: loaded active event");
                Some(event)
            }
            Err(err) => {
                error!(%err, "event: latest event unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/event_loader_tests.rs"]
mod tests;
