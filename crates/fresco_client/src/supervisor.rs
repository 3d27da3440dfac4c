//! Home Assistant supervisor API client.

use crate::{EventSink, StateSource};
use async_trait::async_trait;
use fresco_core::EntityState;
use fresco_error::{ClientError, ClientErrorKind, FrescoResult};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the supervisor core API: state snapshots and outbound events.
#[derive(Debug, Clone)]
pub struct SupervisorClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SupervisorClient {
    /// Creates a new supervisor client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base, e.g. `http://supervisor/core/api`
    /// * `token` - Bearer token; `None` disables fetches and events with a
    ///   warning instead of an error at call time
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn token(&self) -> FrescoResult<&str> {
        self.token.as_deref().ok_or_else(|| {
            ClientError::new(ClientErrorKind::MissingCredential("SUPERVISOR_TOKEN".into())).into()
        })
    }
}

#[async_trait]
impl StateSource for SupervisorClient {
    #[instrument(skip(self))]
    async fn fetch_states(&self) -> FrescoResult<Vec<EntityState>> {
        let token = self.token()?;
        let response = self
            .client
            .get(format!("{}/states", self.base_url))
            .bearer_auth(token)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| ClientError::new(ClientErrorKind::Request(e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::new(ClientErrorKind::Api { status, message }).into());
        }

        let states: Vec<EntityState> = response
            .json()
            .await
            .map_err(|e| ClientError::new(ClientErrorKind::Parse(e.to_string())))?;
        debug!(count = states.len(), "fetched entity states");
        Ok(states)
    }
}

#[async_trait]
impl EventSink for SupervisorClient {
    #[instrument(skip(self, data))]
    async fn fire_event(&self, event_type: &str, data: &serde_json::Value) {
        let token = match &self.token {
            Some(token) => token,
            None => {
                warn!(event_type, "no supervisor token, cannot fire event");
                return;
            }
        };

        let result = self
            .client
            .post(format!("{}/events/{}", self.base_url, event_type))
            .bearer_auth(token)
            .timeout(API_TIMEOUT)
            .json(data)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(event_type, status = %response.status(), "fired event");
            }
            Ok(response) => {
                warn!(event_type, status = %response.status(), "event rejected");
            }
            Err(error) => {
                warn!(event_type, error = %error, "failed to fire event");
            }
        }
    }
}
