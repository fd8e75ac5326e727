//! Status refresh for one unit, with success tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::client::DeviceClient;
use crate::config::DaikinConfig;
use crate::error::DaikinError;
use crate::protocol::{self, PortStatus, ProtocolError};

/// Fetches the unit's status document and remembers whether the last
/// refresh succeeded.
pub struct UpdateCoordinator<C> {
    client: Arc<C>,
    host: String,
    api_key: String,
    status_endpoint: String,
    device_apn: String,
    update_interval: Duration,
    last_update_success: AtomicBool,
}

impl<C: DeviceClient> UpdateCoordinator<C> {
    #[must_use]
    pub fn new(client: Arc<C>, config: &DaikinConfig) -> Self {
        Self {
            client,
            host: config.host.clone(),
            api_key: config.api_key.clone(),
            status_endpoint: config.status_endpoint.clone(),
            device_apn: config.device_apn.clone(),
            update_interval: config.poll_interval(),
            last_update_success: AtomicBool::new(true),
        }
    }

    /// Fetch and decode the current status.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`DaikinError::UpdateFailed`] wrapping the
    /// client or protocol error behind it.
    pub async fn refresh(&self) -> Result<PortStatus, DaikinError> {
        let result = self.fetch().await;
        self.last_update_success
            .store(result.is_ok(), Ordering::Relaxed);
        result.map_err(|source| DaikinError::UpdateFailed {
            device_apn: self.device_apn.clone(),
            source: Box::new(source),
        })
    }

    async fn fetch(&self) -> Result<PortStatus, DaikinError> {
        let doc = match self
            .client
            .get_status(&self.host, &self.api_key, &self.status_endpoint)
            .await
        {
            Ok(doc) => doc,
            Err(err) => {
                tracing::debug!(%err, "Error fetching data for {}", self.device_apn);
                return Err(err.into());
            }
        };

        if !doc.is_object() {
            tracing::debug!("Unable to retrieve device status data for {}", self.device_apn);
            return Err(ProtocolError::NotAnObject.into());
        }

        Ok(protocol::parse_status(&doc)?)
    }

    /// Whether the most recent [`refresh`](Self::refresh) succeeded. Polls
    /// set the entity's availability from it.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    #[must_use]
    pub fn device_apn(&self) -> &str {
        &self.device_apn
    }
}
