//! Command dispatch: serialise a [`Command`], send it to the unit and decode
//! the status document the unit answers with.

use std::sync::Arc;

use crate::client::DeviceClient;
use crate::config::DaikinConfig;
use crate::error::DaikinError;
use crate::protocol::{self, Command, PortStatus};

pub struct CommandDispatcher<C> {
    client: Arc<C>,
    host: String,
    api_key: String,
    command_suffix: String,
    device_apn: String,
}

impl<C: DeviceClient> CommandDispatcher<C> {
    #[must_use]
    pub fn new(client: Arc<C>, config: &DaikinConfig) -> Self {
        Self {
            client,
            host: config.host.clone(),
            api_key: config.api_key.clone(),
            command_suffix: config.command_suffix.clone(),
            device_apn: config.device_apn.clone(),
        }
    }

    /// Send `command` and return the unit's reported status after applying it.
    ///
    /// # Errors
    ///
    /// Returns [`DaikinError::Client`] when the exchange fails and
    /// [`DaikinError::Protocol`] when the response is not a status document.
    #[tracing::instrument(skip(self), fields(device_apn = %self.device_apn))]
    pub async fn dispatch(&self, command: Command) -> Result<PortStatus, DaikinError> {
        let payload = command.encode();
        tracing::debug!(%payload, "send command request");

        let response = self
            .client
            .send_command(&self.host, &self.api_key, &payload, &self.command_suffix)
            .await?;
        tracing::debug!(%response, "send command response");

        Ok(protocol::parse_status(&response)?)
    }
}
