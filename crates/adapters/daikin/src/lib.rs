//! # acbridge-adapter-daikin
//!
//! Daikin smart air-conditioner integration: exposes each configured unit as
//! a `climate` entity, kept in sync over the unit's local JSON protocol.
//!
//! ## How it works
//!
//! On setup the integration queries the unit once, registers its device and
//! climate entity, then polls every `poll_interval_secs`. Service calls are
//! planned against the mirrored state, sent to the unit, and the status the
//! unit answers with is applied immediately; the next poll is then skipped.
//!
//! ## Supported services
//!
//! | Service | Field | Restriction |
//! |---------|-------|-------------|
//! | `set_hvac_mode` | `hvac_mode` | none |
//! | `set_fan_mode` | `fan_mode` | not in `dry` |
//! | `set_temperature` | `temperature` | not in `fan_only` / `dry`; 16..=32 in `cool`, else 10..=32 |
//! | `set_preset_mode` | `preset_mode` | unit must be on |
//! | `set_swing_mode` | `swing_mode` | none |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `acbridge-app` and `acbridge-domain`.
//! Transport and encryption stay behind the [`DeviceClient`] port.

pub mod client;
pub mod climate;
mod config;
mod coordinator;
mod dispatcher;
mod error;
pub mod mapping;
mod polling;
pub mod protocol;
mod simulator;

pub use client::{ClientError, DeviceClient};
pub use climate::{DaikinClimate, ServiceRequest};
pub use config::{DaikinConfig, MAX_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS};
pub use coordinator::UpdateCoordinator;
pub use dispatcher::CommandDispatcher;
pub use error::DaikinError;
pub use simulator::SimulatedDevice;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use acbridge_app::ports::{DiscoveredDevice, Integration, IntegrationContext};
use acbridge_domain::entity::Entity;
use acbridge_domain::error::{AcBridgeError, NotFoundError, ValidationError};
use acbridge_domain::id::EntityId;

use crate::protocol::ProtocolError;

/// Name under which devices of this integration are registered.
pub const INTEGRATION_NAME: &str = "daikin_br";

/// One configured Daikin unit.
pub struct DaikinIntegration<C> {
    config: DaikinConfig,
    entity_id: EntityId,
    climate: Arc<Mutex<DaikinClimate>>,
    coordinator: Arc<UpdateCoordinator<C>>,
    dispatcher: CommandDispatcher<C>,
    poll_handle: Option<JoinHandle<()>>,
}

impl<C: DeviceClient> DaikinIntegration<C> {
    #[must_use]
    pub fn new(config: DaikinConfig, client: C) -> Self {
        let client = Arc::new(client);
        let climate = DaikinClimate::new(config.device_apn.clone(), config.device_name.clone());
        Self {
            entity_id: climate.entity_id(),
            climate: Arc::new(Mutex::new(climate)),
            coordinator: Arc::new(UpdateCoordinator::new(Arc::clone(&client), &config)),
            dispatcher: CommandDispatcher::new(client, &config),
            config,
            poll_handle: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DaikinConfig {
        &self.config
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.entity_id == entity_id
    }

    /// A copy of the mirrored unit state.
    pub async fn snapshot(&self) -> DaikinClimate {
        self.climate.lock().await.clone()
    }

    /// Whether the most recent status refresh reached the unit.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.coordinator.last_update_success()
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll_handle.is_some()
    }

    /// Run one poll cycle now, outside the background schedule.
    ///
    /// # Errors
    ///
    /// Returns an error only when reporting through `ctx` fails.
    pub async fn poll_once(&self, ctx: &impl IntegrationContext) -> Result<(), AcBridgeError> {
        polling::poll_once(&self.climate, &self.coordinator, ctx).await
    }
}

impl<C: DeviceClient + 'static> Integration for DaikinIntegration<C> {
    fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    #[tracing::instrument(skip_all, fields(device_apn = %self.config.device_apn))]
    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), AcBridgeError> {
        if self.config.api_key.is_empty() {
            tracing::error!("Device key is missing in the configuration entry!");
            return Err(ValidationError::MissingField("api_key").into());
        }
        self.config.validate().map_err(DaikinError::Config)?;

        tracing::debug!(
            device_name = %self.config.device_name,
            device_apn = %self.config.device_apn,
            "initializing climate entity"
        );

        let discovered = {
            let mut climate = self.climate.lock().await;
            match self.coordinator.refresh().await {
                Ok(status) => {
                    if let Some(firmware) = &status.fw_ver {
                        climate.set_firmware(firmware.as_str());
                    }
                    climate.apply_status(&status);
                    climate.set_available(true);
                    climate.request_skip_update();
                }
                Err(err) => {
                    log_setup_failure(&err);
                    climate.set_available(false);
                }
            }
            DiscoveredDevice {
                device: climate.device()?,
                entities: vec![climate.to_entity()?],
            }
        };

        ctx.persist_discovered(discovered).await?;
        tracing::info!("daikin unit registered");
        Ok(())
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), AcBridgeError> {
        if let Some(previous) = self.poll_handle.take() {
            previous.abort();
        }
        tracing::debug!(
            device_apn = %self.config.device_apn,
            interval_secs = self.coordinator.update_interval().as_secs(),
            "registering periodic polling"
        );
        self.poll_handle = Some(polling::Poller::start(
            Arc::clone(&self.climate),
            Arc::clone(&self.coordinator),
            ctx,
        ));
        Ok(())
    }

    #[tracing::instrument(skip(self, data), fields(device_apn = %self.config.device_apn))]
    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, AcBridgeError> {
        if !self.owns_entity(entity_id) {
            return Err(NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            }
            .into());
        }

        let mut climate = self.climate.lock().await;
        let command = ServiceRequest::parse(service, &data)
            .and_then(|request| climate.plan(request))
            .inspect_err(|err| {
                tracing::error!(
                    entity_id = %climate.entity_id_string(),
                    error = %err,
                    "service call rejected"
                );
            })
            .map_err(DaikinError::Rejected)?;

        match self.dispatcher.dispatch(command).await {
            Ok(status) => {
                climate.apply_status(&status);
                climate.set_available(true);
                climate.request_skip_update();
            }
            Err(err) => {
                tracing::error!(
                    error = %err.cause(),
                    device_apn = climate.unique_id(),
                    "error executing command"
                );
                return Err(err.into());
            }
        }

        climate.to_entity()
    }

    async fn teardown(&mut self) -> Result<(), AcBridgeError> {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
            tracing::debug!("removing update listener");
        }
        tracing::info!(device_apn = %self.config.device_apn, "daikin integration unloaded");
        Ok(())
    }
}

fn log_setup_failure(err: &DaikinError) {
    match err.cause() {
        DaikinError::Protocol(ProtocolError::MissingPort) => {
            tracing::error!("Device setup failed. Invalid device key.");
        }
        DaikinError::Protocol(cause) => {
            tracing::error!(%cause, "configuration error");
        }
        DaikinError::Client(ClientError::Timeout) => {
            tracing::error!("timeout while communicating with the device");
        }
        DaikinError::Client(ClientError::Communication(reason)) => {
            tracing::error!(%reason, "network error while communicating with the device");
        }
        other => {
            tracing::error!(error = %other, "unexpected error during device setup");
        }
    }
}
