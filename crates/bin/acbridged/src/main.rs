//! # acbridged: acbridge daemon
//!
//! Composition root that wires the Daikin integration to the in-process hub.
//!
//! ## Responsibilities
//! - Load configuration (`acbridge.toml`, env vars) and initialise logging
//! - Build the event bus and the in-memory state store
//! - Set up one Daikin integration per configured unit and start polling
//! - Log every hub event until Ctrl-C, then unload the integrations
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing_subscriber::EnvFilter;

use acbridge_adapter_daikin::{DaikinIntegration, SimulatedDevice};
use acbridge_app::event_bus::InProcessEventBus;
use acbridge_app::ports::Integration;
use acbridge_app::services::state_store::StateStore;
use acbridge_domain::event::Event;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    // Hub
    let event_bus = InProcessEventBus::new(config.event_bus.capacity);
    let store = StateStore::new(event_bus.clone());
    let event_log = tokio::spawn(log_events(BroadcastStream::new(event_bus.subscribe())));

    // Integrations
    let mut integrations = Vec::with_capacity(config.devices.len());
    for device in config.devices {
        let device_apn = device.device_apn.clone();
        let client = SimulatedDevice::new(device.api_key.clone());
        let mut integration = DaikinIntegration::new(device, client);

        if let Err(err) = integration.setup(&store).await {
            tracing::error!(error = %err, %device_apn, "integration setup failed, skipping unit");
            continue;
        }
        integration.start_background(store.clone()).await?;
        integrations.push(integration);
    }

    tracing::info!(units = integrations.len(), "acbridged running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    for mut integration in integrations {
        if let Err(err) = integration.teardown().await {
            tracing::warn!(
                error = %err,
                device_apn = %integration.config().device_apn,
                "integration teardown failed"
            );
        }
    }
    event_log.abort();

    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn log_events(mut events: BroadcastStream<Event>) {
    while let Some(item) = events.next().await {
        match item {
            Ok(event) => tracing::info!(
                event_type = %event.event_type,
                entity_id = ?event.entity_id,
                data = %event.data,
                "hub event"
            ),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind the bus");
            }
        }
    }
}
