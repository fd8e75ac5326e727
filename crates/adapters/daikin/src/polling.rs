//! Periodic status polling for one unit.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use acbridge_app::ports::IntegrationContext;
use acbridge_domain::error::AcBridgeError;

use crate::client::DeviceClient;
use crate::climate::DaikinClimate;
use crate::coordinator::UpdateCoordinator;

/// Run a single poll cycle and report the resulting entity through `ctx`.
///
/// A pending skip request (set after setup or a successful command) is
/// consumed instead of fetching. Otherwise a successful refresh updates the
/// mirrored state and marks the unit available, and a failed one marks it
/// unavailable. The climate lock is held for the whole cycle so a command
/// cannot interleave with a refresh.
///
/// # Errors
///
/// Only reporting through `ctx` can fail; device failures are absorbed into
/// the availability flag.
pub(crate) async fn poll_once<C, Ctx>(
    climate: &Mutex<DaikinClimate>,
    coordinator: &UpdateCoordinator<C>,
    ctx: &Ctx,
) -> Result<(), AcBridgeError>
where
    C: DeviceClient,
    Ctx: IntegrationContext,
{
    let entity = {
        let mut climate = climate.lock().await;
        if climate.take_skip_update() {
            tracing::trace!(device_apn = climate.unique_id(), "poll skipped after local update");
            return Ok(());
        }

        match coordinator.refresh().await {
            Ok(status) => {
                tracing::debug!(
                    name = climate.display_name(),
                    device_apn = climate.unique_id(),
                    "updating entity properties"
                );
                climate.apply_status(&status);
            }
            Err(err) => {
                tracing::error!(
                    error = %err.cause(),
                    device_apn = climate.unique_id(),
                    "error updating device status"
                );
            }
        }
        climate.set_available(coordinator.last_update_success());
        climate.to_entity()?
    };

    ctx.upsert_entity(entity).await?;
    Ok(())
}

/// Background task polling a unit every coordinator interval.
pub struct Poller<C, Ctx> {
    climate: Arc<Mutex<DaikinClimate>>,
    coordinator: Arc<UpdateCoordinator<C>>,
    context: Ctx,
}

impl<C, Ctx> Poller<C, Ctx>
where
    C: DeviceClient + 'static,
    Ctx: IntegrationContext + Clone + 'static,
{
    /// Spawn the polling loop. The first poll happens one interval from now.
    pub fn start(
        climate: Arc<Mutex<DaikinClimate>>,
        coordinator: Arc<UpdateCoordinator<C>>,
        context: Ctx,
    ) -> JoinHandle<()> {
        let poller = Self {
            climate,
            coordinator,
            context,
        };
        tokio::spawn(poller.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.coordinator.update_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(err) = poll_once(&self.climate, &self.coordinator, &self.context).await {
                tracing::warn!(
                    %err,
                    device_apn = self.coordinator.device_apn(),
                    "failed to report polled state"
                );
            }
        }
    }
}
