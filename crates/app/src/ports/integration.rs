//! Integration port: lifecycle and service-call handling for device integrations.
//!
//! An integration bridges a vendor protocol (e.g. the Daikin local JSON
//! protocol) into acbridge. It registers its devices/entities on setup,
//! keeps them synchronised in the background and handles service calls
//! directed at entities it owns.

use std::future::Future;

use acbridge_domain::device::Device;
use acbridge_domain::entity::Entity;
use acbridge_domain::error::AcBridgeError;
use acbridge_domain::event::Event;
use acbridge_domain::id::EntityId;

/// Context provided to integrations for reporting devices and entity state.
///
/// This is a **port**: integrations call it whenever they register a device
/// or their mirrored entity state changes. The application provides the
/// concrete implementation.
pub trait IntegrationContext: Send + Sync {
    /// Register or refresh a device (matched by `integration` + `unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, AcBridgeError>> + Send;

    /// Register or refresh an entity (matched by its `entity_id` string).
    ///
    /// Publishes `EntityCreated` / `StateChanged` events when appropriate.
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, AcBridgeError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), AcBridgeError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), AcBridgeError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            for entity in dd.entities {
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable device integration.
///
/// The composition root calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): initial device query, register entities
/// 2. [`start_background`](Self::start_background): spawn periodic polling
/// 3. (the hub runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown): cancel polling, release resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"daikin_br"`).
    fn name(&self) -> &'static str;

    /// Initialise and register entities through `ctx`.
    ///
    /// Integrations whose device cannot be reached should still register
    /// their entities (marked unavailable) and succeed; only configuration
    /// problems should fail setup.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), AcBridgeError>> + Send;

    /// Start long-running background work (polling, subscriptions).
    ///
    /// Spawns internal tasks that report through `ctx` and returns
    /// immediately. The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), AcBridgeError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (e.g. `set_hvac_mode`) for an entity owned by
    /// this integration.
    ///
    /// Returns the entity snapshot after the call was applied.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, AcBridgeError>> + Send;

    /// Called on unload or graceful shutdown.
    fn teardown(&mut self) -> impl Future<Output = Result<(), AcBridgeError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
