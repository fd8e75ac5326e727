//! In-memory [`IntegrationContext`]: the hub-side mirror of device and
//! entity state.
//!
//! The real hub keeps devices and entities in its registries; this store
//! keeps the latest snapshot of each in memory and turns upserts into
//! domain events on the bus.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use acbridge_domain::device::Device;
use acbridge_domain::entity::Entity;
use acbridge_domain::error::{AcBridgeError, NotFoundError};
use acbridge_domain::event::{Event, EventType};
use acbridge_domain::id::EntityId;

use crate::ports::{EventPublisher, IntegrationContext};

#[derive(Default)]
struct Inner {
    /// Keyed by `(integration, unique_id)`.
    devices: HashMap<(String, String), Device>,
    entities: HashMap<EntityId, Entity>,
    /// Registered `entity_id` strings and the entity owning each.
    entity_ids: HashMap<String, EntityId>,
}

/// Cheaply cloneable in-memory state store that publishes change events.
pub struct StateStore<EP> {
    inner: Arc<Mutex<Inner>>,
    publisher: EP,
}

impl<EP: Clone> Clone for StateStore<EP> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            publisher: self.publisher.clone(),
        }
    }
}

impl<EP> StateStore<EP> {
    pub fn new(publisher: EP) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            publisher,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest snapshot of an entity by its `entity_id` string.
    ///
    /// # Errors
    ///
    /// Returns [`AcBridgeError::NotFound`] when no such entity was registered.
    pub fn get_entity(&self, entity_id: &str) -> Result<Entity, AcBridgeError> {
        let inner = self.lock();
        inner
            .entity_ids
            .get(entity_id)
            .and_then(|id| inner.entities.get(id))
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Entity",
                    id: entity_id.to_string(),
                }
                .into()
            })
    }

    #[must_use]
    pub fn list_entities(&self) -> Vec<Entity> {
        let mut entities: Vec<_> = self.lock().entities.values().cloned().collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    #[must_use]
    pub fn list_devices(&self) -> Vec<Device> {
        let mut devices: Vec<_> = self.lock().devices.values().cloned().collect();
        devices.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        devices
    }
}

/// Record `incoming`, keeping the registered `entity_id` of any previous
/// snapshot, and return the stored entity plus the events the change warrants.
fn merge_entity(inner: &mut Inner, mut incoming: Entity) -> (Entity, Vec<Event>) {
    let mut events = Vec::new();
    let stored = match inner.entities.get(&incoming.id).cloned() {
        Some(previous) => {
            let mut stored = previous.clone();
            stored.update_state(incoming.state, incoming.last_updated);
            stored.device_id = incoming.device_id;
            stored.friendly_name = incoming.friendly_name;
            stored.attributes = incoming.attributes;
            if previous.state != stored.state || previous.attributes != stored.attributes {
                events.push(Event::new(
                    EventType::StateChanged,
                    Some(stored.id),
                    serde_json::json!({
                        "entity_id": stored.entity_id,
                        "from": previous.state.as_str(),
                        "to": stored.state.as_str(),
                        "attributes": stored.attributes,
                    }),
                ));
            }
            stored
        }
        None => {
            let entity_id = free_entity_id(&inner.entity_ids, &incoming.entity_id);
            if entity_id != incoming.entity_id {
                tracing::info!(
                    requested = %incoming.entity_id,
                    registered = %entity_id,
                    "entity id already taken"
                );
            }
            incoming.entity_id = entity_id;
            inner
                .entity_ids
                .insert(incoming.entity_id.clone(), incoming.id);
            events.push(Event::new(
                EventType::EntityCreated,
                Some(incoming.id),
                serde_json::json!({
                    "entity_id": incoming.entity_id,
                    "state": incoming.state.as_str(),
                }),
            ));
            incoming
        }
    };
    inner.entities.insert(stored.id, stored.clone());
    (stored, events)
}

/// `wanted` if nobody owns it yet, otherwise the first free `<wanted>_<n>`.
fn free_entity_id(taken: &HashMap<String, EntityId>, wanted: &str) -> String {
    if !taken.contains_key(wanted) {
        return wanted.to_string();
    }
    let mut suffix = 2_u32;
    loop {
        let candidate = format!("{wanted}_{suffix}");
        if !taken.contains_key(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

impl<EP> IntegrationContext for StateStore<EP>
where
    EP: EventPublisher + Send + Sync,
{
    #[tracing::instrument(skip(self, device), fields(unique_id = %device.unique_id))]
    async fn upsert_device(&self, mut device: Device) -> Result<Device, AcBridgeError> {
        device.validate()?;
        {
            let mut inner = self.lock();
            let key = (device.integration.clone(), device.unique_id.clone());
            if let Some(existing) = inner.devices.get(&key) {
                device.id = existing.id;
            }
            inner.devices.insert(key, device.clone());
        }
        self.publisher
            .publish(Event::new(
                EventType::DeviceUpdated,
                None,
                serde_json::json!({
                    "name": device.name,
                    "integration": device.integration,
                    "unique_id": device.unique_id,
                    "sw_version": device.sw_version,
                }),
            ))
            .await?;
        Ok(device)
    }

    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, AcBridgeError> {
        entity.validate()?;
        let (stored, events) = merge_entity(&mut self.lock(), entity);
        for event in events {
            tracing::debug!(event_type = %event.event_type, "entity changed");
            self.publisher.publish(event).await?;
        }
        Ok(stored)
    }

    async fn publish(&self, event: Event) -> Result<(), AcBridgeError> {
        self.publisher.publish(event).await
    }
}
