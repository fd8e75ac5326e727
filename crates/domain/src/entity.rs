//! Entity: the central state-holding concept.
//!
//! An entity represents a single observable/controllable aspect of a device
//! (e.g. the climate control of an air conditioner). Its coarse state lives in
//! [`EntityState`]; everything else (HVAC mode, temperatures, …) is carried in
//! typed attributes.

mod attribute_value;
mod state;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use crate::error::{AcBridgeError, ValidationError};
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// A state holder with identity, owned by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    /// Human-readable id of the form `<domain>.<object_id>`, e.g. `climate.living_room`.
    pub entity_id: String,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AcBridgeError::Validation`] when `entity_id` is empty or not
    /// of the form `<domain>.<object_id>`, or when `friendly_name` is empty.
    pub fn validate(&self) -> Result<(), AcBridgeError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        match self.entity_id.split_once('.') {
            Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => {}
            _ => return Err(ValidationError::InvalidEntityId(self.entity_id.clone()).into()),
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// The domain part of the entity id (`climate` for `climate.living_room`).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(domain, _)| domain)
    }

    /// Replace the state, bumping `last_changed` only when it actually differs.
    pub fn update_state(&mut self, state: EntityState, ts: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = ts;
        }
        self.last_updated = ts;
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`AcBridgeError::Validation`] if the device id is missing or
    /// the entity fails [`Entity::validate`].
    pub fn build(self) -> Result<Entity, AcBridgeError> {
        let device_id = self
            .device_id
            .ok_or(ValidationError::MissingField("device_id"))?;
        let ts = now();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            device_id,
            entity_id: self.entity_id.unwrap_or_default(),
            friendly_name: self.friendly_name.unwrap_or_default(),
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climate_entity() -> Entity {
        Entity::builder()
            .device_id(DeviceId::new())
            .entity_id("climate.living_room")
            .friendly_name("Living Room")
            .state(EntityState::Off)
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_entity() {
        let entity = climate_entity();
        assert_eq!(entity.entity_id, "climate.living_room");
        assert_eq!(entity.domain(), "climate");
        assert_eq!(entity.state, EntityState::Off);
        assert_eq!(entity.last_changed, entity.last_updated);
    }

    #[test]
    fn should_reject_missing_device_id() {
        let result = Entity::builder()
            .entity_id("climate.x")
            .friendly_name("X")
            .build();
        assert!(matches!(
            result,
            Err(AcBridgeError::Validation(ValidationError::MissingField(
                "device_id"
            )))
        ));
    }

    #[test]
    fn should_reject_entity_id_without_domain() {
        let result = Entity::builder()
            .device_id(DeviceId::new())
            .entity_id("living_room")
            .friendly_name("Living Room")
            .build();
        assert!(matches!(
            result,
            Err(AcBridgeError::Validation(ValidationError::InvalidEntityId(_)))
        ));
    }

    #[test]
    fn should_reject_empty_friendly_name() {
        let result = Entity::builder()
            .device_id(DeviceId::new())
            .entity_id("climate.x")
            .build();
        assert!(matches!(
            result,
            Err(AcBridgeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_bump_last_changed_only_on_real_change() {
        let mut entity = climate_entity();
        let original = entity.last_changed;
        let later = original + chrono::Duration::seconds(5);

        entity.update_state(EntityState::Off, later);
        assert_eq!(entity.last_changed, original);
        assert_eq!(entity.last_updated, later);

        entity.update_state(EntityState::On, later);
        assert_eq!(entity.last_changed, later);
    }

    #[test]
    fn should_store_and_read_attributes() {
        let mut entity = climate_entity();
        entity.set_attribute("hvac_mode", "cool");
        assert_eq!(
            entity.get_attribute("hvac_mode"),
            Some(&AttributeValue::String("cool".to_string()))
        );
        assert!(entity.get_attribute("missing").is_none());
    }
}
