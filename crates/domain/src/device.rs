//! Device: a physical unit that exposes one or more entities.

use serde::{Deserialize, Serialize};

use crate::error::{AcBridgeError, ValidationError};
use crate::id::DeviceId;

/// A physical device registered by an integration.
///
/// Identity across restarts is the `(integration, unique_id)` pair; the
/// [`DeviceId`] is only stable when derived from it with
/// [`DeviceId::from_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sw_version: Option<String>,
    /// Name of the integration that owns this device (e.g. `"daikin_br"`).
    pub integration: String,
    /// Identifier of the device within its integration.
    pub unique_id: String,
}

impl Device {
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AcBridgeError::Validation`] when `name` or `unique_id` is empty.
    pub fn validate(&self) -> Result<(), AcBridgeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.unique_id.is_empty() {
            return Err(ValidationError::EmptyUniqueId.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    sw_version: Option<String>,
    integration: Option<String>,
    unique_id: Option<String>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn sw_version(mut self, sw_version: impl Into<String>) -> Self {
        self.sw_version = Some(sw_version.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = Some(integration.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`AcBridgeError::Validation`] if `name` or `unique_id` is
    /// missing or empty.
    pub fn build(self) -> Result<Device, AcBridgeError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
            sw_version: self.sw_version,
            integration: self.integration.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_default(),
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_device_with_metadata() {
        let device = Device::builder()
            .name("Bedroom AC")
            .manufacturer("Daikin")
            .model("Smart AC Series")
            .sw_version("1.2.3")
            .integration("daikin_br")
            .unique_id("DAIKIN0A1B2C")
            .build()
            .unwrap();

        assert_eq!(device.name, "Bedroom AC");
        assert_eq!(device.manufacturer.as_deref(), Some("Daikin"));
        assert_eq!(device.sw_version.as_deref(), Some("1.2.3"));
        assert_eq!(device.unique_id, "DAIKIN0A1B2C");
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Device::builder().unique_id("x").build();
        assert!(matches!(
            result,
            Err(AcBridgeError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_unique_id_is_empty() {
        let result = Device::builder().name("AC").build();
        assert!(matches!(
            result,
            Err(AcBridgeError::Validation(ValidationError::EmptyUniqueId))
        ));
    }
}
