//! Daikin climate entity: mirrored unit state, command planning and the
//! projection into hub entities.
//!
//! [`DaikinClimate`] holds no I/O. The integration feeds it status documents
//! and asks it to [`plan`](DaikinClimate::plan) service requests into wire
//! [`Command`]s; the rules about which commands are allowed in which state
//! live here.

use std::str::FromStr;

use serde_json::Value;

use acbridge_domain::climate::{
    ClimateFeatures, FanMode, HvacMode, PresetMode, SwingMode, TemperatureUnit,
};
use acbridge_domain::device::Device;
use acbridge_domain::entity::{AttributeValue, Entity, EntityState};
use acbridge_domain::error::{AcBridgeError, ServiceCallError};
use acbridge_domain::id::{DeviceId, EntityId};

use crate::mapping;
use crate::protocol::{Command, PortStatus};

pub const MANUFACTURER: &str = "Daikin";
pub const MODEL: &str = "Smart AC Series";
pub const TRANSLATION_KEY: &str = "daikin_ac";

pub const MIN_TEMP: f64 = 10.0;
pub const MAX_TEMP: f64 = 32.0;
/// Lowest target accepted while cooling.
pub const MIN_COOL_TEMP: f64 = 16.0;
pub const TEMP_STEP: f64 = 1.0;

const UNKNOWN_FIRMWARE: &str = "Unknown";

/// Capabilities every Daikin unit advertises.
#[must_use]
pub fn supported_features() -> ClimateFeatures {
    ClimateFeatures::TARGET_TEMPERATURE
        | ClimateFeatures::FAN_MODE
        | ClimateFeatures::SWING_MODE
        | ClimateFeatures::PRESET_MODE
}

/// A decoded climate service call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceRequest {
    SetHvacMode(HvacMode),
    SetFanMode(FanMode),
    SetTemperature(f64),
    SetPresetMode(PresetMode),
    SetSwingMode(SwingMode),
}

impl ServiceRequest {
    /// Decode a service name and its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCallError::UnknownService`] for services a climate
    /// entity does not offer, and `MissingField` / `InvalidValue` when the
    /// payload does not carry a usable value.
    pub fn parse(service: &str, data: &Value) -> Result<Self, ServiceCallError> {
        match service {
            "set_hvac_mode" => wire_field(data, "hvac_mode").map(Self::SetHvacMode),
            "set_fan_mode" => wire_field(data, "fan_mode").map(Self::SetFanMode),
            "set_preset_mode" => wire_field(data, "preset_mode").map(Self::SetPresetMode),
            "set_swing_mode" => wire_field(data, "swing_mode").map(Self::SetSwingMode),
            "set_temperature" => {
                let value = data
                    .get("temperature")
                    .ok_or(ServiceCallError::MissingField("temperature"))?;
                value
                    .as_f64()
                    .map(Self::SetTemperature)
                    .ok_or_else(|| ServiceCallError::InvalidValue {
                        field: "temperature",
                        value: value.to_string(),
                    })
            }
            other => Err(ServiceCallError::UnknownService(other.to_string())),
        }
    }
}

fn wire_field<T: FromStr>(data: &Value, field: &'static str) -> Result<T, ServiceCallError> {
    let value = data
        .get(field)
        .ok_or(ServiceCallError::MissingField(field))?;
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ServiceCallError::InvalidValue {
            field,
            value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
        })
}

/// Mirrored state of one Daikin unit.
#[derive(Debug, Clone)]
pub struct DaikinClimate {
    unique_id: String,
    device_name: String,
    entity_id: EntityId,
    device_id: DeviceId,
    power: bool,
    hvac_mode: HvacMode,
    target_temperature: Option<f64>,
    current_temperature: Option<f64>,
    fan_mode: FanMode,
    preset_mode: PresetMode,
    swing_mode: SwingMode,
    available: bool,
    skip_update: bool,
    firmware: String,
}

impl DaikinClimate {
    /// A powered-off, available unit with no readings yet.
    ///
    /// Ids are derived from `unique_id` so they survive restarts.
    #[must_use]
    pub fn new(unique_id: impl Into<String>, device_name: impl Into<String>) -> Self {
        let unique_id = unique_id.into();
        Self {
            entity_id: EntityId::from_name(&unique_id),
            device_id: DeviceId::from_name(&unique_id),
            unique_id,
            device_name: device_name.into(),
            power: false,
            hvac_mode: HvacMode::Off,
            target_temperature: None,
            current_temperature: None,
            fan_mode: FanMode::Auto,
            preset_mode: PresetMode::None,
            swing_mode: SwingMode::Off,
            available: true,
            skip_update: false,
            firmware: UNKNOWN_FIRMWARE.to_string(),
        }
    }

    /// Synchronise every mirrored property from a decoded status document.
    pub fn apply_status(&mut self, status: &PortStatus) {
        self.power = status.is_powered();
        self.hvac_mode = if self.power {
            mapping::hvac_mode_from_code(status.mode.unwrap_or_default())
        } else {
            HvacMode::Off
        };
        self.target_temperature = status.temperature;
        self.current_temperature = status.room_temperature();
        self.fan_mode = mapping::fan_mode_from_code(status.fan);
        self.swing_mode = mapping::swing_mode_from_flag(status.v_swing);
        self.preset_mode = mapping::preset_mode_from_flags(status.econo, status.powerchill);
    }

    /// Turn a service request into the command for the unit, enforcing the
    /// per-mode restrictions.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCallError::NotPermitted`] when the current mode forbids
    /// the change, and [`ServiceCallError::OutOfRange`] for a target
    /// temperature outside the range allowed in the current mode.
    pub fn plan(&self, request: ServiceRequest) -> Result<Command, ServiceCallError> {
        match request {
            ServiceRequest::SetHvacMode(mode) => Ok(Command::SetHvacMode(mode)),
            ServiceRequest::SetFanMode(_) if self.hvac_mode == HvacMode::Dry => {
                Err(ServiceCallError::NotPermitted(
                    "fan mode cannot be changed in dry mode".to_string(),
                ))
            }
            ServiceRequest::SetFanMode(mode) => Ok(Command::SetFanMode(mode)),
            ServiceRequest::SetTemperature(celsius) => self.plan_temperature(celsius),
            ServiceRequest::SetPresetMode(_) if !self.power => Err(ServiceCallError::NotPermitted(
                "preset mode can only be changed while the unit is on".to_string(),
            )),
            ServiceRequest::SetPresetMode(mode) => Ok(Command::SetPresetMode(mode)),
            ServiceRequest::SetSwingMode(mode) => Ok(Command::SetSwingMode(mode)),
        }
    }

    fn plan_temperature(&self, celsius: f64) -> Result<Command, ServiceCallError> {
        if matches!(self.hvac_mode, HvacMode::FanOnly | HvacMode::Dry) {
            return Err(ServiceCallError::NotPermitted(format!(
                "temperature cannot be set in {} mode",
                self.hvac_mode
            )));
        }
        let min = if self.hvac_mode == HvacMode::Cool {
            MIN_COOL_TEMP
        } else {
            MIN_TEMP
        };
        if !(min..=MAX_TEMP).contains(&celsius) {
            return Err(ServiceCallError::OutOfRange {
                field: "temperature",
                value: celsius,
                min,
                max: MAX_TEMP,
            });
        }
        // In range, so the rounded value fits comfortably in an i64.
        #[allow(clippy::cast_possible_truncation)]
        let whole = celsius.round() as i64;
        Ok(Command::SetTemperature(whole))
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Ask the next scheduled poll to be skipped.
    pub fn request_skip_update(&mut self) {
        self.skip_update = true;
    }

    /// Consume a pending skip request, returning whether one was set.
    pub fn take_skip_update(&mut self) -> bool {
        std::mem::take(&mut self.skip_update)
    }

    pub fn set_firmware(&mut self, firmware: impl Into<String>) {
        self.firmware = firmware.into();
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.power
    }

    #[must_use]
    pub fn hvac_mode(&self) -> HvacMode {
        self.hvac_mode
    }

    #[must_use]
    pub fn fan_mode(&self) -> FanMode {
        self.fan_mode
    }

    #[must_use]
    pub fn preset_mode(&self) -> PresetMode {
        self.preset_mode
    }

    #[must_use]
    pub fn swing_mode(&self) -> SwingMode {
        self.swing_mode
    }

    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.target_temperature
    }

    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.current_temperature
    }

    #[must_use]
    pub fn firmware(&self) -> &str {
        &self.firmware
    }

    /// The display name, falling back to the unique id when none is configured.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.device_name.is_empty() {
            &self.unique_id
        } else {
            &self.device_name
        }
    }

    /// Human-readable entity id, e.g. `climate.living_room`.
    #[must_use]
    pub fn entity_id_string(&self) -> String {
        let slug = slugify(self.display_name());
        if slug.is_empty() {
            format!("climate.{}", slugify(&self.unique_id))
        } else {
            format!("climate.{slug}")
        }
    }

    /// Project the mirrored state into a hub [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the projected entity is invalid, which
    /// only happens when both the device name and unique id are unusable.
    pub fn to_entity(&self) -> Result<Entity, AcBridgeError> {
        let state = if !self.available {
            EntityState::Unavailable
        } else if self.hvac_mode == HvacMode::Off {
            EntityState::Off
        } else {
            EntityState::On
        };

        Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(self.entity_id_string())
            .friendly_name(self.display_name())
            .state(state)
            .attribute("hvac_mode", self.hvac_mode.as_str())
            .attribute(
                "hvac_modes",
                AttributeValue::string_list(HvacMode::ALL.iter().map(|m| m.as_str())),
            )
            .attribute("fan_mode", self.fan_mode.as_str())
            .attribute(
                "fan_modes",
                AttributeValue::string_list(FanMode::ALL.iter().map(|m| m.as_str())),
            )
            .attribute("preset_mode", self.preset_mode.as_str())
            .attribute(
                "preset_modes",
                AttributeValue::string_list(PresetMode::ALL.iter().map(|m| m.as_str())),
            )
            .attribute("swing_mode", self.swing_mode.as_str())
            .attribute(
                "swing_modes",
                AttributeValue::string_list(SwingMode::ALL.iter().map(|m| m.as_str())),
            )
            .attribute(
                "temperature",
                AttributeValue::optional_float(self.target_temperature),
            )
            .attribute(
                "current_temperature",
                AttributeValue::optional_float(self.current_temperature),
            )
            .attribute("min_temp", MIN_TEMP)
            .attribute("max_temp", MAX_TEMP)
            .attribute("target_temp_step", TEMP_STEP)
            .attribute("temperature_unit", TemperatureUnit::Celsius.as_str())
            .attribute(
                "supported_features",
                i64::from(supported_features().bits()),
            )
            .attribute("translation_key", TRANSLATION_KEY)
            .attribute("power", self.power)
            .build()
    }

    /// Project the unit into a hub [`Device`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the unique id is empty.
    pub fn device(&self) -> Result<Device, AcBridgeError> {
        Device::builder()
            .id(self.device_id)
            .name(self.display_name())
            .manufacturer(MANUFACTURER)
            .model(MODEL)
            .sw_version(self.firmware.as_str())
            .integration(crate::INTEGRATION_NAME)
            .unique_id(self.unique_id.as_str())
            .build()
    }
}

/// Lowercase ASCII alphanumerics, every other run of characters collapsed
/// into a single `_`.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}
