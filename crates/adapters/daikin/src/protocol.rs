//! Daikin local JSON protocol: status documents and command payloads.
//!
//! Every document the unit exchanges is wrapped in a `port1` object:
//!
//! ```json
//! {"port1": {"power": 1, "mode": 3, "temperature": 24, "fan": 17,
//!            "v_swing": 0, "econo": 0, "powerchill": 0,
//!            "fw_ver": "1.4.2", "sensors": {"room_temp": 26.5}}}
//! ```
//!
//! Command responses use the same shape as status documents.

use serde::Deserialize;
use serde_json::{Value, json};

use acbridge_domain::climate::{FanMode, HvacMode, PresetMode, SwingMode};

use crate::mapping;

const PORT: &str = "port1";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("status document is not a JSON object")]
    NotAnObject,

    /// No `port1` section, or an empty one. Units answer this way when the
    /// device key is wrong.
    #[error("status document has no port1 section")]
    MissingPort,

    #[error("malformed port1 section")]
    Malformed(#[source] serde_json::Error),
}

/// Readings under `port1.sensors`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Sensors {
    pub room_temp: Option<f64>,
}

/// Decoded `port1` section. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortStatus {
    pub power: Option<i64>,
    pub mode: Option<i64>,
    pub temperature: Option<f64>,
    pub fan: Option<i64>,
    pub v_swing: Option<i64>,
    pub econo: Option<i64>,
    pub powerchill: Option<i64>,
    pub fw_ver: Option<String>,
    pub sensors: Option<Sensors>,
}

impl PortStatus {
    /// Whether the unit reports itself powered on (absent counts as off).
    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.power.is_some_and(|power| power != 0)
    }

    #[must_use]
    pub fn room_temperature(&self) -> Option<f64> {
        self.sensors.as_ref().and_then(|s| s.room_temp)
    }
}

/// Decode a status or command-response document.
///
/// # Errors
///
/// Returns [`ProtocolError`] when the document is not an object, lacks a
/// non-empty `port1` section, or `port1` holds values of the wrong type.
pub fn parse_status(doc: &Value) -> Result<PortStatus, ProtocolError> {
    let root = doc.as_object().ok_or(ProtocolError::NotAnObject)?;
    match root.get(PORT) {
        Some(Value::Object(port)) if !port.is_empty() => {
            PortStatus::deserialize(&Value::Object(port.clone())).map_err(ProtocolError::Malformed)
        }
        _ => Err(ProtocolError::MissingPort),
    }
}

/// A single change requested from the unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetHvacMode(HvacMode),
    SetFanMode(FanMode),
    /// Target temperature in whole degrees Celsius.
    SetTemperature(i64),
    SetPresetMode(PresetMode),
    SetSwingMode(SwingMode),
}

impl Command {
    /// The JSON payload for this command.
    #[must_use]
    pub fn payload(&self) -> Value {
        let port = match *self {
            Self::SetHvacMode(HvacMode::Off) => json!({ "power": 0 }),
            Self::SetHvacMode(mode) => json!({
                "mode": mapping::hvac_mode_to_code(mode),
                "power": 1,
            }),
            Self::SetFanMode(mode) => json!({ "fan": mapping::fan_mode_to_code(mode) }),
            Self::SetTemperature(celsius) => json!({ "temperature": celsius }),
            Self::SetPresetMode(mode) => {
                let flags = mapping::preset_mode_to_flags(mode);
                json!({ "powerchill": flags.powerchill, "econo": flags.econo })
            }
            Self::SetSwingMode(mode) => json!({ "v_swing": mapping::swing_mode_to_flag(mode) }),
        };
        json!({ PORT: port })
    }

    /// The payload serialised for the wire: compact, keys in sorted order.
    #[must_use]
    pub fn encode(&self) -> String {
        self.payload().to_string()
    }
}
