//! In-memory Daikin unit speaking the local JSON protocol.
//!
//! Used by the daemon for demos and by tests. The unit keeps a single
//! `port1` document: status requests return it, commands merge their
//! `port1` section into it and get the whole document back.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value, json};

use crate::client::{ClientError, DeviceClient};

const DEFAULT_ENDPOINT: &str = "acstatus";

struct Inner {
    port: Map<String, Value>,
    failure: Option<ClientError>,
    commands: Vec<Value>,
}

/// A simulated Daikin unit reachable with a fixed device key.
pub struct SimulatedDevice {
    key: String,
    inner: Mutex<Inner>,
}

impl SimulatedDevice {
    /// A powered-off unit set to cool at 24 °C in a 26.5 °C room.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let port = match json!({
            "power": 0,
            "mode": 3,
            "temperature": 24,
            "fan": 17,
            "v_swing": 0,
            "econo": 0,
            "powerchill": 0,
            "fw_ver": "1.0.0",
            "sensors": {"room_temp": 26.5},
        }) {
            Value::Object(port) => port,
            _ => Map::new(),
        };
        Self {
            key: key.into(),
            inner: Mutex::new(Inner {
                port,
                failure: None,
                commands: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every request fail with `failure` until cleared with `None`.
    pub fn set_failure(&self, failure: Option<ClientError>) {
        self.lock().failure = failure;
    }

    /// Simulate the unit dropping off (or returning to) the network.
    pub fn set_offline(&self, offline: bool) {
        self.set_failure(
            offline.then(|| ClientError::Communication("host unreachable".to_string())),
        );
    }

    /// Overwrite one `port1` field, as if changed on the unit's own remote.
    pub fn set_port_value(&self, field: &str, value: Value) {
        self.lock().port.insert(field.to_string(), value);
    }

    pub fn set_room_temperature(&self, celsius: f64) {
        self.lock()
            .port
            .insert("sensors".to_string(), json!({ "room_temp": celsius }));
    }

    /// The full status document as the unit would report it.
    #[must_use]
    pub fn status(&self) -> Value {
        json!({ "port1": Value::Object(self.lock().port.clone()) })
    }

    /// Every command payload received so far, decoded.
    #[must_use]
    pub fn commands(&self) -> Vec<Value> {
        self.lock().commands.clone()
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        self.lock().failure.clone().map_or(Ok(()), Err)
    }
}

impl DeviceClient for SimulatedDevice {
    async fn get_status(
        &self,
        _address: &str,
        key: &str,
        endpoint: &str,
    ) -> Result<Value, ClientError> {
        self.check_failure()?;
        if endpoint != DEFAULT_ENDPOINT {
            return Err(ClientError::InvalidData(format!("unknown endpoint {endpoint}")));
        }
        // A unit answers a wrong key with an empty document.
        if key != self.key {
            return Ok(json!({}));
        }
        Ok(self.status())
    }

    async fn send_command(
        &self,
        _address: &str,
        key: &str,
        payload: &str,
        _suffix: &str,
    ) -> Result<Value, ClientError> {
        self.check_failure()?;
        if key != self.key {
            return Err(ClientError::InvalidData(
                "payload could not be decrypted".to_string(),
            ));
        }
        let command: Value = serde_json::from_str(payload)
            .map_err(|err| ClientError::InvalidData(err.to_string()))?;
        let Some(changes) = command.get("port1").and_then(Value::as_object) else {
            return Err(ClientError::InvalidData(
                "command has no port1 section".to_string(),
            ));
        };

        let mut inner = self.lock();
        for (field, value) in changes {
            inner.port.insert(field.clone(), value.clone());
        }
        inner.commands.push(command.clone());
        Ok(json!({ "port1": Value::Object(inner.port.clone()) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_report_default_status() {
        let unit = SimulatedDevice::new("KEY");
        let doc = unit.get_status("host", "KEY", "acstatus").await.unwrap();
        assert_eq!(doc["port1"]["power"], json!(0));
        assert_eq!(doc["port1"]["mode"], json!(3));
        assert_eq!(doc["port1"]["sensors"]["room_temp"], json!(26.5));
    }

    #[tokio::test]
    async fn should_answer_wrong_key_with_empty_document() {
        let unit = SimulatedDevice::new("KEY");
        let doc = unit.get_status("host", "WRONG", "acstatus").await.unwrap();
        assert_eq!(doc, json!({}));
    }

    #[tokio::test]
    async fn should_reject_unknown_endpoint() {
        let unit = SimulatedDevice::new("KEY");
        let result = unit.get_status("host", "KEY", "other").await;
        assert!(matches!(result, Err(ClientError::InvalidData(_))));
    }

    #[tokio::test]
    async fn should_merge_command_and_return_full_document() {
        let unit = SimulatedDevice::new("KEY");
        let doc = unit
            .send_command("host", "KEY", r#"{"port1":{"mode":4,"power":1}}"#, "BZ")
            .await
            .unwrap();
        assert_eq!(doc["port1"]["power"], json!(1));
        assert_eq!(doc["port1"]["mode"], json!(4));
        assert_eq!(doc["port1"]["temperature"], json!(24));
        assert_eq!(unit.commands().len(), 1);

        let status = unit.get_status("host", "KEY", "acstatus").await.unwrap();
        assert_eq!(status, doc);
    }

    #[tokio::test]
    async fn should_fail_every_request_while_offline() {
        let unit = SimulatedDevice::new("KEY");
        unit.set_offline(true);
        assert!(matches!(
            unit.get_status("host", "KEY", "acstatus").await,
            Err(ClientError::Communication(_))
        ));
        assert!(
            unit.send_command("host", "KEY", r#"{"port1":{"power":1}}"#, "BZ")
                .await
                .is_err()
        );
        assert!(unit.commands().is_empty());

        unit.set_offline(false);
        assert!(unit.get_status("host", "KEY", "acstatus").await.is_ok());
    }

    #[test]
    fn should_apply_local_changes() {
        let unit = SimulatedDevice::new("KEY");
        unit.set_port_value("fan", json!(18));
        unit.set_room_temperature(21.0);
        let status = unit.status();
        assert_eq!(status["port1"]["fan"], json!(18));
        assert_eq!(status["port1"]["sensors"]["room_temp"], json!(21.0));
    }
}
