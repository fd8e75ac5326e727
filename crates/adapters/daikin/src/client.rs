//! Device-client port: the boundary to the device-communication library.
//!
//! Request/response framing, encryption and transport to the physical unit
//! all live behind this trait. The integration only ever sees the decoded
//! JSON documents.

use std::future::Future;
use std::sync::Arc;

/// Failure reported by the device-communication library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The unit could not be reached or the exchange was interrupted.
    #[error("communication error: {0}")]
    Communication(String),

    /// The unit answered with data that could not be decrypted or decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("timed out waiting for the device")]
    Timeout,
}

/// Local-network client for a Daikin unit.
pub trait DeviceClient: Send + Sync {
    /// Query `endpoint` (e.g. `acstatus`) and return the decoded document.
    fn get_status(
        &self,
        address: &str,
        key: &str,
        endpoint: &str,
    ) -> impl Future<Output = Result<serde_json::Value, ClientError>> + Send;

    /// Send a JSON command `payload` and return the unit's response document.
    fn send_command(
        &self,
        address: &str,
        key: &str,
        payload: &str,
        suffix: &str,
    ) -> impl Future<Output = Result<serde_json::Value, ClientError>> + Send;
}

impl<C: DeviceClient> DeviceClient for Arc<C> {
    fn get_status(
        &self,
        address: &str,
        key: &str,
        endpoint: &str,
    ) -> impl Future<Output = Result<serde_json::Value, ClientError>> + Send {
        (**self).get_status(address, key, endpoint)
    }

    fn send_command(
        &self,
        address: &str,
        key: &str,
        payload: &str,
        suffix: &str,
    ) -> impl Future<Output = Result<serde_json::Value, ClientError>> + Send {
        (**self).send_command(address, key, payload, suffix)
    }
}
