//! Daikin adapter error types.

use acbridge_domain::error::{AcBridgeError, ServiceCallError, ValidationError};

use crate::client::ClientError;
use crate::protocol::ProtocolError;

/// Errors specific to the Daikin adapter.
#[derive(Debug, thiserror::Error)]
pub enum DaikinError {
    /// The device-communication library failed.
    #[error("device communication failed")]
    Client(#[from] ClientError),

    /// The unit answered with a document we cannot interpret.
    #[error("unexpected device response")]
    Protocol(#[from] ProtocolError),

    /// A status refresh failed; the unit is considered unavailable.
    #[error("the device {device_apn} is unavailable")]
    UpdateFailed {
        device_apn: String,
        #[source]
        source: Box<DaikinError>,
    },

    #[error("invalid configuration")]
    Config(#[source] ValidationError),

    /// The command is not allowed in the unit's current state.
    #[error("command rejected")]
    Rejected(#[source] ServiceCallError),
}

impl DaikinError {
    /// The underlying failure, looking through [`UpdateFailed`](Self::UpdateFailed).
    #[must_use]
    pub fn cause(&self) -> &Self {
        match self {
            Self::UpdateFailed { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Convert into an [`AcBridgeError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> AcBridgeError {
        match self {
            Self::Config(err) => AcBridgeError::Validation(err),
            Self::Rejected(err) => AcBridgeError::ServiceCall(err),
            other => AcBridgeError::Integration(Box::new(other)),
        }
    }
}

impl From<DaikinError> for AcBridgeError {
    fn from(err: DaikinError) -> Self {
        err.into_domain()
    }
}

impl From<ServiceCallError> for DaikinError {
    fn from(err: ServiceCallError) -> Self {
        Self::Rejected(err)
    }
}
