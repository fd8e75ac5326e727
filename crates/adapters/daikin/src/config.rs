//! Daikin integration configuration: one entry per air conditioner.

use std::time::Duration;

use serde::Deserialize;

use acbridge_domain::error::ValidationError;

/// Shortest accepted polling interval, in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;
/// Longest accepted polling interval, in seconds.
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Connection and identity settings for a single Daikin unit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DaikinConfig {
    /// IP address or hostname of the unit on the local network.
    pub host: String,
    /// Device key used by the device-communication library.
    pub api_key: String,
    /// Device APN, the unit's unique identifier.
    pub device_apn: String,
    /// Display name of the unit.
    pub device_name: String,
    /// Suffix appended to every command request.
    pub command_suffix: String,
    /// Interval between status polls, in seconds (5..=60).
    pub poll_interval_secs: u64,
    /// Endpoint queried for the unit status.
    pub status_endpoint: String,
}

impl Default for DaikinConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: String::new(),
            device_apn: String::new(),
            device_name: "Unknown".to_string(),
            command_suffix: "BZ".to_string(),
            poll_interval_secs: MIN_POLL_INTERVAL_SECS,
            status_endpoint: "acstatus".to_string(),
        }
    }
}

impl DaikinConfig {
    /// Check the connection settings.
    ///
    /// A missing `api_key` is not checked here: setup reports it separately
    /// because it is the one problem that prevents the entity from existing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty host or device APN, or a poll
    /// interval outside 5..=60 seconds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::MissingField("host"));
        }
        if self.device_apn.is_empty() {
            return Err(ValidationError::EmptyUniqueId);
        }
        if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&self.poll_interval_secs) {
            return Err(ValidationError::OutOfRange {
                field: "poll_interval_secs",
                value: i64::try_from(self.poll_interval_secs).unwrap_or(i64::MAX),
                min: 5,
                max: 60,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
