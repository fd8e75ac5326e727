//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `acbridge.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::collections::HashSet;

use serde::Deserialize;

use acbridge_adapter_daikin::DaikinConfig;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// In-process event bus settings.
    pub event_bus: EventBusConfig,
    /// One entry per air conditioner (`[[devices]]`).
    pub devices: Vec<DaikinConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Event bus configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Events buffered per subscriber before the slowest one starts lagging.
    pub capacity: usize,
}

impl Config {
    /// Load configuration from `acbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("acbridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ACBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("ACBRIDGE_EVENT_BUS_CAPACITY")
            && let Ok(capacity) = val.parse()
        {
            self.event_bus.capacity = capacity;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.event_bus.capacity == 0 {
            return Err(ConfigError::Validation(
                "event bus capacity must be non-zero".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (index, device) in self.devices.iter().enumerate() {
            device
                .validate()
                .map_err(|err| ConfigError::Validation(format!("devices[{index}]: {err}")))?;
            if !seen.insert(device.device_apn.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "devices[{index}]: device_apn {:?} is configured twice",
                    device.device_apn
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    /// A single demo unit, served by the simulator.
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            event_bus: EventBusConfig::default(),
            devices: vec![DaikinConfig {
                host: "127.0.0.1".to_string(),
                api_key: "demo".to_string(),
                device_apn: "DAIKIN000000".to_string(),
                device_name: "Demo AC".to_string(),
                ..DaikinConfig::default()
            }],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "acbridged=info,acbridge=info".to_string(),
        }
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
