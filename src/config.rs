//! Accessory configuration.
//!
//! The JSON form follows the homebridge accessory block, so an existing
//! `config.json` entry can be used as-is:
//!
//! ```json
//! {
//!   "accessory": "Hygrotermograph",
//!   "name": "Bedroom",
//!   "timeout": 15,
//!   "temperatureOffset": -0.4,
//!   "humidityOffset": 2,
//!   "lowBattery": 15
//! }
//! ```
//!
//! Keys that are missing or `null` take their defaults; unknown keys are ignored.

use crate::battery::DEFAULT_LOW_BATTERY_THRESHOLD;
use crate::calibration::Offsets;
use crate::staleness::StalenessPolicy;
use crate::state::Capabilities;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default staleness timeout in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: f64 = 15.0;
pub const DEFAULT_NAME: &str = "Hygrothermograph";
pub const DEFAULT_TEMPERATURE_NAME: &str = "Temperature";
pub const DEFAULT_HUMIDITY_NAME: &str = "Humidity";

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid timeout {0}: expected a finite number of minutes >= 0")]
    InvalidTimeout(f64),
    #[error("invalid {name} {value}: expected a finite number")]
    InvalidOffset { name: &'static str, value: f64 },
    #[error("invalid low battery threshold {0}: expected a percentage between 0 and 100")]
    InvalidLowBattery(f64),
}

/// Validated, immutable accessory configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Accessory display name
    pub name: String,
    /// Sensor address, informational only
    pub address: Option<String>,
    /// Staleness timeout in minutes; `0` disables staleness
    pub timeout_minutes: f64,
    pub temperature_offset: f64,
    pub humidity_offset: f64,
    /// Battery level (percent) at or below which the battery is reported low
    pub low_battery: f64,
    pub temperature_name: String,
    pub humidity_name: String,
    pub capabilities: Capabilities,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            address: None,
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            temperature_offset: 0.0,
            humidity_offset: 0.0,
            low_battery: DEFAULT_LOW_BATTERY_THRESHOLD,
            temperature_name: DEFAULT_TEMPERATURE_NAME.to_string(),
            humidity_name: DEFAULT_HUMIDITY_NAME.to_string(),
            capabilities: Capabilities::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    name: Option<String>,
    address: Option<String>,
    timeout: Option<f64>,
    temperature_offset: Option<f64>,
    humidity_offset: Option<f64>,
    low_battery: Option<f64>,
    temperature_name: Option<String>,
    humidity_name: Option<String>,
    humidity: Option<bool>,
    battery: Option<bool>,
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        let defaults = Capabilities::default();
        Config {
            name: non_empty_or(raw.name, DEFAULT_NAME),
            address: raw.address.filter(|s| !s.trim().is_empty()),
            timeout_minutes: raw.timeout.unwrap_or(DEFAULT_TIMEOUT_MINUTES),
            temperature_offset: raw.temperature_offset.unwrap_or(0.0),
            humidity_offset: raw.humidity_offset.unwrap_or(0.0),
            low_battery: raw.low_battery.unwrap_or(DEFAULT_LOW_BATTERY_THRESHOLD),
            temperature_name: non_empty_or(raw.temperature_name, DEFAULT_TEMPERATURE_NAME),
            humidity_name: non_empty_or(raw.humidity_name, DEFAULT_HUMIDITY_NAME),
            capabilities: Capabilities {
                humidity: raw.humidity.unwrap_or(defaults.humidity),
                battery: raw.battery.unwrap_or(defaults.battery),
            },
        }
    }
}

impl Config {
    /// Parse and validate a JSON accessory block.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let config = Config::from(raw);
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values the accessory cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.timeout_minutes.is_finite() || self.timeout_minutes < 0.0 {
            return Err(ConfigError::InvalidTimeout(self.timeout_minutes));
        }
        if !self.temperature_offset.is_finite() {
            return Err(ConfigError::InvalidOffset {
                name: "temperature offset",
                value: self.temperature_offset,
            });
        }
        if !self.humidity_offset.is_finite() {
            return Err(ConfigError::InvalidOffset {
                name: "humidity offset",
                value: self.humidity_offset,
            });
        }
        if !(0.0..=100.0).contains(&self.low_battery) {
            return Err(ConfigError::InvalidLowBattery(self.low_battery));
        }
        Ok(())
    }

    pub fn staleness(&self) -> StalenessPolicy {
        StalenessPolicy::from_minutes(self.timeout_minutes)
    }

    pub fn offsets(&self) -> Offsets {
        Offsets::new(self.temperature_offset, self.humidity_offset)
    }
}
