//! The hygrothermograph accessory: ingestion and characteristic queries.
//!
//! [`Hygrothermograph`] owns the configuration and the [`SensorState`] for one
//! sensor. The ingestion side stores raw values as records arrive; the query
//! side recomputes offsets, staleness and battery status on every read, so
//! nothing derived is ever stored.

use crate::battery::BatteryStatus;
use crate::calibration::Offsets;
use crate::characteristic::{
    AccessoryInformation, Characteristic, CharacteristicValue, Service, services,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, ConfigError};
use crate::record::{RecordError, SensorRecord, parse_record};
use crate::staleness::StalenessPolicy;
use crate::state::{SensorReading, SensorState};
use log::{debug, error, info, warn};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Why a characteristic has no value to report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Nothing has been received for this characteristic yet.
    #[error("undefined characteristic value for {0}")]
    NoData(Characteristic),
    /// A value exists but the freshness window has elapsed.
    #[error(
        "timed out characteristic value for {characteristic}, last update: {}",
        format_timestamp(.last_updated_at)
    )]
    Stale {
        characteristic: Characteristic,
        last_updated_at: OffsetDateTime,
    },
}

/// Value pushed to the platform after an update, as a read would return it now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notification {
    pub characteristic: Characteristic,
    pub value: CharacteristicValue,
}

/// Result of ingesting one producer line.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub record: SensorRecord,
    pub notifications: Vec<Notification>,
}

/// RFC 3339 rendering for log lines and errors.
pub fn format_timestamp(timestamp: &OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.to_string())
}

/// One hygrothermograph accessory.
#[derive(Debug)]
pub struct Hygrothermograph<C = SystemClock> {
    config: Config,
    staleness: StalenessPolicy,
    offsets: Offsets,
    state: SensorState,
    clock: C,
}

impl Hygrothermograph<SystemClock> {
    /// Create an accessory that stamps updates with the system clock.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> Hygrothermograph<C> {
    /// Validate the configuration and create an accessory with an empty state.
    pub fn new(config: Config, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;

        let accessory = Self {
            staleness: config.staleness(),
            offsets: config.offsets(),
            state: SensorState::new(config.capabilities),
            config,
            clock,
        };
        info!(
            "{}: initialized accessory {} (timeout: {} min, low battery: {}%)",
            accessory.config.name,
            crate::characteristic::MODEL,
            accessory.config.timeout_minutes,
            accessory.config.low_battery
        );
        Ok(accessory)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            serial_number: self.config.address.clone(),
            ..AccessoryInformation::default()
        }
    }

    pub fn services(&self) -> Vec<Service> {
        services(&self.config)
    }

    /// Characteristics of all exposed services, in registration order.
    pub fn characteristics(&self) -> Vec<Characteristic> {
        self.services()
            .iter()
            .flat_map(|service| service.kind.characteristics().iter().copied())
            .collect()
    }

    /// Raw stored reading, without offsets or staleness applied.
    pub fn snapshot(&self) -> SensorReading {
        self.state.snapshot()
    }

    pub fn set_temperature(&self, value: Option<f64>) -> Option<Notification> {
        let raw = value?;
        if !self.state.set_temperature(Some(raw), self.clock.now()) {
            return None;
        }
        Some(Notification {
            characteristic: Characteristic::CurrentTemperature,
            value: CharacteristicValue::Float(self.offsets.apply_temperature(raw)),
        })
    }

    pub fn set_humidity(&self, value: Option<f64>) -> Option<Notification> {
        let raw = value?;
        if !self.state.set_humidity(Some(raw), self.clock.now()) {
            return None;
        }
        Some(Notification {
            characteristic: Characteristic::CurrentRelativeHumidity,
            value: CharacteristicValue::Float(self.offsets.apply_humidity(raw)),
        })
    }

    /// Store a battery level; the notification is only produced with the battery capability.
    pub fn set_battery_level(&self, value: Option<f64>) -> Option<Notification> {
        let raw = value?;
        if !self.state.set_battery_level(Some(raw), self.clock.now()) {
            return None;
        }
        if !self.config.capabilities.battery {
            return None;
        }
        Some(Notification {
            characteristic: Characteristic::BatteryLevel,
            value: CharacteristicValue::Float(raw),
        })
    }

    /// Apply every field present in `record`. Missing fields do not block the others.
    ///
    /// The record address is not used for routing.
    pub fn ingest(&self, record: &SensorRecord) -> Vec<Notification> {
        debug!(
            "{}: record from {}: temperature {:?}, humidity {:?}, battery {:?}",
            self.config.name, record.address, record.temperature, record.humidity, record.battery
        );
        [
            self.set_temperature(record.temperature),
            self.set_humidity(record.humidity),
            self.set_battery_level(record.battery),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Parse and apply one producer line.
    ///
    /// Malformed lines are logged and leave the state untouched; the error is
    /// returned for inspection only and is not meant to stop ingestion.
    pub fn ingest_line(&self, line: &str) -> Result<Ingested, RecordError> {
        match parse_record(line) {
            Ok(record) => {
                let notifications = self.ingest(&record);
                Ok(Ingested {
                    record,
                    notifications,
                })
            }
            Err(err) => {
                error!("{}: {err}: {:?}", self.config.name, line.trim_end());
                Err(err)
            }
        }
    }

    fn raw_value(reading: &SensorReading, characteristic: Characteristic) -> Option<f64> {
        match characteristic {
            Characteristic::CurrentTemperature => reading.temperature,
            Characteristic::CurrentRelativeHumidity => reading.humidity,
            Characteristic::BatteryLevel | Characteristic::StatusLowBattery => {
                reading.battery_level
            }
        }
    }

    /// Raw value for `characteristic` if it exists and is fresh.
    ///
    /// Takes one snapshot and evaluates staleness once, logging one warning
    /// when the value has timed out.
    fn fresh(&self, characteristic: Characteristic) -> Result<f64, QueryError> {
        let reading = self.state.snapshot();
        let raw =
            Self::raw_value(&reading, characteristic).ok_or(QueryError::NoData(characteristic))?;

        if let Some(last_updated_at) = reading.last_updated_at
            && self
                .staleness
                .is_stale(Some(last_updated_at), self.clock.now())
        {
            warn!(
                "{}: timed out, last update: {}",
                self.config.name,
                format_timestamp(&last_updated_at)
            );
            return Err(QueryError::Stale {
                characteristic,
                last_updated_at,
            });
        }

        Ok(raw)
    }

    /// Current temperature in Celsius, offset applied.
    pub fn temperature(&self) -> Result<f64, QueryError> {
        self.fresh(Characteristic::CurrentTemperature)
            .map(|raw| self.offsets.apply_temperature(raw))
    }

    /// Current relative humidity in percent, offset applied.
    pub fn humidity(&self) -> Result<f64, QueryError> {
        self.fresh(Characteristic::CurrentRelativeHumidity)
            .map(|raw| self.offsets.apply_humidity(raw))
    }

    /// Current battery level in percent.
    pub fn battery_level(&self) -> Result<f64, QueryError> {
        self.fresh(Characteristic::BatteryLevel)
    }

    /// Battery status derived from the current battery level.
    pub fn battery_status(&self) -> Result<BatteryStatus, QueryError> {
        self.fresh(Characteristic::StatusLowBattery)
            .map(|level| BatteryStatus::from_level(level, self.config.low_battery))
    }

    /// Characteristic read callback for a platform binding.
    ///
    /// An unavailable value is always an `Err`, never a placeholder number.
    pub fn read(&self, characteristic: Characteristic) -> Result<CharacteristicValue, QueryError> {
        let value = match characteristic {
            Characteristic::CurrentTemperature => {
                self.temperature().map(CharacteristicValue::Float)
            }
            Characteristic::CurrentRelativeHumidity => {
                self.humidity().map(CharacteristicValue::Float)
            }
            Characteristic::BatteryLevel => self.battery_level().map(CharacteristicValue::Float),
            Characteristic::StatusLowBattery => {
                self.battery_status().map(CharacteristicValue::BatteryStatus)
            }
        };
        if let Err(err) = &value {
            debug!("{}: {err}", self.config.name);
        }
        value
    }
}
