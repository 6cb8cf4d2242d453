//! Characteristics and services an accessory platform binds to.

use crate::battery::BatteryStatus;
use crate::config::Config;
use std::fmt;

pub const MANUFACTURER: &str = "Cleargrass Inc";
pub const MODEL: &str = "LYWSDCGQ01ZM";

/// A readable characteristic of the accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    CurrentTemperature,
    CurrentRelativeHumidity,
    BatteryLevel,
    StatusLowBattery,
}

impl Characteristic {
    pub const ALL: [Characteristic; 4] = [
        Characteristic::CurrentTemperature,
        Characteristic::CurrentRelativeHumidity,
        Characteristic::BatteryLevel,
        Characteristic::StatusLowBattery,
    ];

    /// Field name used in logs and reports.
    pub fn field(self) -> &'static str {
        match self {
            Characteristic::CurrentTemperature => "temperature",
            Characteristic::CurrentRelativeHumidity => "humidity",
            Characteristic::BatteryLevel => "battery_level",
            Characteristic::StatusLowBattery => "battery_status",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// A successfully read characteristic value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicValue {
    Float(f64),
    BatteryStatus(BatteryStatus),
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacteristicValue::Float(value) => write!(f, "{value}"),
            CharacteristicValue::BatteryStatus(status) => write!(f, "{status}"),
        }
    }
}

/// Static accessory information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInformation {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub firmware_revision: &'static str,
    pub serial_number: Option<String>,
}

impl Default for AccessoryInformation {
    fn default() -> Self {
        Self {
            manufacturer: MANUFACTURER,
            model: MODEL,
            firmware_revision: env!("CARGO_PKG_VERSION"),
            serial_number: None,
        }
    }
}

/// Kind of service, with the characteristics it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// The sensor cannot be charged; `ChargingState` is fixed to not chargeable.
    Battery,
    TemperatureSensor,
    HumiditySensor,
}

impl ServiceKind {
    pub fn characteristics(self) -> &'static [Characteristic] {
        match self {
            ServiceKind::Battery => &[
                Characteristic::BatteryLevel,
                Characteristic::StatusLowBattery,
            ],
            ServiceKind::TemperatureSensor => &[Characteristic::CurrentTemperature],
            ServiceKind::HumiditySensor => &[Characteristic::CurrentRelativeHumidity],
        }
    }
}

/// A named service exposed by the accessory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub kind: ServiceKind,
    pub name: String,
}

/// Services to register for a configuration, in registration order.
pub fn services(config: &Config) -> Vec<Service> {
    let mut services = Vec::with_capacity(3);
    if config.capabilities.battery {
        services.push(Service {
            kind: ServiceKind::Battery,
            name: "Battery".to_string(),
        });
    }
    services.push(Service {
        kind: ServiceKind::TemperatureSensor,
        name: config.temperature_name.clone(),
    });
    if config.capabilities.humidity {
        services.push(Service {
            kind: ServiceKind::HumiditySensor,
            name: config.humidity_name.clone(),
        });
    }
    services
}
