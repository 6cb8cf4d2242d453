//! `hygrothermograph-bridge` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, logging setup and
//! process exit codes. The sensor-state core lives in [`crate::accessory`]:
//! records from the external sniffer are parsed by [`crate::record`], stored raw
//! in [`crate::state`], and read back through staleness, offsets and battery
//! status on every query. [`crate::app`] wires it to a line source and a report
//! writer so it can be tested deterministically.

pub mod accessory;
pub mod app;
pub mod battery;
pub mod calibration;
pub mod characteristic;
pub mod clock;
pub mod config;
pub mod mac_address;
pub mod output;
pub mod record;
pub mod source;
pub mod staleness;
pub mod state;
pub mod throttle;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types at the crate root
pub use accessory::{Hygrothermograph, Ingested, Notification, QueryError};
pub use battery::BatteryStatus;
pub use calibration::Offsets;
pub use characteristic::{Characteristic, CharacteristicValue};
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigError};
pub use mac_address::MacAddress;
pub use output::influxdb::InfluxDbFormatter;
pub use output::{OutputFormatter, Report};
pub use record::{RecordError, SensorRecord, parse_record};
pub use source::{RecordSource, StdinSource};
pub use staleness::StalenessPolicy;
pub use state::{Capabilities, SensorReading, SensorState};
pub use throttle::{Throttle, parse_duration};
