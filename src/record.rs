//! Producer record parsing.
//!
//! The sniffer emits one line per advertisement:
//!
//! ```text
//! address / name / rssi / temperature / humidity / battery
//! ```
//!
//! Only the address and the three readings are kept. Numeric fields are
//! parsed leniently: anything that is not a finite number becomes `None`
//! instead of failing the whole record.

use crate::mac_address::MacAddress;
use thiserror::Error;

/// Field separator used by the producer.
pub const FIELD_SEPARATOR: char = '/';

/// Number of fields a well-formed record carries.
pub const FIELD_COUNT: usize = 6;

const ADDRESS_FIELD: usize = 0;
const TEMPERATURE_FIELD: usize = 3;
const HUMIDITY_FIELD: usize = 4;
const BATTERY_FIELD: usize = 5;

/// Errors for lines that do not have the record layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("empty record")]
    Empty,
    #[error("malformed record: expected {FIELD_COUNT} fields, got {0}")]
    MissingFields(usize),
}

/// One decoded producer record.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    /// Source address exactly as printed by the producer
    pub address: String,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Relative humidity in percent (0-100)
    pub humidity: Option<f64>,
    /// Battery level in percent (0-100)
    pub battery: Option<f64>,
}

impl SensorRecord {
    /// The source address, if it is a parseable MAC address.
    pub fn mac(&self) -> Option<MacAddress> {
        self.address.parse().ok()
    }
}

fn parse_value(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a single producer line into a [`SensorRecord`].
///
/// Extra trailing fields are ignored.
///
/// # Example
/// ```
/// use hygrothermograph_bridge::record::parse_record;
///
/// let record = parse_record("a4:c1:38:5:e:f0/ATC_050EF0/-60/21.3/45.0/80").unwrap();
/// assert_eq!(record.temperature, Some(21.3));
/// assert_eq!(record.battery, Some(80.0));
/// ```
pub fn parse_record(line: &str) -> Result<SensorRecord, RecordError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(RecordError::Empty);
    }

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < FIELD_COUNT {
        return Err(RecordError::MissingFields(fields.len()));
    }

    Ok(SensorRecord {
        address: fields[ADDRESS_FIELD].trim().to_string(),
        temperature: parse_value(fields[TEMPERATURE_FIELD]),
        humidity: parse_value(fields[HUMIDITY_FIELD]),
        battery: parse_value(fields[BATTERY_FIELD]),
    })
}
