//! Characteristic reports and their output formats.
//!
//! A [`Report`] is the result of reading every exposed characteristic at one
//! moment, i.e. what a platform would see if it queried the accessory now.

pub mod influxdb;

use crate::accessory::Hygrothermograph;
use crate::characteristic::{Characteristic, CharacteristicValue};
use crate::clock::Clock;
use time::OffsetDateTime;

/// Characteristic values readable at one moment. Unavailable values are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Accessory display name
    pub name: String,
    /// Address of the sensor the latest record came from
    pub address: Option<String>,
    /// Time of the last update
    pub timestamp: Option<OffsetDateTime>,
    pub values: Vec<(Characteristic, CharacteristicValue)>,
}

impl Report {
    /// Query every exposed characteristic of `accessory`.
    pub fn read<C: Clock>(accessory: &Hygrothermograph<C>, address: Option<&str>) -> Self {
        let values = accessory
            .characteristics()
            .into_iter()
            .filter_map(|c| accessory.read(c).ok().map(|value| (c, value)))
            .collect();

        Report {
            name: accessory.config().name.clone(),
            address: address.map(str::to_string),
            timestamp: accessory.snapshot().last_updated_at,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Trait for formatting reports into output lines.
pub trait OutputFormatter: Send + Sync {
    /// Format a report as a single line (without the trailing newline).
    fn format(&self, report: &Report) -> String;
}
