//! Last-known sensor reading, shared between the ingestion path and readers.
//!
//! All three values share one `last_updated_at`: the producer sends combined
//! records, so any field update restarts the freshness window for all of them.

use std::sync::{Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;

/// Optional hardware features of the accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub humidity: bool,
    pub battery: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            humidity: true,
            battery: true,
        }
    }
}

/// Raw values exactly as received, without offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_level: Option<f64>,
    pub last_updated_at: Option<OffsetDateTime>,
}

/// Mutex-guarded [`SensorReading`].
///
/// Each setter writes the value together with the timestamp in one critical
/// section, and [`SensorState::snapshot`] copies the whole reading at once, so
/// a reader never pairs one field with a timestamp from a different write.
#[derive(Debug)]
pub struct SensorState {
    capabilities: Capabilities,
    reading: Mutex<SensorReading>,
}

impl SensorState {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            reading: Mutex::new(SensorReading::default()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    // The reading is plain data, so a panic elsewhere cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, SensorReading> {
        self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent copy of all values and the shared timestamp.
    pub fn snapshot(&self) -> SensorReading {
        *self.lock()
    }

    /// Store a raw temperature. Returns `true` if the state changed.
    pub fn set_temperature(&self, value: Option<f64>, now: OffsetDateTime) -> bool {
        let Some(value) = value else {
            return false;
        };
        let mut reading = self.lock();
        reading.temperature = Some(value);
        reading.last_updated_at = Some(now);
        true
    }

    /// Store a raw humidity. Dropped entirely without the humidity capability.
    pub fn set_humidity(&self, value: Option<f64>, now: OffsetDateTime) -> bool {
        let Some(value) = value else {
            return false;
        };
        if !self.capabilities.humidity {
            return false;
        }
        let mut reading = self.lock();
        reading.humidity = Some(value);
        reading.last_updated_at = Some(now);
        true
    }

    /// Store a raw battery level.
    ///
    /// Unlike humidity, the value is stored even without the battery
    /// capability; only the notification is suppressed by the caller.
    pub fn set_battery_level(&self, value: Option<f64>, now: OffsetDateTime) -> bool {
        let Some(value) = value else {
            return false;
        };
        let mut reading = self.lock();
        reading.battery_level = Some(value);
        reading.last_updated_at = Some(now);
        true
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}
