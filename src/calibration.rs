//! Additive calibration offsets.
//!
//! Offsets are applied when a value is read, never when it is stored, so the
//! stored reading stays independent of the configuration.

/// Configured additive offsets for temperature and humidity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offsets {
    /// Added to raw temperature (Celsius)
    pub temperature: f64,
    /// Added to raw relative humidity (percent)
    pub humidity: f64,
}

impl Offsets {
    pub const fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    #[inline]
    pub fn apply_temperature(&self, raw: f64) -> f64 {
        raw + self.temperature
    }

    #[inline]
    pub fn apply_humidity(&self, raw: f64) -> f64 {
        raw + self.humidity
    }
}
