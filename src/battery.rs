//! Low-battery status derived from battery level.

use std::fmt;

/// Default low-battery threshold in percent.
pub const DEFAULT_LOW_BATTERY_THRESHOLD: f64 = 10.0;

/// Battery status as exposed by a `StatusLowBattery` characteristic.
///
/// "Unavailable" is not a variant: a status query fails with the same error
/// as the battery level it is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Normal,
    Low,
}

impl BatteryStatus {
    /// Derive the status from a level; a level at the threshold counts as low.
    pub fn from_level(level: f64, low_battery_threshold: f64) -> Self {
        if level > low_battery_threshold {
            BatteryStatus::Normal
        } else {
            BatteryStatus::Low
        }
    }

    /// Characteristic value (`BATTERY_LEVEL_NORMAL = 0`, `BATTERY_LEVEL_LOW = 1`).
    pub fn code(self) -> u8 {
        match self {
            BatteryStatus::Normal => 0,
            BatteryStatus::Low => 1,
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryStatus::Normal => write!(f, "normal"),
            BatteryStatus::Low => write!(f, "low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_counts_as_low() {
        assert_eq!(BatteryStatus::from_level(10.0, 10.0), BatteryStatus::Low);
        assert_eq!(BatteryStatus::from_level(9.0, 10.0), BatteryStatus::Low);
        assert_eq!(BatteryStatus::from_level(10.5, 10.0), BatteryStatus::Normal);
        assert_eq!(BatteryStatus::from_level(80.0, 10.0), BatteryStatus::Normal);
    }

    #[test]
    fn test_zero_threshold() {
        assert_eq!(BatteryStatus::from_level(0.0, 0.0), BatteryStatus::Low);
        assert_eq!(BatteryStatus::from_level(1.0, 0.0), BatteryStatus::Normal);
    }

    #[test]
    fn test_codes() {
        assert_eq!(BatteryStatus::Normal.code(), 0);
        assert_eq!(BatteryStatus::Low.code(), 1);
        assert_eq!(BatteryStatus::Low.to_string(), "low");
    }
}
