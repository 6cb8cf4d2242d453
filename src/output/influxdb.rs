//! InfluxDB line protocol output formatter.

use crate::characteristic::CharacteristicValue;
use crate::output::{OutputFormatter, Report};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Field values for InfluxDB line protocol
#[derive(Debug, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Float(num) => write!(f, "{num}"),
            FieldValue::Integer(num) => write!(f, "{num}i"),
        }
    }
}

impl From<CharacteristicValue> for FieldValue {
    fn from(value: CharacteristicValue) -> Self {
        match value {
            CharacteristicValue::Float(num) => FieldValue::Float(num),
            CharacteristicValue::BatteryStatus(status) => {
                FieldValue::Integer(status.code().into())
            }
        }
    }
}

/// Escape commas, equals signs and spaces in tag keys and values.
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Data point in InfluxDB line protocol
#[derive(Debug)]
pub struct DataPoint {
    pub measurement: String,
    pub tag_set: BTreeMap<String, String>,
    pub field_set: BTreeMap<String, FieldValue>,
    pub timestamp: Option<OffsetDateTime>,
}

impl fmt::Display for DataPoint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.measurement)?;
        for (key, value) in &self.tag_set {
            write!(fmt, ",{}={}", escape_tag(key), escape_tag(value))?;
        }

        let mut separator = " ";
        for (key, value) in &self.field_set {
            write!(fmt, "{separator}{key}={value}")?;
            separator = ",";
        }

        if let Some(time) = self.timestamp {
            write!(fmt, " {}", time.unix_timestamp_nanos())?;
        }
        Ok(())
    }
}

/// InfluxDB line protocol formatter.
pub struct InfluxDbFormatter {
    /// The measurement name in InfluxDB
    measurement_name: String,
}

impl InfluxDbFormatter {
    pub fn new(measurement_name: String) -> Self {
        Self { measurement_name }
    }

    fn tag_set(report: &Report) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("name".to_string(), report.name.clone());
        if let Some(address) = &report.address {
            tags.insert("mac".to_string(), address.clone());
        }
        tags
    }

    fn field_set(report: &Report) -> BTreeMap<String, FieldValue> {
        report
            .values
            .iter()
            .map(|(characteristic, value)| {
                (characteristic.field().to_string(), FieldValue::from(*value))
            })
            .collect()
    }

    fn to_data_point(&self, report: &Report) -> DataPoint {
        DataPoint {
            measurement: self.measurement_name.clone(),
            tag_set: Self::tag_set(report),
            field_set: Self::field_set(report),
            timestamp: report.timestamp,
        }
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn format(&self, report: &Report) -> String {
        self.to_data_point(report).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::BatteryStatus;
    use crate::characteristic::Characteristic;
    use time::macros::datetime;

    fn report(values: Vec<(Characteristic, CharacteristicValue)>) -> Report {
        Report {
            name: "Bedroom".to_string(),
            address: Some("A4:C1:38:05:0E:F0".to_string()),
            timestamp: Some(datetime!(2001-09-09 01:46:40 UTC)),
            values,
        }
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(format!("{}", FieldValue::Float(3.25)), "3.25");
        assert_eq!(format!("{}", FieldValue::Integer(1)), "1i");
    }

    #[test]
    fn test_escape_tag() {
        assert_eq!(escape_tag("Living Room"), "Living\\ Room");
        assert_eq!(escape_tag("a,b=c"), "a\\,b\\=c");
    }

    #[test]
    fn test_data_point_without_timestamp() {
        let mut fields = BTreeMap::new();
        fields.insert("temperature".to_string(), FieldValue::Float(21.5));
        let data_point = DataPoint {
            measurement: "test".to_string(),
            tag_set: BTreeMap::new(),
            field_set: fields,
            timestamp: None,
        };
        assert_eq!(data_point.to_string(), "test temperature=21.5");
    }

    #[test]
    fn test_influxdb_formatter_full_report() {
        let formatter = InfluxDbFormatter::new("hygrothermograph".to_string());
        let line = formatter.format(&report(vec![
            (
                Characteristic::BatteryLevel,
                CharacteristicValue::Float(80.0),
            ),
            (
                Characteristic::StatusLowBattery,
                CharacteristicValue::BatteryStatus(BatteryStatus::Normal),
            ),
            (
                Characteristic::CurrentTemperature,
                CharacteristicValue::Float(21.8),
            ),
            (
                Characteristic::CurrentRelativeHumidity,
                CharacteristicValue::Float(45.0),
            ),
        ]));

        assert_eq!(
            line,
            "hygrothermograph,mac=A4:C1:38:05:0E:F0,name=Bedroom \
             battery_level=80,battery_status=0i,humidity=45,temperature=21.8 \
             1000000000000000000"
        );
    }

    #[test]
    fn test_influxdb_formatter_partial_report() {
        let formatter = InfluxDbFormatter::new("hygrothermograph".to_string());
        let mut report = report(vec![(
            Characteristic::StatusLowBattery,
            CharacteristicValue::BatteryStatus(BatteryStatus::Low),
        )]);
        report.address = None;
        report.name = "Living Room".to_string();

        let line = formatter.format(&report);
        assert!(line.starts_with("hygrothermograph,name=Living\\ Room battery_status=1i"));
        assert!(!line.contains("mac="));
        assert!(!line.contains("temperature="));
    }
}
