//! Device Models
//!
//! Decoding of raw parameter entries into typed values, plus the
//! fixed-shape result structs returned by the accessor facade.

mod schedule;
mod sections;

pub use schedule::{DaySchedule, DhwSchedule, TimeSlot};
pub use sections::{
    assemble, Device, DeviceTime, HotWaterConfig, HotWaterSchedule, HotWaterState, Info, Sensor,
    State, StaticState,
};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Value marker the device uses for "parameter exists in the table but is not supported"
pub const UNSUPPORTED_MARKER: &str = "---";

/// BSB-LAN `dataType` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum DataType {
    PlainNumber,
    Enum,
    BitValue,
    Weekday,
    HourMinute,
    DateTime,
    DayMonth,
    String,
    PpsTime,
    Other(u8),
}

impl From<u8> for DataType {
    fn from(code: u8) -> Self {
        match code {
            0 => DataType::PlainNumber,
            1 => DataType::Enum,
            2 => DataType::BitValue,
            3 => DataType::Weekday,
            4 => DataType::HourMinute,
            5 => DataType::DateTime,
            6 => DataType::DayMonth,
            7 => DataType::String,
            8 => DataType::PpsTime,
            other => DataType::Other(other),
        }
    }
}

impl From<DataType> for u8 {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::PlainNumber => 0,
            DataType::Enum => 1,
            DataType::BitValue => 2,
            DataType::Weekday => 3,
            DataType::HourMinute => 4,
            DataType::DateTime => 5,
            DataType::DayMonth => 6,
            DataType::String => 7,
            DataType::PpsTime => 8,
            DataType::Other(code) => code,
        }
    }
}

/// A decoded parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    Number(f64),
    Integer(i64),
    Time(NaiveTime),
    Text(String),
}

impl ParameterValue {
    /// Convert the device's textual value according to its data type.
    /// Values that do not parse stay as text.
    pub fn convert(raw: &str, data_type: DataType) -> Self {
        let trimmed = raw.trim();
        let converted = match data_type {
            // `f64::from_str` accepts "nan" and "inf"; those stay text
            DataType::PlainNumber => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(ParameterValue::Number),
            DataType::Enum | DataType::Weekday => {
                trimmed.parse::<i64>().ok().map(ParameterValue::Integer)
            }
            DataType::HourMinute => NaiveTime::parse_from_str(trimmed, "%H:%M")
                .ok()
                .map(ParameterValue::Time),
            _ => None,
        };

        converted.unwrap_or_else(|| {
            if matches!(
                data_type,
                DataType::PlainNumber | DataType::Enum | DataType::Weekday | DataType::HourMinute
            ) {
                debug!("Failed to convert value '{}' as {:?}, keeping text", raw, data_type);
            }
            ParameterValue::Text(raw.to_string())
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Integer(i) => Some(*i as f64),
            ParameterValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            ParameterValue::Time(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            ParameterValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            ParameterValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Time(t) => write!(f, "{}", t.format("%H:%M")),
            ParameterValue::Text(s) => f.write_str(s),
        }
    }
}

/// Why a raw entry could not be turned into an `EntityInfo`
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeFailure {
    /// The device lists the parameter but reports it as unsupported
    Unsupported,
    /// The entry does not have the expected shape
    Malformed(String),
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::Unsupported => f.write_str("unsupported"),
            DecodeFailure::Malformed(reason) => write!(f, "malformed: {}", reason),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    desc: String,
    #[serde(rename = "dataType", default)]
    data_type: u8,
    #[serde(rename = "dataType_name", default)]
    data_type_name: String,
    #[serde(rename = "dataType_family", default)]
    data_type_family: String,
    #[serde(default)]
    error: i64,
    #[serde(default)]
    readonly: u8,
    #[serde(default)]
    readwrite: u8,
    #[serde(default)]
    precision: Option<f64>,
}

/// One decoded parameter as reported by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub name: String,
    pub value: ParameterValue,
    pub unit: String,
    pub desc: String,
    pub data_type: DataType,
    #[serde(default)]
    pub data_type_name: String,
    #[serde(default)]
    pub data_type_family: String,
    #[serde(default)]
    pub error: i64,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub readwrite: bool,
    #[serde(default)]
    pub precision: Option<f64>,
}

impl EntityInfo {
    pub fn new(
        name: impl Into<String>,
        value: &str,
        unit: &str,
        desc: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::convert(value, data_type),
            unit: normalize_unit(unit),
            desc: desc.into(),
            data_type,
            data_type_name: String::new(),
            data_type_family: String::new(),
            error: 0,
            readonly: false,
            readwrite: false,
            precision: None,
        }
    }

    /// Decode one raw `/JQ` entry.
    pub fn from_raw(raw: &Value) -> Result<Self, DecodeFailure> {
        let object = raw
            .as_object()
            .ok_or_else(|| DecodeFailure::Malformed(format!("expected an object, got {}", raw)))?;
        if object.is_empty() {
            return Err(DecodeFailure::Malformed("empty entry".to_string()));
        }

        let entry: RawEntry = serde_json::from_value(raw.clone())
            .map_err(|e| DecodeFailure::Malformed(e.to_string()))?;

        let text = match entry.value {
            None => return Err(DecodeFailure::Malformed("missing value".to_string())),
            Some(Value::Null) => return Err(DecodeFailure::Unsupported),
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => {
                return Err(DecodeFailure::Malformed(format!("unexpected value {}", other)))
            }
        };
        if text.trim() == UNSUPPORTED_MARKER {
            return Err(DecodeFailure::Unsupported);
        }

        let data_type = DataType::from(entry.data_type);
        Ok(Self {
            name: entry.name,
            value: ParameterValue::convert(&text, data_type),
            unit: normalize_unit(&entry.unit),
            desc: entry.desc,
            data_type,
            data_type_name: entry.data_type_name,
            data_type_family: entry.data_type_family,
            error: entry.error,
            readonly: entry.readonly != 0,
            readwrite: entry.readwrite != 0,
            precision: entry.precision,
        })
    }

    /// Description text of an enum value; `None` for other data types.
    pub fn enum_description(&self) -> Option<&str> {
        match self.data_type {
            DataType::Enum => Some(&self.desc),
            _ => None,
        }
    }

    /// Home-automation device class implied by the unit.
    pub fn suggested_device_class(&self) -> Option<&'static str> {
        if self.data_type != DataType::PlainNumber {
            return None;
        }
        match self.unit.as_str() {
            "°C" | "°F" | "K" => Some("temperature"),
            "Wh" | "kWh" | "MWh" => Some("energy"),
            "W" | "kW" => Some("power"),
            "bar" | "mbar" | "Pa" | "hPa" => Some("pressure"),
            "V" => Some("voltage"),
            "A" => Some("current"),
            "Hz" => Some("frequency"),
            "l/min" | "l/h" => Some("volume_flow_rate"),
            "h" | "min" | "s" => Some("duration"),
            "%" => Some("power_factor"),
            _ => None,
        }
    }

    /// Home-automation state class; energy readings are cumulative.
    pub fn suggested_state_class(&self) -> Option<&'static str> {
        match self.suggested_device_class()? {
            "energy" => Some("total_increasing"),
            _ => Some("measurement"),
        }
    }
}

/// Decode HTML entities the firmware uses in units (`&deg;C`, `&#176;C`).
pub fn normalize_unit(unit: &str) -> String {
    html_escape::decode_html_entities(unit.trim()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_by_data_type() {
        assert_eq!(
            ParameterValue::convert("21.5", DataType::PlainNumber),
            ParameterValue::Number(21.5)
        );
        assert_eq!(ParameterValue::convert("114", DataType::Enum), ParameterValue::Integer(114));
        assert_eq!(
            ParameterValue::convert("14:30", DataType::HourMinute),
            ParameterValue::Time(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
        );
        assert_eq!(
            ParameterValue::convert("06:00-22:00", DataType::String),
            ParameterValue::Text("06:00-22:00".into())
        );
    }

    #[test]
    fn test_failed_conversion_keeps_text() {
        assert_eq!(
            ParameterValue::convert("24:61", DataType::HourMinute),
            ParameterValue::Text("24:61".into())
        );
        assert_eq!(
            ParameterValue::convert("not-a-number", DataType::Weekday),
            ParameterValue::Text("not-a-number".into())
        );
    }

    #[test]
    fn test_non_finite_numbers_stay_text() {
        for raw in ["nan", "inf", "-infinity"] {
            let value = ParameterValue::convert(raw, DataType::PlainNumber);
            assert_eq!(value, ParameterValue::Text(raw.into()));
            assert_eq!(value.as_f64(), None);
        }
    }

    #[test]
    fn test_from_raw_valid_entry() {
        let raw = json!({
            "name": "Raumtemperatur 1",
            "value": "21.5",
            "unit": "&deg;C",
            "desc": "",
            "dataType": 0,
            "readonly": 1
        });
        let entity = EntityInfo::from_raw(&raw).unwrap();
        assert_eq!(entity.value.as_f64(), Some(21.5));
        assert_eq!(entity.unit, "°C");
        assert!(entity.readonly);
        assert_eq!(entity.suggested_device_class(), Some("temperature"));
    }

    #[test]
    fn test_from_raw_rejections() {
        assert!(matches!(EntityInfo::from_raw(&json!({})), Err(DecodeFailure::Malformed(_))));
        assert!(matches!(
            EntityInfo::from_raw(&json!({"name": "x", "unit": ""})),
            Err(DecodeFailure::Malformed(_))
        ));
        assert_eq!(
            EntityInfo::from_raw(&json!({"name": "x", "value": "---"})),
            Err(DecodeFailure::Unsupported)
        );
        assert_eq!(
            EntityInfo::from_raw(&json!({"name": "x", "value": null})),
            Err(DecodeFailure::Unsupported)
        );
        assert!(matches!(EntityInfo::from_raw(&Value::Null), Err(DecodeFailure::Malformed(_))));
        assert!(matches!(
            EntityInfo::from_raw(&json!({"name": "x", "value": "1", "dataType": "zero"})),
            Err(DecodeFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_enum_description_only_for_enums() {
        let mode = EntityInfo::new("Mode", "1", "", "Automatic", DataType::Enum);
        assert_eq!(mode.enum_description(), Some("Automatic"));

        let temp = EntityInfo::new("Temp", "22", "°C", "Not an enum", DataType::PlainNumber);
        assert_eq!(temp.enum_description(), None);
    }

    #[test]
    fn test_state_class() {
        let energy = EntityInfo::new("Energy", "7538", "kWh", "", DataType::PlainNumber);
        assert_eq!(energy.suggested_state_class(), Some("total_increasing"));

        let pressure = EntityInfo::new("Pressure", "1.5", "bar", "", DataType::PlainNumber);
        assert_eq!(pressure.suggested_state_class(), Some("measurement"));

        let unknown = EntityInfo::new("Oil", "3", "bbl", "", DataType::PlainNumber);
        assert_eq!(unknown.suggested_device_class(), None);
        assert_eq!(unknown.suggested_state_class(), None);
    }

    #[test]
    fn test_entity_serde_round_trip_keeps_time() {
        let entity = EntityInfo::new("Legionella time", "12:00", "", "", DataType::HourMinute);
        let value = serde_json::to_value(&entity).unwrap();
        let back: EntityInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back, entity);
    }
}
