use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{DaySchedule, DhwSchedule, EntityInfo};
use crate::error::BsbLanResult;

/// Build a section struct from decoded entries keyed by semantic name.
/// Names the struct does not know are dropped; fields without an entry stay `None`.
pub fn assemble<T: DeserializeOwned>(entries: IndexMap<String, EntityInfo>) -> BsbLanResult<T> {
    let value = serde_json::to_value(entries)?;
    Ok(serde_json::from_value(value)?)
}

/// Heating circuit state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub hvac_mode: Option<EntityInfo>,
    pub target_temperature: Option<EntityInfo>,
    pub hvac_mode2: Option<EntityInfo>,
    pub hvac_action: Option<EntityInfo>,
    pub current_temperature: Option<EntityInfo>,
    pub room1_thermostat_mode: Option<EntityInfo>,
    pub room1_temp_setpoint_boost: Option<EntityInfo>,
}

/// Values that do not change while the controller runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticState {
    pub min_temp: Option<EntityInfo>,
    pub max_temp: Option<EntityInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensor {
    pub outside_temperature: Option<EntityInfo>,
    pub current_temperature: Option<EntityInfo>,
}

/// Heating system identification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub device_identification: Option<EntityInfo>,
    pub controller_family: Option<EntityInfo>,
    pub controller_variant: Option<EntityInfo>,
}

/// Hot water values polled on every update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotWaterState {
    pub operating_mode: Option<EntityInfo>,
    pub nominal_setpoint: Option<EntityInfo>,
    pub reduced_setpoint: Option<EntityInfo>,
    pub dhw_actual_value_top_temperature: Option<EntityInfo>,
    pub state_dhw_pump: Option<EntityInfo>,
}

/// Hot water settings that change rarely
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotWaterConfig {
    pub eco_mode_selection: Option<EntityInfo>,
    pub nominal_setpoint_max: Option<EntityInfo>,
    pub release: Option<EntityInfo>,
    pub dhw_charging_priority: Option<EntityInfo>,
    pub legionella_function: Option<EntityInfo>,
    pub legionella_periodicity: Option<EntityInfo>,
    pub legionella_function_day: Option<EntityInfo>,
    pub legionella_function_time: Option<EntityInfo>,
    pub legionella_setpoint: Option<EntityInfo>,
    pub legionella_dwelling_time: Option<EntityInfo>,
    pub legionella_circulation_pump: Option<EntityInfo>,
    pub legionella_circulation_temp_diff: Option<EntityInfo>,
    pub dhw_circulation_pump_release: Option<EntityInfo>,
    pub dhw_circulation_pump_cycling: Option<EntityInfo>,
    pub dhw_circulation_setpoint: Option<EntityInfo>,
    pub operating_mode_changeover: Option<EntityInfo>,
}

/// Hot water time programs as reported by the device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotWaterSchedule {
    pub dhw_time_program_monday: Option<EntityInfo>,
    pub dhw_time_program_tuesday: Option<EntityInfo>,
    pub dhw_time_program_wednesday: Option<EntityInfo>,
    pub dhw_time_program_thursday: Option<EntityInfo>,
    pub dhw_time_program_friday: Option<EntityInfo>,
    pub dhw_time_program_saturday: Option<EntityInfo>,
    pub dhw_time_program_sunday: Option<EntityInfo>,
    pub dhw_time_program_standard_values: Option<EntityInfo>,
}

impl HotWaterSchedule {
    /// Parse the per-day programs. Days that are absent or unparsable stay `None`.
    pub fn to_schedule(&self) -> DhwSchedule {
        let parse = |entry: &Option<EntityInfo>| {
            entry
                .as_ref()
                .and_then(|e| DaySchedule::parse(&e.value.to_string()).ok())
        };

        DhwSchedule {
            monday: parse(&self.dhw_time_program_monday),
            tuesday: parse(&self.dhw_time_program_tuesday),
            wednesday: parse(&self.dhw_time_program_wednesday),
            thursday: parse(&self.dhw_time_program_thursday),
            friday: parse(&self.dhw_time_program_friday),
            saturday: parse(&self.dhw_time_program_saturday),
            sunday: parse(&self.dhw_time_program_sunday),
        }
    }
}

/// Controller clock (parameter 0), value as `DD.MM.YYYY HH:MM:SS`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTime {
    pub time: EntityInfo,
}

/// Controller identity from `/JI`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub version: String,
    #[serde(rename = "MAC")]
    pub mac: String,
    #[serde(default)]
    pub uptime: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataType;
    use serde_json::json;

    #[test]
    fn test_assemble_leaves_missing_fields_absent() {
        let mut entries = IndexMap::new();
        entries.insert(
            "nominal_setpoint".to_string(),
            EntityInfo::new("Nennsollwert", "50.0", "&deg;C", "", DataType::PlainNumber),
        );

        let state: HotWaterState = assemble(entries).unwrap();
        assert_eq!(state.nominal_setpoint.unwrap().value.as_f64(), Some(50.0));
        assert!(state.operating_mode.is_none());
        assert!(state.state_dhw_pump.is_none());
    }

    #[test]
    fn test_assemble_keeps_non_numeric_readings() {
        let mut entries = IndexMap::new();
        entries.insert(
            "dhw_actual_value_top_temperature".to_string(),
            EntityInfo::new("Trinkwassertemperatur 1", "nan", "&deg;C", "", DataType::PlainNumber),
        );
        entries.insert(
            "nominal_setpoint".to_string(),
            EntityInfo::new("Nennsollwert", "50.0", "&deg;C", "", DataType::PlainNumber),
        );

        let state: HotWaterState = assemble(entries).unwrap();
        let reading = state.dhw_actual_value_top_temperature.unwrap();
        assert_eq!(reading.value.as_str(), Some("nan"));
        assert_eq!(state.nominal_setpoint.unwrap().value.as_f64(), Some(50.0));
    }

    #[test]
    fn test_assemble_ignores_foreign_names() {
        let mut entries = IndexMap::new();
        entries.insert(
            "not_a_field".to_string(),
            EntityInfo::new("x", "1", "", "", DataType::PlainNumber),
        );
        let sensor: Sensor = assemble(entries).unwrap();
        assert_eq!(sensor, Sensor::default());
    }

    #[test]
    fn test_device_from_json_info() {
        let device: Device = serde_json::from_value(json!({
            "name": "BSB-LAN",
            "version": "1.0.38-20200730234859",
            "MAC": "00:80:41:19:69:90",
            "uptime": 969402857
        }))
        .unwrap();
        assert_eq!(device.mac, "00:80:41:19:69:90");
        assert_eq!(device.uptime, 969402857);
    }

    #[test]
    fn test_schedule_entries_parse_into_days() {
        let schedule = HotWaterSchedule {
            dhw_time_program_monday: Some(EntityInfo::new(
                "Zeitprogramm Montag",
                "06:00-08:00 17:00-21:00",
                "",
                "",
                DataType::String,
            )),
            dhw_time_program_tuesday: Some(EntityInfo::new(
                "Di",
                "broken",
                "",
                "",
                DataType::String,
            )),
            ..Default::default()
        };

        let days = schedule.to_schedule();
        assert_eq!(days.monday.unwrap().slots().len(), 2);
        assert!(days.tuesday.is_none());
        assert!(days.wednesday.is_none());
    }
}
