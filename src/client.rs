//! BSB-LAN Client
//!
//! Application-facing accessors. Each read makes sure the section's
//! supported parameters are known, then fetches fresh values for exactly
//! those parameters.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{ApiVersion, Catalog, Circuit, Partition};
use crate::config::BsbLanConfig;
use crate::discovery::{DeviceProfile, Discovery, ValidatedMapping};
use crate::error::{BsbLanError, BsbLanResult};
use crate::models::{
    assemble, Device, DeviceTime, DhwSchedule, EntityInfo, HotWaterConfig, HotWaterSchedule,
    HotWaterState, Info, Sensor, State, StaticState,
};
use crate::transport::{HttpTransport, RawResponse, SetRequest, Transport};

const DEFAULT_TEMPERATURE_UNIT: &str = "°C";

/// Controller date and time
const TIME_PARAMETER: &str = "0";
const DEVICE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// INF telegram carrying the room temperature of circuit 1
const ROOM_TEMPERATURE_TELEGRAM: &str = "10000";
const ROOM_TEMPERATURE_CELSIUS: (f64, f64) = (-10.0, 50.0);
const ROOM_TEMPERATURE_FAHRENHEIT: (f64, f64) = (14.0, 122.0);

/// Heating circuit operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    Off,
    Auto,
    Eco,
    Heat,
}

impl HvacMode {
    pub fn code(self) -> i64 {
        match self {
            HvacMode::Off => 0,
            HvacMode::Auto => 1,
            HvacMode::Eco => 2,
            HvacMode::Heat => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(HvacMode::Off),
            1 => Some(HvacMode::Auto),
            2 => Some(HvacMode::Eco),
            3 => Some(HvacMode::Heat),
            _ => None,
        }
    }
}

impl FromStr for HvacMode {
    type Err = BsbLanError;

    fn from_str(s: &str) -> BsbLanResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(HvacMode::Off),
            "auto" => Ok(HvacMode::Auto),
            "eco" => Ok(HvacMode::Eco),
            "heat" => Ok(HvacMode::Heat),
            _ => Err(BsbLanError::InvalidParameter(s.to_string())),
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HvacMode::Off => "off",
            HvacMode::Auto => "auto",
            HvacMode::Eco => "eco",
            HvacMode::Heat => "heat",
        };
        f.write_str(name)
    }
}

/// A single thermostat change; exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThermostatUpdate {
    pub target_temperature: Option<f64>,
    pub hvac_mode: Option<HvacMode>,
}

impl ThermostatUpdate {
    pub fn target_temperature(value: f64) -> Self {
        Self {
            target_temperature: Some(value),
            ..Default::default()
        }
    }

    pub fn hvac_mode(mode: HvacMode) -> Self {
        Self {
            hvac_mode: Some(mode),
            ..Default::default()
        }
    }
}

/// A single hot water change; exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotWaterUpdate {
    pub operating_mode: Option<i64>,
    pub nominal_setpoint: Option<f64>,
    pub reduced_setpoint: Option<f64>,
    pub nominal_setpoint_max: Option<f64>,
    pub eco_mode_selection: Option<i64>,
    pub dhw_charging_priority: Option<i64>,
    pub legionella_setpoint: Option<f64>,
}

impl HotWaterUpdate {
    fn into_request(self) -> BsbLanResult<SetRequest> {
        let mut requests = Vec::new();
        if let Some(mode) = self.operating_mode {
            requests.push(SetRequest::enum_value("1600", mode));
        }
        if let Some(v) = self.nominal_setpoint {
            requests.push(SetRequest::value("1610", format_decimal(v)));
        }
        if let Some(v) = self.reduced_setpoint {
            requests.push(SetRequest::value("1612", format_decimal(v)));
        }
        if let Some(v) = self.nominal_setpoint_max {
            requests.push(SetRequest::value("1614", format_decimal(v)));
        }
        if let Some(v) = self.eco_mode_selection {
            requests.push(SetRequest::value("1601", v.to_string()));
        }
        if let Some(v) = self.dhw_charging_priority {
            requests.push(SetRequest::value("1630", v.to_string()));
        }
        if let Some(v) = self.legionella_setpoint {
            requests.push(SetRequest::value("1645", format_decimal(v)));
        }

        match requests.len() {
            0 => Err(BsbLanError::NoState),
            1 => Ok(requests.remove(0)),
            _ => Err(BsbLanError::MultipleParameters),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TemperatureRange {
    min: f64,
    max: f64,
}

/// Asynchronous client for one BSB-LAN device
pub struct BsbLan {
    config: BsbLanConfig,
    transport: Arc<dyn Transport>,
    api_version: Option<ApiVersion>,
    discovery: OnceCell<Discovery>,
    temperature_ranges: RwLock<HashMap<Circuit, TemperatureRange>>,
    temperature_unit: RwLock<String>,
}

impl BsbLan {
    pub fn new(config: BsbLanConfig) -> BsbLanResult<Self> {
        let transport = Arc::new(HttpTransport::new(config.clone())?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: BsbLanConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            api_version: None,
            discovery: OnceCell::new(),
            temperature_ranges: RwLock::new(HashMap::new()),
            temperature_unit: RwLock::new(DEFAULT_TEMPERATURE_UNIT.to_string()),
        }
    }

    /// Use a known API version instead of asking the device for its firmware.
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn config(&self) -> &BsbLanConfig {
        &self.config
    }

    /// Per-client discovery state, created on first use.
    pub async fn discovery(&self) -> BsbLanResult<&Discovery> {
        self.discovery
            .get_or_try_init(|| async {
                let version = match self.api_version {
                    Some(version) => version,
                    None => {
                        let device = self.device().await?;
                        ApiVersion::from_firmware(&device.version)?
                    }
                };
                info!("Using BSB-LAN API {:?} for {}", version, self.config.host);
                let catalog = Arc::new(Catalog::for_version(version));
                Ok::<_, BsbLanError>(Discovery::new(catalog, self.transport.clone()))
            })
            .await
    }

    pub async fn initialize(&self) -> BsbLanResult<()> {
        self.discovery().await.map(|_| ())
    }

    pub async fn api_version(&self) -> BsbLanResult<ApiVersion> {
        Ok(self.discovery().await?.catalog().version())
    }

    /// Controller identity, always fetched fresh.
    pub async fn device(&self) -> BsbLanResult<Device> {
        let body = self.transport.device_info().await?;
        if body.get("version").map_or(true, |v| v.is_null()) {
            return Err(BsbLanError::MissingFirmwareVersion);
        }
        serde_json::from_value(body).map_err(|e| BsbLanError::InvalidResponse(e.to_string()))
    }

    pub async fn firmware_version(&self) -> BsbLanResult<String> {
        Ok(self.device().await?.version)
    }

    /// Unit of the temperature range, learned from `static_values`.
    pub async fn temperature_unit(&self) -> String {
        self.temperature_unit.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn state(&self, circuit: Circuit, include: Option<&[&str]>) -> BsbLanResult<State> {
        self.read_section(Partition::Heating(circuit), include).await
    }

    #[instrument(skip(self))]
    pub async fn static_values(
        &self,
        circuit: Circuit,
        include: Option<&[&str]>,
    ) -> BsbLanResult<StaticState> {
        let values: StaticState = self
            .read_section(Partition::StaticValues(circuit), include)
            .await?;
        self.remember_temperature_range(circuit, &values).await;
        Ok(values)
    }

    #[instrument(skip(self))]
    pub async fn sensor(&self, include: Option<&[&str]>) -> BsbLanResult<Sensor> {
        self.read_section(Partition::Sensor, include).await
    }

    #[instrument(skip(self))]
    pub async fn info(&self, include: Option<&[&str]>) -> BsbLanResult<Info> {
        self.read_section(Partition::Device, include).await
    }

    #[instrument(skip(self))]
    pub async fn hot_water_state(&self, include: Option<&[&str]>) -> BsbLanResult<HotWaterState> {
        self.read_section(Partition::HotWaterEssential, include).await
    }

    #[instrument(skip(self))]
    pub async fn hot_water_config(&self, include: Option<&[&str]>) -> BsbLanResult<HotWaterConfig> {
        self.read_section(Partition::HotWaterConfig, include).await
    }

    #[instrument(skip(self))]
    pub async fn hot_water_schedule(
        &self,
        include: Option<&[&str]>,
    ) -> BsbLanResult<HotWaterSchedule> {
        self.read_section(Partition::HotWaterSchedule, include).await
    }

    async fn read_section<T: DeserializeOwned>(
        &self,
        partition: Partition,
        include: Option<&[&str]>,
    ) -> BsbLanResult<T> {
        let discovery = self.discovery().await?;

        let wanted = match include {
            None => None,
            Some(names) => {
                let spec = discovery.catalog().spec(partition);
                let known: Vec<&str> = names
                    .iter()
                    .copied()
                    .filter(|name| spec.id_of(name).is_some())
                    .collect();
                if known.is_empty() {
                    return Err(BsbLanError::InvalidInclude);
                }
                Some(known)
            }
        };

        let mapping = discovery.ensure_validated(partition).await?;
        if mapping.is_empty() {
            return Err(BsbLanError::NoValidParameters {
                partition: partition.key().to_string(),
            });
        }

        let selected: Vec<(&str, &str)> = mapping
            .iter()
            .filter(|(_, name)| wanted.as_ref().map_or(true, |w| w.contains(name)))
            .collect();
        if selected.is_empty() {
            debug!("None of the included parameters are supported by the device");
            return assemble(IndexMap::new());
        }

        let ids: Vec<String> = selected.iter().map(|(id, _)| id.to_string()).collect();
        let response = self.transport.query(&ids).await?;
        assemble(decode_entries(selected, &response))
    }

    /// Fetch arbitrary parameters by ID, bypassing discovery. Keys are parameter IDs.
    #[instrument(skip(self))]
    pub async fn read_parameters(
        &self,
        ids: &[&str],
    ) -> BsbLanResult<IndexMap<String, EntityInfo>> {
        if ids.is_empty() {
            return Err(BsbLanError::NoParameterIds);
        }
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let response = self.transport.query(&ids).await?;
        Ok(decode_entries(ids.iter().map(|id| (id.as_str(), id.as_str())), &response))
    }

    /// Fetch parameters by semantic name. Keys are the names that resolved.
    #[instrument(skip(self))]
    pub async fn read_parameters_by_name(
        &self,
        names: &[&str],
    ) -> BsbLanResult<IndexMap<String, EntityInfo>> {
        if names.is_empty() {
            return Err(BsbLanError::NoParameterIds);
        }
        let catalog = self.discovery().await?.catalog();

        let mut resolved = Vec::new();
        for name in names {
            match catalog.find_id(name) {
                Some(id) => resolved.push((id, *name)),
                None => warn!("Unknown parameter name '{}'", name),
            }
        }
        if resolved.is_empty() {
            return Err(BsbLanError::UnresolvedNames(names.join(", ")));
        }

        let ids: Vec<String> = resolved.iter().map(|(id, _)| id.to_string()).collect();
        let response = self.transport.query(&ids).await?;
        Ok(decode_entries(resolved, &response))
    }

    pub async fn read_parameter_by_name(&self, name: &str) -> BsbLanResult<Option<EntityInfo>> {
        let mut values = self.read_parameters_by_name(&[name]).await?;
        Ok(values.shift_remove(name))
    }

    pub async fn get_parameter_id(&self, name: &str) -> BsbLanResult<Option<String>> {
        let catalog = self.discovery().await?.catalog();
        Ok(catalog.find_id(name).map(str::to_string))
    }

    /// Change the target temperature or operating mode of a heating circuit.
    #[instrument(skip(self))]
    pub async fn thermostat(&self, circuit: Circuit, update: ThermostatUpdate) -> BsbLanResult<()> {
        let request = match (update.target_temperature, update.hvac_mode) {
            (None, None) => return Err(BsbLanError::NoState),
            (Some(_), Some(_)) => return Err(BsbLanError::MultipleParameters),
            (Some(temperature), None) => {
                self.validate_temperature(circuit, temperature).await?;
                SetRequest::value(circuit.target_temperature_id(), format_decimal(temperature))
            }
            (None, Some(mode)) => SetRequest::enum_value(circuit.hvac_mode_id(), mode.code()),
        };

        let response = self.transport.set(&request).await?;
        debug!("Response for setting thermostat: {}", response);
        Ok(())
    }

    async fn validate_temperature(&self, circuit: Circuit, temperature: f64) -> BsbLanResult<()> {
        let cached = self.temperature_ranges.read().await.get(&circuit).copied();
        let range = match cached {
            Some(range) => range,
            None => {
                if let Err(e) = self.static_values(circuit, None).await {
                    if e.is_transport() {
                        return Err(e);
                    }
                    debug!("Static values unavailable for circuit {}: {}", circuit.number(), e);
                }
                self.temperature_ranges
                    .read()
                    .await
                    .get(&circuit)
                    .copied()
                    .ok_or(BsbLanError::TemperatureRangeUnavailable(circuit.number()))?
            }
        };

        if !(range.min..=range.max).contains(&temperature) {
            return Err(BsbLanError::InvalidParameter(format!(
                "{} (allowed {} to {})",
                temperature, range.min, range.max
            )));
        }
        Ok(())
    }

    async fn remember_temperature_range(&self, circuit: Circuit, values: &StaticState) {
        let min = values.min_temp.as_ref().and_then(|e| e.value.as_f64());
        let max = values.max_temp.as_ref().and_then(|e| e.value.as_f64());
        if let (Some(min), Some(max)) = (min, max) {
            self.temperature_ranges
                .write()
                .await
                .insert(circuit, TemperatureRange { min, max });
        }

        if let Some(unit) = values.min_temp.as_ref().map(|e| e.unit.as_str()) {
            if !unit.is_empty() {
                *self.temperature_unit.write().await = unit.to_string();
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn set_hot_water(&self, update: HotWaterUpdate) -> BsbLanResult<()> {
        let request = update.into_request()?;
        let response = self.transport.set(&request).await?;
        debug!("Response for setting hot water: {}", response);
        Ok(())
    }

    /// Write the provided days of the weekly hot water program, one request per day.
    #[instrument(skip(self))]
    pub async fn set_hot_water_schedule(&self, schedule: &DhwSchedule) -> BsbLanResult<()> {
        if !schedule.has_any_schedule() {
            return Err(BsbLanError::NoSchedule);
        }
        for (id, day) in schedule.days() {
            let request = SetRequest::value(id, day.to_string());
            let response = self.transport.set(&request).await?;
            debug!("Response for setting schedule {}: {}", id, response);
        }
        Ok(())
    }

    /// Current date and time of the controller clock.
    #[instrument(skip(self))]
    pub async fn time(&self) -> BsbLanResult<DeviceTime> {
        let ids = [TIME_PARAMETER.to_string()];
        let response = self.transport.query(&ids).await?;
        let raw = response.get(TIME_PARAMETER).ok_or_else(|| {
            BsbLanError::InvalidResponse("device time missing from response".to_string())
        })?;
        let time = EntityInfo::from_raw(raw)
            .map_err(|failure| BsbLanError::InvalidResponse(format!("device time {}", failure)))?;
        Ok(DeviceTime { time })
    }

    /// Set the controller clock. The device expects `DD.MM.YYYY HH:MM:SS`.
    #[instrument(skip(self))]
    pub async fn set_time(&self, time: &str) -> BsbLanResult<()> {
        let time = time.trim();
        if time.is_empty() {
            return Err(BsbLanError::InvalidParameter("empty device time".to_string()));
        }
        let response = self.transport.set(&SetRequest::value(TIME_PARAMETER, time)).await?;
        debug!("Response for setting time: {}", response);
        Ok(())
    }

    pub async fn set_time_from(&self, time: NaiveDateTime) -> BsbLanResult<()> {
        self.set_time(&time.format(DEVICE_TIME_FORMAT).to_string()).await
    }

    /// Report a room temperature measured elsewhere, as a room unit would.
    /// The accepted range follows the device's temperature unit.
    #[instrument(skip(self))]
    pub async fn push_temperature(&self, value: f64) -> BsbLanResult<()> {
        let unit = self.temperature_unit().await;
        let (min, max) = if unit == "°F" {
            ROOM_TEMPERATURE_FAHRENHEIT
        } else {
            ROOM_TEMPERATURE_CELSIUS
        };
        if !(min..=max).contains(&value) {
            return Err(BsbLanError::InvalidParameter(format!(
                "room temperature {} {} (allowed {} to {})",
                value, unit, min, max
            )));
        }

        self.transport
            .inf_telegram(ROOM_TEMPERATURE_TELEGRAM, &format_decimal(value))
            .await
    }

    /// Heating circuits present on the device, by probing each circuit's mode parameter.
    #[instrument(skip(self))]
    pub async fn get_available_circuits(&self) -> BsbLanResult<Vec<u8>> {
        let checks = Circuit::ALL.into_iter().map(|circuit| async move {
            let id = circuit.hvac_mode_id().to_string();
            match self.transport.query(std::slice::from_ref(&id)).await {
                Ok(response) => response
                    .get(&id)
                    .is_some_and(|raw| EntityInfo::from_raw(raw).is_ok())
                    .then_some(circuit.number()),
                Err(e) => {
                    debug!("Circuit {} not reachable: {}", circuit.number(), e);
                    None
                }
            }
        });

        let available = futures::future::join_all(checks).await;
        Ok(available.into_iter().flatten().collect())
    }

    pub async fn seed_partition(
        &self,
        partition: Partition,
        mapping: ValidatedMapping,
    ) -> BsbLanResult<Arc<ValidatedMapping>> {
        Ok(self.discovery().await?.seed(partition, mapping).await)
    }

    pub async fn reset_partition(&self, partition: Partition) -> BsbLanResult<()> {
        self.discovery().await?.reset(partition);
        Ok(())
    }

    pub async fn reset_all(&self) -> BsbLanResult<()> {
        self.discovery().await?.reset_all();
        Ok(())
    }

    pub async fn export_profile(&self) -> BsbLanResult<DeviceProfile> {
        Ok(self.discovery().await?.export_profile())
    }

    pub async fn import_profile(&self, profile: &DeviceProfile) -> BsbLanResult<usize> {
        self.discovery().await?.import_profile(profile).await
    }
}

/// Decode the entries of `response` for the given (id, key) pairs; unusable entries are skipped.
fn decode_entries<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    response: &RawResponse,
) -> IndexMap<String, EntityInfo> {
    let mut entries = IndexMap::new();
    for (id, key) in pairs {
        let Some(raw) = response.get(id) else {
            debug!("Parameter {} missing from response", id);
            continue;
        };
        match EntityInfo::from_raw(raw) {
            Ok(entity) => {
                entries.insert(key.to_string(), entity);
            }
            Err(failure) => debug!("Skipping parameter {}: {}", id, failure),
        }
    }
    entries
}

/// Setpoints are sent with at least one decimal place, e.g. `60.0`.
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hvac_mode_codes() {
        assert_eq!("heat".parse::<HvacMode>().unwrap().code(), 3);
        assert_eq!(HvacMode::from_code(1), Some(HvacMode::Auto));
        assert_eq!(HvacMode::Eco.to_string(), "eco");
        assert!(matches!(
            "turbo".parse::<HvacMode>(),
            Err(BsbLanError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_hot_water_update_requires_exactly_one() {
        assert!(matches!(
            HotWaterUpdate::default().into_request(),
            Err(BsbLanError::NoState)
        ));

        let both = HotWaterUpdate {
            nominal_setpoint: Some(60.0),
            reduced_setpoint: Some(40.0),
            ..Default::default()
        };
        assert!(matches!(both.into_request(), Err(BsbLanError::MultipleParameters)));

        let mode = HotWaterUpdate {
            operating_mode: Some(3),
            ..Default::default()
        };
        assert_eq!(mode.into_request().unwrap(), SetRequest::enum_value("1600", 3));
    }

    #[test]
    fn test_device_time_format() {
        let time = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap();
        assert_eq!(time.format(DEVICE_TIME_FORMAT).to_string(), "01.01.2024 12:30:45");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(60.0), "60.0");
        assert_eq!(format_decimal(21.5), "21.5");
        assert_eq!(format_decimal(-10.0), "-10.0");
    }
}
