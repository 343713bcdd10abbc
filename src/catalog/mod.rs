//! Partition Catalog
//!
//! Static description of which parameters the client knows about, grouped
//! into partitions that are discovered independently. The catalog is built
//! once per client from the firmware's API version and never mutated.

mod params;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BsbLanError, BsbLanResult};
use params::ParamTable;

/// A heating circuit on the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Circuit {
    #[default]
    One,
    Two,
    Three,
}

impl Circuit {
    pub const ALL: [Circuit; 3] = [Circuit::One, Circuit::Two, Circuit::Three];

    pub fn number(self) -> u8 {
        match self {
            Circuit::One => 1,
            Circuit::Two => 2,
            Circuit::Three => 3,
        }
    }

    /// Parameter written to change the comfort setpoint.
    pub fn target_temperature_id(self) -> &'static str {
        match self {
            Circuit::One => "710",
            Circuit::Two => "1010",
            Circuit::Three => "1310",
        }
    }

    /// Parameter written to change the operating mode; also used to detect the circuit.
    pub fn hvac_mode_id(self) -> &'static str {
        match self {
            Circuit::One => "700",
            Circuit::Two => "1000",
            Circuit::Three => "1300",
        }
    }
}

impl TryFrom<u8> for Circuit {
    type Error = BsbLanError;

    fn try_from(value: u8) -> BsbLanResult<Self> {
        match value {
            1 => Ok(Circuit::One),
            2 => Ok(Circuit::Two),
            3 => Ok(Circuit::Three),
            other => Err(BsbLanError::InvalidCircuit(other)),
        }
    }
}

/// How often values in a partition are expected to change.
/// Used by callers to pick polling intervals; discovery ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Fast,
    Slow,
    Static,
}

/// A unit of independent discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    Heating(Circuit),
    StaticValues(Circuit),
    Device,
    Sensor,
    HotWaterEssential,
    HotWaterConfig,
    HotWaterSchedule,
}

impl Partition {
    pub const ALL: [Partition; 11] = [
        Partition::Heating(Circuit::One),
        Partition::Heating(Circuit::Two),
        Partition::Heating(Circuit::Three),
        Partition::StaticValues(Circuit::One),
        Partition::StaticValues(Circuit::Two),
        Partition::StaticValues(Circuit::Three),
        Partition::Device,
        Partition::Sensor,
        Partition::HotWaterEssential,
        Partition::HotWaterConfig,
        Partition::HotWaterSchedule,
    ];

    /// Stable string key, used in logs, errors and device profiles.
    pub fn key(&self) -> &'static str {
        match self {
            Partition::Heating(Circuit::One) => "heating",
            Partition::Heating(Circuit::Two) => "heating_circuit2",
            Partition::Heating(Circuit::Three) => "heating_circuit3",
            Partition::StaticValues(Circuit::One) => "static_values",
            Partition::StaticValues(Circuit::Two) => "static_values_circuit2",
            Partition::StaticValues(Circuit::Three) => "static_values_circuit3",
            Partition::Device => "device",
            Partition::Sensor => "sensor",
            Partition::HotWaterEssential => "essential",
            Partition::HotWaterConfig => "config",
            Partition::HotWaterSchedule => "schedule",
        }
    }

    pub fn volatility(&self) -> Volatility {
        match self {
            Partition::Heating(_) | Partition::Sensor | Partition::HotWaterEssential => {
                Volatility::Fast
            }
            Partition::HotWaterConfig | Partition::HotWaterSchedule => Volatility::Slow,
            Partition::StaticValues(_) | Partition::Device => Volatility::Static,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Partition::Heating(c) => c.number() as usize - 1,
            Partition::StaticValues(c) => 2 + c.number() as usize,
            Partition::Device => 6,
            Partition::Sensor => 7,
            Partition::HotWaterEssential => 8,
            Partition::HotWaterConfig => 9,
            Partition::HotWaterSchedule => 10,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Partition {
    type Err = BsbLanError;

    fn from_str(s: &str) -> BsbLanResult<Self> {
        Partition::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| BsbLanError::UnknownPartition(s.to_string()))
    }
}

/// API generation spoken by the device firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
    V3,
}

impl ApiVersion {
    /// Map a firmware version string such as `3.1.2-20230101` to its API.
    /// Firmware below 1.2.0 speaks v1, 3.0.0 and later speaks v3.
    pub fn from_firmware(version: &str) -> BsbLanResult<Self> {
        let parsed = parse_version(version)
            .ok_or_else(|| BsbLanError::UnsupportedVersion(version.to_string()))?;

        if parsed < (1, 2, 0) {
            Ok(ApiVersion::V1)
        } else if parsed >= (3, 0, 0) {
            Ok(ApiVersion::V3)
        } else {
            Err(BsbLanError::UnsupportedVersion(version.to_string()))
        }
    }
}

fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let core = version.trim().split(['-', '+', ' ']).next()?;
    let mut parts = core.split('.').map(|p| p.parse::<u32>());

    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    Some((major, minor, patch))
}

/// Candidate parameters of one partition, in catalog order
#[derive(Debug, Clone)]
pub struct PartitionSpec {
    pub partition: Partition,
    candidates: Vec<(&'static str, &'static str)>,
}

impl PartitionSpec {
    fn build(partition: Partition, tables: &[ParamTable]) -> Self {
        let candidates = tables.iter().flat_map(|t| t.iter().copied()).collect();
        Self { partition, candidates }
    }

    pub fn candidates(&self) -> &[(&'static str, &'static str)] {
        &self.candidates
    }

    pub fn candidate_ids(&self) -> Vec<String> {
        self.candidates.iter().map(|(id, _)| id.to_string()).collect()
    }

    pub fn name_of(&self, id: &str) -> Option<&'static str> {
        self.candidates.iter().find(|(cid, _)| *cid == id).map(|(_, name)| *name)
    }

    pub fn id_of(&self, name: &str) -> Option<&'static str> {
        self.candidates.iter().find(|(_, cname)| *cname == name).map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// The full catalog for one API version
#[derive(Debug, Clone)]
pub struct Catalog {
    version: ApiVersion,
    specs: Vec<PartitionSpec>,
}

impl Catalog {
    pub fn for_version(version: ApiVersion) -> Self {
        let specs = Partition::ALL
            .iter()
            .map(|&partition| PartitionSpec::build(partition, &Self::tables(partition, version)))
            .collect();
        Self { version, specs }
    }

    fn tables(partition: Partition, version: ApiVersion) -> Vec<ParamTable> {
        use params::*;
        let v3 = version == ApiVersion::V3;

        match partition {
            Partition::Heating(Circuit::One) => {
                if v3 {
                    vec![HEATING_CIRCUIT1, HEATING_CIRCUIT1_V3]
                } else {
                    vec![HEATING_CIRCUIT1]
                }
            }
            Partition::Heating(Circuit::Two) => {
                if v3 {
                    vec![HEATING_CIRCUIT2, HEATING_CIRCUIT2_V3]
                } else {
                    vec![HEATING_CIRCUIT2]
                }
            }
            Partition::Heating(Circuit::Three) => {
                if v3 {
                    vec![HEATING_CIRCUIT3, HEATING_CIRCUIT3_V3]
                } else {
                    vec![HEATING_CIRCUIT3]
                }
            }
            Partition::StaticValues(Circuit::One) => {
                let max_temp = if v3 {
                    STATIC_CIRCUIT1_V3
                } else {
                    STATIC_CIRCUIT1_V1
                };
                vec![STATIC_CIRCUIT1, max_temp]
            }
            Partition::StaticValues(Circuit::Two) => {
                let max_temp = if v3 {
                    STATIC_CIRCUIT2_V3
                } else {
                    STATIC_CIRCUIT2_V1
                };
                vec![STATIC_CIRCUIT2, max_temp]
            }
            Partition::StaticValues(Circuit::Three) => {
                let max_temp = if v3 {
                    STATIC_CIRCUIT3_V3
                } else {
                    STATIC_CIRCUIT3_V1
                };
                vec![STATIC_CIRCUIT3, max_temp]
            }
            Partition::Device => vec![DEVICE],
            Partition::Sensor => vec![SENSOR],
            Partition::HotWaterEssential => vec![HOT_WATER_ESSENTIAL],
            Partition::HotWaterConfig => vec![HOT_WATER_CONFIG],
            Partition::HotWaterSchedule => vec![HOT_WATER_SCHEDULE],
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Every partition is present, so lookup cannot miss.
    pub fn spec(&self, partition: Partition) -> &PartitionSpec {
        &self.specs[partition.index()]
    }

    pub fn specs(&self) -> impl Iterator<Item = &PartitionSpec> {
        self.specs.iter()
    }

    /// Resolve a semantic name to the first matching parameter ID.
    pub fn find_id(&self, name: &str) -> Option<&'static str> {
        self.specs.iter().find_map(|spec| spec.id_of(name))
    }
}
