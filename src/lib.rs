//! BSB-LAN Client
//!
//! An asynchronous Rust client for BSB-LAN heating controllers with:
//! - Firmware-aware parameter catalog (heating circuits, sensors, hot water)
//! - Lazy, per-section discovery of the parameters a unit actually supports
//! - Concurrency-safe caching of that discovery for the client's lifetime
//! - Fresh, uncached value retrieval on every read
//! - Typed write helpers for thermostat, hot water, DHW schedules, device clock
//!   and room temperature push

pub mod error;
pub mod config;
pub mod catalog;
pub mod discovery;
pub mod transport;
pub mod models;
pub mod client;

// Re-exports for convenience
pub use catalog::{ApiVersion, Catalog, Circuit, Partition, PartitionSpec, Volatility};
pub use client::{BsbLan, HotWaterUpdate, HvacMode, ThermostatUpdate};
pub use config::BsbLanConfig;
pub use discovery::{DeviceProfile, Discovery, ValidatedMapping};
pub use error::{BsbLanError, BsbLanResult};
pub use models::{
    DataType, DaySchedule, Device, DeviceTime, DhwSchedule, EntityInfo, HotWaterConfig,
    HotWaterSchedule, HotWaterState, Info, ParameterValue, Sensor, State, StaticState, TimeSlot,
};
pub use transport::{HttpTransport, RawResponse, SetRequest, Transport};
