//! Parameter tables, keyed by BSB-LAN parameter number.
//!
//! Each table is ordered; discovery and retrieval keep this order.

pub type ParamTable = &'static [(&'static str, &'static str)];

pub const HEATING_CIRCUIT1: ParamTable = &[
    ("700", "hvac_mode"),
    ("710", "target_temperature"),
    ("900", "hvac_mode2"),
    ("8000", "hvac_action"),
    ("8740", "current_temperature"),
    ("8749", "room1_thermostat_mode"),
];
pub const HEATING_CIRCUIT1_V3: ParamTable = &[("770", "room1_temp_setpoint_boost")];

pub const HEATING_CIRCUIT2: ParamTable = &[
    ("1000", "hvac_mode"),
    ("1010", "target_temperature"),
    ("1200", "hvac_mode2"),
    ("8001", "hvac_action"),
    ("8770", "current_temperature"),
];
pub const HEATING_CIRCUIT2_V3: ParamTable = &[("1070", "room1_temp_setpoint_boost")];

pub const HEATING_CIRCUIT3: ParamTable = &[
    ("1300", "hvac_mode"),
    ("1310", "target_temperature"),
    ("1500", "hvac_mode2"),
    ("8002", "hvac_action"),
    ("8800", "current_temperature"),
];
pub const HEATING_CIRCUIT3_V3: ParamTable = &[("1370", "room1_temp_setpoint_boost")];

pub const STATIC_CIRCUIT1: ParamTable = &[("714", "min_temp")];
pub const STATIC_CIRCUIT1_V1: ParamTable = &[("730", "max_temp")];
pub const STATIC_CIRCUIT1_V3: ParamTable = &[("716", "max_temp")];

pub const STATIC_CIRCUIT2: ParamTable = &[("1014", "min_temp")];
pub const STATIC_CIRCUIT2_V1: ParamTable = &[("1030", "max_temp")];
pub const STATIC_CIRCUIT2_V3: ParamTable = &[("1016", "max_temp")];

pub const STATIC_CIRCUIT3: ParamTable = &[("1314", "min_temp")];
pub const STATIC_CIRCUIT3_V1: ParamTable = &[("1330", "max_temp")];
pub const STATIC_CIRCUIT3_V3: ParamTable = &[("1316", "max_temp")];

pub const DEVICE: ParamTable = &[
    ("6224", "device_identification"),
    ("6225", "controller_family"),
    ("6226", "controller_variant"),
];

pub const SENSOR: ParamTable = &[
    ("8700", "outside_temperature"),
    ("8740", "current_temperature"),
];

/// Hot water values polled on every update.
pub const HOT_WATER_ESSENTIAL: ParamTable = &[
    ("1600", "operating_mode"),
    ("1610", "nominal_setpoint"),
    ("1612", "reduced_setpoint"),
    ("8830", "dhw_actual_value_top_temperature"),
    ("8820", "state_dhw_pump"),
];

pub const HOT_WATER_CONFIG: ParamTable = &[
    ("1601", "eco_mode_selection"),
    ("1614", "nominal_setpoint_max"),
    ("1620", "release"),
    ("1630", "dhw_charging_priority"),
    ("1640", "legionella_function"),
    ("1641", "legionella_periodicity"),
    ("1642", "legionella_function_day"),
    ("1644", "legionella_function_time"),
    ("1645", "legionella_setpoint"),
    ("1646", "legionella_dwelling_time"),
    ("1647", "legionella_circulation_pump"),
    ("1648", "legionella_circulation_temp_diff"),
    ("1660", "dhw_circulation_pump_release"),
    ("1661", "dhw_circulation_pump_cycling"),
    ("1663", "dhw_circulation_setpoint"),
    ("1680", "operating_mode_changeover"),
];

pub const HOT_WATER_SCHEDULE: ParamTable = &[
    ("561", "dhw_time_program_monday"),
    ("562", "dhw_time_program_tuesday"),
    ("563", "dhw_time_program_wednesday"),
    ("564", "dhw_time_program_thursday"),
    ("565", "dhw_time_program_friday"),
    ("566", "dhw_time_program_saturday"),
    ("567", "dhw_time_program_sunday"),
    ("576", "dhw_time_program_standard_values"),
];
