//! Controller protocol constants: control codes, commands, units.

// ── Control codes ────────────────────────────────────────────────────

pub const STATUS: &str = "ST";

pub const CLIMATE_TEMPERATURE: &str = "CLITEMP";
pub const CLIMATE_COOL_SETPOINT: &str = "CLISPC";
pub const CLIMATE_HEAT_SETPOINT: &str = "CLISPH";
pub const CLIMATE_HUMIDITY: &str = "CLIHUM";
pub const CLIMATE_OPERATING_MODE: &str = "CLIHCS";
pub const CLIMATE_MODE: &str = "CLIMD";
pub const CLIMATE_FAN: &str = "CLIFS";

pub const BATTERY_LEVEL: &str = "BATLVL";
pub const POWER_FACTOR: &str = "PF";
pub const POLARIZED_POWER: &str = "PPW";
pub const CURRENT_CURRENT: &str = "CC";
pub const TOTAL_POWER: &str = "TPW";
pub const CURRENT_VOLTAGE: &str = "CV";

/// Composite security-system event.
pub const SECURITY_EVENT: &str = "_19";
/// Composite system event; carries variable changes.
pub const SYSTEM_EVENT: &str = "_1";

/// Prefix shared by the generic-value controls (`GV0`, `GV1`, …).
pub const GENERIC_VALUE_PREFIX: &str = "GV";

/// `_19` action discriminators.
pub const SECURITY_AREA_EVENT: &str = "2";
pub const SECURITY_ZONE_EVENT: &str = "3";

/// `_1` action discriminator for a variable value change.
pub const VARIABLE_VALUE_CHANGED: &str = "6";

// ── Units ────────────────────────────────────────────────────────────

/// Degrees Fahrenheit.
pub const UOM_FAHRENHEIT: u32 = 17;

// ── Node commands ────────────────────────────────────────────────────

pub const CMD_ON: &str = "DON";
pub const CMD_OFF: &str = "DOF";
pub const CMD_SECURE: &str = "SECMD";

// ── Native levels ────────────────────────────────────────────────────

pub const LEVEL_MAX: f64 = 255.0;
pub const FAN_LOW: f64 = 63.0;
pub const FAN_MEDIUM: f64 = 191.0;
pub const FAN_HIGH: f64 = 255.0;

/// Motion sensors report 255 while motion is detected.
pub const MOTION_DETECTED: f64 = 255.0;

// ── Security-system update types ─────────────────────────────────────

pub const AREA_TRIP_STATE: u32 = 1;
pub const AREA_ALARM_STATE: u32 = 2;
pub const AREA_ARM_MODE: u32 = 3;

pub const ZONE_LOGICAL_STATUS: u32 = 51;
pub const ZONE_PHYSICAL_STATUS: u32 = 52;
pub const ZONE_VOLTAGE: u32 = 53;

/// Zone alarm definition that marks a CO detector.
pub const ZONE_ALARM_DEF_CO: u32 = 17;

/// Nominal voltage band of an unconnected zone input.
pub const ZONE_VOLTAGE_NOMINAL_LOW: f64 = 65.0;
pub const ZONE_VOLTAGE_NOMINAL_HIGH: f64 = 80.0;
