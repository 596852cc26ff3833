// ── Device model ──
//
// One struct for every controller node. The resolved `DeviceKind` decides
// which getters and commands make sense; shared state lives here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::debug;

use super::value::Value;
use crate::defs;

/// Resolved semantic category of a node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DeviceKind {
    Light,
    DimmableLight,
    Lock,
    SecureLock,
    DoorWindowSensor,
    MotionSensor,
    LeakSensor,
    Remote,
    Outlet,
    Fan,
    Thermostat,
    AlarmDoorWindowSensor,
    CoSensor,
    AlarmPanel,
    Scene,
    NodeServerNode,
    Unknown,
}

impl DeviceKind {
    pub fn is_light(self) -> bool {
        matches!(self, Self::Light | Self::DimmableLight)
    }

    pub fn is_lock(self) -> bool {
        matches!(self, Self::Lock | Self::SecureLock)
    }
}

/// Nature of the most recent accepted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum UpdateType {
    /// Primary state changed.
    Generic,
    /// A named property changed.
    Property,
}

/// Extra identity carried by node-server nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeServerInfo {
    /// `family@instance`, e.g. `10@3`.
    pub slot: String,
    pub parent: Option<String>,
    pub node_def_id: Option<String>,
}

/// A controller node with its live state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub address: String,
    pub name: String,
    pub type_code: String,
    pub kind: DeviceKind,
    pub connection: String,
    pub battery_operated: bool,
    pub friendly_name: String,
    pub current_state: f64,
    #[serde(rename = "currentState_f")]
    pub current_state_formatted: Value,
    /// Named properties with their `<name>_f` formatted shadows.
    pub properties: BTreeMap<String, Value>,
    pub last_changed: DateTime<Utc>,
    pub update_type: Option<UpdateType>,
    pub updated_property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_server: Option<NodeServerInfo>,
}

impl Device {
    pub fn new(
        address: impl Into<String>,
        name: impl Into<String>,
        type_code: impl Into<String>,
        kind: DeviceKind,
    ) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            type_code: type_code.into(),
            kind,
            connection: crate::classify::INSTEON.to_owned(),
            battery_operated: false,
            friendly_name: "Generic Device".to_owned(),
            current_state: 0.0,
            current_state_formatted: Value::Numeric(0.0),
            properties: BTreeMap::new(),
            last_changed: Utc::now(),
            update_type: None,
            updated_property: None,
            node_server: None,
        }
    }

    // ── Update protocol ──────────────────────────────────────────────

    /// Apply a primary-state reading. Returns `true` only when the
    /// numeric value differs from the stored one.
    pub fn apply_state(&mut self, raw: &str, formatted: Option<&str>) -> bool {
        let Some(value) = Value::parse_numeric(raw) else {
            debug!(address = %self.address, raw, "ignoring non-numeric state");
            return false;
        };
        if value == self.current_state {
            return false;
        }
        self.current_state = value;
        self.current_state_formatted = Value::formatted(value, formatted);
        self.last_changed = Utc::now();
        true
    }

    /// Apply a named-property reading. Non-numeric raw values are kept as
    /// display text.
    pub fn apply_property(&mut self, name: &str, raw: &str, formatted: Option<&str>) -> bool {
        let value = Value::coerce(raw);
        if self.properties.get(name) == Some(&value) {
            return false;
        }
        let shadow = match (&value, formatted) {
            (_, Some(f)) => Value::coerce(f),
            (Value::Numeric(v), None) => Value::Numeric(*v),
            (Value::Display(s), None) => Value::Display(s.clone()),
        };
        self.properties.insert(name.to_owned(), value);
        self.properties.insert(format!("{name}_f"), shadow);
        self.last_changed = Utc::now();
        self.updated_property = Some(name.to_owned());
        true
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn formatted_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(&format!("{name}_f"))
    }

    fn numeric_property(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(Value::as_f64)
    }

    // ── Capability getters ───────────────────────────────────────────

    /// On when the native level is above zero.
    pub fn light_on(&self) -> bool {
        self.current_state > 0.0
    }

    /// Brightness 0–100 from the native 0–255 scale.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn dim_level(&self) -> u8 {
        let level = (self.current_state * 100.0 / defs::LEVEL_MAX).floor();
        level.clamp(0.0, 100.0) as u8
    }

    /// Locked state. Non-secure locks report anything but zero as locked.
    pub fn locked(&self) -> bool {
        match self.kind {
            DeviceKind::SecureLock => self.current_state > 0.0,
            _ => self.current_state != 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current_state != 0.0
    }

    pub fn motion_detected(&self) -> bool {
        self.current_state == defs::MOTION_DETECTED
    }

    pub fn outlet_on(&self) -> bool {
        self.current_state > 0.0
    }

    /// Fan speed, or `None` for a level outside the four presets.
    pub fn fan_speed(&self) -> Option<FanSpeed> {
        FanSpeed::from_level(self.current_state)
    }

    pub fn thermostat_status(&self) -> ThermostatStatus {
        let halved = |v: f64| (v / 2.0).round();
        ThermostatStatus {
            current_temperature: halved(self.current_state),
            current_status: self
                .formatted_property(defs::CLIMATE_OPERATING_MODE)
                .cloned(),
            humidity: self.numeric_property(defs::CLIMATE_HUMIDITY),
            cool_set_point: self.numeric_property(defs::CLIMATE_COOL_SETPOINT).map(halved),
            heat_set_point: self.numeric_property(defs::CLIMATE_HEAT_SETPOINT).map(halved),
            fan_setting: self.formatted_property(defs::CLIMATE_FAN).cloned(),
            mode: self.formatted_property(defs::CLIMATE_MODE).cloned(),
        }
    }

    /// One-line state summary for listings.
    pub fn state_summary(&self) -> String {
        match self.kind {
            DeviceKind::Light | DeviceKind::Outlet => label(self.light_on(), "On", "Off"),
            DeviceKind::DimmableLight => {
                if self.light_on() {
                    format!("On {}%", self.dim_level())
                } else {
                    "Off".to_owned()
                }
            }
            DeviceKind::Lock | DeviceKind::SecureLock => {
                label(self.locked(), "Locked", "Unlocked")
            }
            DeviceKind::DoorWindowSensor => label(self.is_open(), "Open", "Closed"),
            DeviceKind::MotionSensor => label(self.motion_detected(), "Motion", "Idle"),
            DeviceKind::Fan => self
                .fan_speed()
                .map_or_else(|| self.current_state_formatted.to_string(), |s| s.to_string()),
            DeviceKind::Thermostat => {
                let status = self.thermostat_status();
                format!("{}°", status.current_temperature)
            }
            _ => self.current_state_formatted.to_string(),
        }
    }
}

fn label(flag: bool, yes: &str, no: &str) -> String {
    let text = if flag { yes } else { no };
    text.to_owned()
}

// ── Fan ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FanSpeed {
    Off,
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub fn from_level(level: f64) -> Option<Self> {
        if level == 0.0 {
            Some(Self::Off)
        } else if level == defs::FAN_LOW {
            Some(Self::Low)
        } else if level == defs::FAN_MEDIUM {
            Some(Self::Medium)
        } else if level == defs::FAN_HIGH {
            Some(Self::High)
        } else {
            None
        }
    }

    /// Native level sent with `DON`; `None` for off.
    pub fn level(self) -> Option<u8> {
        match self {
            Self::Off => None,
            Self::Low => Some(63),
            Self::Medium => Some(191),
            Self::High => Some(255),
        }
    }
}

// ── Thermostat ───────────────────────────────────────────────────────

/// Display-ready thermostat readings.
///
/// Temperatures arrive doubled (half-degree precision), so current
/// temperature and set points are halved and rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatStatus {
    pub current_temperature: f64,
    pub current_status: Option<Value>,
    pub humidity: Option<f64>,
    pub cool_set_point: Option<f64>,
    pub heat_set_point: Option<f64>,
    pub fan_setting: Option<Value>,
    pub mode: Option<Value>,
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn light() -> Device {
        Device::new("17 54 AD 1", "Hall", "1.32.65.0", DeviceKind::DimmableLight)
    }

    #[test]
    fn equal_state_is_unchanged_and_keeps_timestamp() {
        let mut d = light();
        assert!(d.apply_state("128", None));
        let stamp = d.last_changed;
        assert!(!d.apply_state("128", Some("50%")));
        assert_eq!(d.last_changed, stamp);
        assert_eq!(d.current_state_formatted, Value::Numeric(128.0));
    }

    #[test]
    fn changed_state_updates_value_formatted_and_timestamp() {
        let mut d = light();
        let before = d.last_changed;
        assert!(d.apply_state("255", Some("On")));
        assert_eq!(d.current_state, 255.0);
        assert_eq!(d.current_state_formatted, Value::Display("On".into()));
        assert!(d.last_changed >= before);

        assert!(d.apply_state("64", None));
        assert_eq!(d.current_state_formatted, Value::Numeric(64.0));

        assert!(d.apply_state("102", Some("40")));
        assert_eq!(d.current_state_formatted, Value::Numeric(40.0));
    }

    #[test]
    fn non_numeric_state_is_rejected() {
        let mut d = light();
        assert!(!d.apply_state("garbage", Some("On")));
        assert_eq!(d.current_state, 0.0);
    }

    #[test]
    fn property_update_records_shadow_and_name() {
        let mut d = light();
        assert!(d.apply_property("CLIHUM", "45", None));
        assert_eq!(d.property("CLIHUM"), Some(&Value::Numeric(45.0)));
        assert_eq!(d.formatted_property("CLIHUM"), Some(&Value::Numeric(45.0)));
        assert_eq!(d.updated_property.as_deref(), Some("CLIHUM"));

        assert!(!d.apply_property("CLIHUM", "45", Some("45%")));
        assert!(d.apply_property("CLIMD", "1", Some("Heat")));
        assert_eq!(d.formatted_property("CLIMD"), Some(&Value::Display("Heat".into())));
    }

    #[test]
    fn display_properties_compare_by_text() {
        let mut d = light();
        assert!(d.apply_property("Outside", "72°F", None));
        assert!(!d.apply_property("Outside", "72°F", None));
        assert!(d.apply_property("Outside", "73°F", None));
    }

    #[test]
    fn dim_level_floors() {
        let mut d = light();
        d.apply_state("102", None);
        assert_eq!(d.dim_level(), 40);
        d.apply_state("255", None);
        assert_eq!(d.dim_level(), 100);
        d.apply_state("1", None);
        assert_eq!(d.dim_level(), 0);
        assert!(d.light_on());
    }

    #[test]
    fn lock_semantics_by_kind() {
        let mut lock = Device::new("A", "Door", "15.6.0.0", DeviceKind::Lock);
        lock.apply_state("100", None);
        assert!(lock.locked());

        let mut secure = Device::new("ZW1", "Front", "4.64.0.0", DeviceKind::SecureLock);
        secure.apply_state("-1", None);
        assert!(!secure.locked());
        secure.apply_state("1", None);
        assert!(secure.locked());
    }

    #[test]
    fn motion_requires_full_level() {
        let mut d = Device::new("M", "Motion", "16.1.0.0", DeviceKind::MotionSensor);
        d.apply_state("254", None);
        assert!(!d.motion_detected());
        d.apply_state("255", None);
        assert!(d.motion_detected());
    }

    #[test]
    fn fan_speed_presets_and_unknown_levels() {
        let mut d = Device::new("F", "Fan", "1.46.69.0", DeviceKind::Fan);
        assert_eq!(d.fan_speed(), Some(FanSpeed::Off));
        d.apply_state("191", None);
        assert_eq!(d.fan_speed(), Some(FanSpeed::Medium));
        d.apply_state("100", None);
        assert_eq!(d.fan_speed(), None);
        assert_eq!(FanSpeed::High.level(), Some(255));
        assert_eq!("low".parse::<FanSpeed>().unwrap(), FanSpeed::Low);
    }

    #[test]
    fn thermostat_halves_doubled_readings() {
        let mut d = Device::new("T", "Stat", "5.11.16.0", DeviceKind::Thermostat);
        d.apply_state("143", None);
        d.apply_property("CLISPC", "154", None);
        d.apply_property("CLISPH", "136", None);
        d.apply_property("CLIHUM", "41", None);
        d.apply_property("CLIHCS", "1", Some("Heating"));
        d.apply_property("CLIFS", "7", Some("Auto"));

        let status = d.thermostat_status();
        assert_eq!(status.current_temperature, 72.0);
        assert_eq!(status.cool_set_point, Some(77.0));
        assert_eq!(status.heat_set_point, Some(68.0));
        assert_eq!(status.humidity, Some(41.0));
        assert_eq!(status.current_status, Some(Value::Display("Heating".into())));
        assert_eq!(status.fan_setting, Some(Value::Display("Auto".into())));
        assert_eq!(status.mode, None);
    }

    #[test]
    fn kind_names_are_camel_case() {
        assert_eq!(DeviceKind::SecureLock.to_string(), "secureLock");
        assert_eq!("dimmableLight".parse::<DeviceKind>().unwrap(), DeviceKind::DimmableLight);
    }
}
