// ── Security-system model ──
//
// One panel per security area plus one sensor per zone. Both apply
// `ae`/`ze` update records with compare-then-mutate semantics and ignore
// records addressed to another area or zone.

use chrono::{DateTime, Utc};
use isy_api::xml::{AreaEvent, ZoneEvent};
use serde::Serialize;
use strum::{Display, EnumString, FromRepr};
use tracing::debug;

use super::device::DeviceKind;
use crate::defs;

// ── Enumerations ─────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, FromRepr,
)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum AlarmMode {
    #[default]
    Disarmed = 0,
    Away = 1,
    Stay = 2,
    StayInstant = 3,
    Night = 4,
    NightInstant = 5,
    Vacation = 6,
}

impl AlarmMode {
    /// Arm type sent with `arm?armType=`.
    #[allow(clippy::as_conversions)]
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
pub enum AlarmTripState {
    #[default]
    Disarmed = 0,
    ExitDelay = 1,
    Tripped = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
pub enum AlarmState {
    #[default]
    NotReadyToArm = 0,
    ReadyToArm = 1,
    ReadyToArmViolation = 2,
    ArmedWithTimer = 3,
    ArmedFully = 4,
    ForceArmedViolation = 5,
    ArmedWithBypass = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
pub enum PhysicalState {
    #[default]
    NotConfigured = 0,
    Open = 1,
    EndOfLine = 2,
    Short = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
pub enum LogicalState {
    #[default]
    Normal = 0,
    Trouble = 1,
    Violated = 2,
    Bypassed = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "camelCase")]
pub enum ZoneSensorKind {
    DoorWindow,
    CarbonMonoxide,
}

fn parse_code(val: &str) -> Option<u8> {
    val.trim().parse().ok()
}

// ── Panel ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmPanel {
    pub area: u32,
    pub address: String,
    pub name: String,
    pub friendly_name: String,
    pub connection: String,
    pub kind: DeviceKind,
    pub alarm_mode: AlarmMode,
    pub alarm_state: AlarmState,
    pub alarm_trip_state: AlarmTripState,
    pub last_changed: DateTime<Utc>,
}

impl AlarmPanel {
    pub fn new(area: u32) -> Self {
        Self {
            area,
            address: format!("ElkPanel{area}"),
            name: format!("Elk Alarm Panel {area}"),
            friendly_name: "Elk Main Alarm Panel".to_owned(),
            connection: "Elk Network Module".to_owned(),
            kind: DeviceKind::AlarmPanel,
            alarm_mode: AlarmMode::default(),
            alarm_state: AlarmState::default(),
            alarm_trip_state: AlarmTripState::default(),
            last_changed: Utc::now(),
        }
    }

    /// Apply an `ae` record. Returns `true` only when a field changed.
    pub fn apply_area_update(&mut self, update: &AreaEvent) -> bool {
        if update.area != self.area {
            return false;
        }
        let Some(code) = parse_code(&update.val) else {
            debug!(area = self.area, val = %update.val, "ignoring non-numeric area update");
            return false;
        };
        let changed = match update.kind {
            defs::AREA_TRIP_STATE => {
                replace_if_changed(&mut self.alarm_trip_state, AlarmTripState::from_repr(code))
            }
            defs::AREA_ALARM_STATE => {
                replace_if_changed(&mut self.alarm_state, AlarmState::from_repr(code))
            }
            defs::AREA_ARM_MODE => {
                replace_if_changed(&mut self.alarm_mode, AlarmMode::from_repr(code))
            }
            _ => false,
        };
        if changed {
            self.last_changed = Utc::now();
        }
        changed
    }

    #[allow(clippy::as_conversions)]
    pub fn status_text(&self) -> String {
        format!(
            "AM [{}] AS [{}] ATS [{}]",
            self.alarm_mode as u8, self.alarm_state as u8, self.alarm_trip_state as u8
        )
    }
}

/// Store `new` when it is a known value different from `slot`.
fn replace_if_changed<T: PartialEq>(slot: &mut T, new: Option<T>) -> bool {
    match new {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}

// ── Zone ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmZone {
    pub zone: u32,
    pub area: u32,
    pub address: String,
    pub name: String,
    pub friendly_name: String,
    pub connection: String,
    pub kind: DeviceKind,
    pub sensor: ZoneSensorKind,
    pub physical_state: PhysicalState,
    pub logical_state: LogicalState,
    pub voltage: Option<f64>,
    pub last_changed: DateTime<Utc>,
}

impl AlarmZone {
    pub fn new(zone: u32, area: u32, name: impl Into<String>, alarm_def: Option<u32>) -> Self {
        let sensor = if alarm_def == Some(defs::ZONE_ALARM_DEF_CO) {
            ZoneSensorKind::CarbonMonoxide
        } else {
            ZoneSensorKind::DoorWindow
        };
        Self {
            zone,
            area,
            address: format!("ElkZone{zone}"),
            name: name.into(),
            friendly_name: "Elk Connected Sensor".to_owned(),
            connection: crate::classify::ELK.to_owned(),
            kind: match sensor {
                ZoneSensorKind::CarbonMonoxide => DeviceKind::CoSensor,
                ZoneSensorKind::DoorWindow => DeviceKind::AlarmDoorWindowSensor,
            },
            sensor,
            physical_state: PhysicalState::default(),
            logical_state: LogicalState::default(),
            voltage: None,
            last_changed: Utc::now(),
        }
    }

    /// Apply a `ze` record. Logical-state transitions are stored but never
    /// reported as a change; a physical-state record always follows them.
    pub fn apply_zone_update(&mut self, update: &ZoneEvent) -> bool {
        if update.zone != self.zone {
            return false;
        }
        let changed = match update.kind {
            defs::ZONE_LOGICAL_STATUS => {
                let state = parse_code(&update.val).and_then(LogicalState::from_repr);
                replace_if_changed(&mut self.logical_state, state);
                false
            }
            defs::ZONE_PHYSICAL_STATUS => {
                let state = parse_code(&update.val).and_then(PhysicalState::from_repr);
                replace_if_changed(&mut self.physical_state, state)
            }
            defs::ZONE_VOLTAGE => match update.val.trim().parse::<f64>() {
                Ok(v) if self.voltage != Some(v) => {
                    self.voltage = Some(v);
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if changed {
            self.last_changed = Utc::now();
        }
        changed
    }

    /// A zone is wired up once its voltage leaves the nominal idle band.
    pub fn is_present(&self) -> bool {
        self.voltage.is_some_and(|v| {
            v != 0.0 && (v < defs::ZONE_VOLTAGE_NOMINAL_LOW || v > defs::ZONE_VOLTAGE_NOMINAL_HIGH)
        })
    }

    pub fn is_bypassed(&self) -> bool {
        self.logical_state == LogicalState::Bypassed
    }

    pub fn is_open(&self) -> bool {
        self.physical_state == PhysicalState::Open || self.logical_state == LogicalState::Violated
    }

    #[allow(clippy::as_conversions)]
    pub fn status_text(&self) -> String {
        format!(
            "PS [{}] LS [{}]",
            self.physical_state as u8, self.logical_state as u8
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ae(kind: u32, area: u32, val: &str) -> AreaEvent {
        AreaEvent {
            kind,
            area,
            val: val.into(),
        }
    }

    fn ze(kind: u32, zone: u32, val: &str) -> ZoneEvent {
        ZoneEvent {
            kind,
            zone,
            val: val.into(),
        }
    }

    #[test]
    fn panel_applies_matching_area_only() {
        let mut panel = AlarmPanel::new(1);
        assert!(!panel.apply_area_update(&ae(3, 2, "1")));
        assert_eq!(panel.alarm_mode, AlarmMode::Disarmed);

        assert!(panel.apply_area_update(&ae(3, 1, "1")));
        assert_eq!(panel.alarm_mode, AlarmMode::Away);
        assert!(!panel.apply_area_update(&ae(3, 1, "1")));

        assert!(panel.apply_area_update(&ae(1, 1, "2")));
        assert_eq!(panel.alarm_trip_state, AlarmTripState::Tripped);
        assert!(panel.apply_area_update(&ae(2, 1, "4")));
        assert_eq!(panel.alarm_state, AlarmState::ArmedFully);
        assert_eq!(panel.status_text(), "AM [1] AS [4] ATS [2]");
    }

    #[test]
    fn panel_ignores_unknown_values_and_types() {
        let mut panel = AlarmPanel::new(1);
        assert!(!panel.apply_area_update(&ae(3, 1, "9")));
        assert!(!panel.apply_area_update(&ae(7, 1, "1")));
        assert!(!panel.apply_area_update(&ae(3, 1, "x")));
        assert_eq!(panel.alarm_mode, AlarmMode::Disarmed);
    }

    #[test]
    fn logical_state_is_silent() {
        let mut zone = AlarmZone::new(5, 1, "Front Door", None);
        let stamp = zone.last_changed;
        assert!(!zone.apply_zone_update(&ze(51, 5, "2")));
        assert_eq!(zone.logical_state, LogicalState::Violated);
        assert_eq!(zone.last_changed, stamp);
        assert!(zone.is_open());

        assert!(zone.apply_zone_update(&ze(52, 5, "1")));
        assert_eq!(zone.physical_state, PhysicalState::Open);
        assert!(!zone.apply_zone_update(&ze(52, 5, "1")));
    }

    #[test]
    fn zone_ignores_other_zones() {
        let mut zone = AlarmZone::new(5, 1, "Front Door", None);
        assert!(!zone.apply_zone_update(&ze(52, 6, "1")));
        assert_eq!(zone.physical_state, PhysicalState::NotConfigured);
    }

    #[test]
    fn presence_follows_voltage_band() {
        let mut zone = AlarmZone::new(2, 1, "Hall Motion", None);
        assert!(!zone.is_present());
        assert!(zone.apply_zone_update(&ze(53, 2, "72")));
        assert!(!zone.is_present());
        assert!(zone.apply_zone_update(&ze(53, 2, "34")));
        assert!(zone.is_present());
        assert!(zone.apply_zone_update(&ze(53, 2, "0")));
        assert!(!zone.is_present());
    }

    #[test]
    fn bypass_and_status_text() {
        let mut zone = AlarmZone::new(3, 1, "Garage", Some(17));
        assert_eq!(zone.kind, DeviceKind::CoSensor);
        zone.apply_zone_update(&ze(51, 3, "3"));
        zone.apply_zone_update(&ze(52, 3, "2"));
        assert!(zone.is_bypassed());
        assert_eq!(zone.status_text(), "PS [2] LS [3]");
    }
}
