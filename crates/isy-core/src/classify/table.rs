// Static type-code table.
//
// Codes here take precedence over the family heuristics. An entry with a
// non-empty `address` only matches when the node's last address element
// equals it, which separates sibling nodes of one physical device.

use crate::model::DeviceKind;

pub(super) struct TableEntry {
    pub type_code: &'static str,
    pub address: &'static str,
    pub name: &'static str,
    pub kind: DeviceKind,
    pub connection: &'static str,
    pub battery_operated: bool,
}

const fn insteon(
    type_code: &'static str,
    address: &'static str,
    name: &'static str,
    kind: DeviceKind,
) -> TableEntry {
    TableEntry {
        type_code,
        address,
        name,
        kind,
        connection: "Insteon",
        battery_operated: false,
    }
}

const fn battery(mut entry: TableEntry) -> TableEntry {
    entry.battery_operated = true;
    entry
}

pub(super) const ENTRIES: &[TableEntry] = &[
    // Dimmers
    insteon("1.14.65.0", "", "LampLinc Dimmer 2-Pin", DeviceKind::DimmableLight),
    insteon("1.25.56.0", "", "SwitchLinc Dimmer W/Beeper", DeviceKind::DimmableLight),
    insteon("1.32.65.0", "", "SwitchLinc Dimmer (Dual-Band)", DeviceKind::DimmableLight),
    insteon("1.32.69.0", "", "SwitchLinc Dimmer (Dual-Band)", DeviceKind::DimmableLight),
    insteon("1.65.65.0", "", "KeypadLinc Dimmer 8-Button", DeviceKind::DimmableLight),
    insteon("1.66.68.0", "", "KeypadLinc Dimmer 6-Button", DeviceKind::DimmableLight),
    // FanLinc: light on button 1, fan motor on button 2
    insteon("1.46.69.0", "1", "FanLinc Light", DeviceKind::DimmableLight),
    insteon("1.46.69.0", "2", "FanLinc Motor", DeviceKind::Fan),
    // Relays
    insteon("2.42.67.0", "", "SwitchLinc Relay (Dual-Band)", DeviceKind::Light),
    insteon("2.42.68.0", "", "SwitchLinc Relay (Dual-Band)", DeviceKind::Light),
    insteon("2.9.65.0", "", "ApplianceLinc", DeviceKind::Outlet),
    insteon("2.57.65.0", "", "On/Off Outlet", DeviceKind::Outlet),
    insteon("2.56.67.0", "", "Outdoor ApplianceLinc", DeviceKind::Outlet),
    // I/O Linc: sensor on button 1, relay on button 2
    insteon("7.0.65.0", "1", "I/O Linc Sensor", DeviceKind::DoorWindowSensor),
    insteon("7.0.65.0", "2", "I/O Linc Relay", DeviceKind::Outlet),
    // Locks
    insteon("15.6.0.0", "1", "MorningLinc", DeviceKind::Lock),
    // Sensors
    battery(insteon("16.1.0.0", "1", "Motion Sensor", DeviceKind::MotionSensor)),
    battery(insteon("16.1.65.0", "1", "Motion Sensor", DeviceKind::MotionSensor)),
    battery(insteon("16.2.64.0", "", "TriggerLinc", DeviceKind::DoorWindowSensor)),
    battery(insteon("16.9.0.0", "", "Open/Close Sensor", DeviceKind::DoorWindowSensor)),
    battery(insteon("16.8.70.0", "", "Leak Sensor", DeviceKind::LeakSensor)),
    // Remotes
    battery(insteon("0.18.0.0", "", "Mini Remote - 8 Scene", DeviceKind::Remote)),
    battery(insteon("0.16.65.0", "", "Mini Remote - 4 Scene", DeviceKind::Remote)),
    // Climate
    insteon("5.11.16.0", "", "Thermostat", DeviceKind::Thermostat),
    insteon("5.10.16.0", "", "Thermostat", DeviceKind::Thermostat),
];
