//! Type Classifier: raw controller type codes → [`DeviceKind`].
//!
//! Classification is total. Every input yields `Some(TypeInfo)` or `None`
//! ("unclassified"); callers fall back to [`TypeInfo::unknown`].

mod table;

use serde::Serialize;

use crate::model::DeviceKind;

/// Connection-family tags.
pub const INSTEON: &str = "Insteon";
pub const ZWAVE: &str = "ZWave";
pub const NODE_SERVER: &str = "NodeServer";
pub const NODE_SERVER_V5: &str = "ISYv5 Node Server";
pub const ELK: &str = "Elk Network";

/// Record name used for heuristically classified devices.
const GENERIC_NAME: &str = "Generic Device";

/// Resolved classification for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub kind: DeviceKind,
    pub name: String,
    pub connection: String,
    pub battery_operated: bool,
}

impl TypeInfo {
    fn generic(kind: DeviceKind, connection: &str) -> Self {
        Self {
            kind,
            name: GENERIC_NAME.to_owned(),
            connection: connection.to_owned(),
            battery_operated: false,
        }
    }

    /// Fallback record for unclassified nodes.
    pub fn unknown() -> Self {
        Self::generic(DeviceKind::Unknown, INSTEON)
    }
}

/// Raw inputs the classifier considers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDescriptor<'a> {
    /// Dotted type code, e.g. `1.32.65.0`.
    pub type_code: &'a str,
    /// Space-separated address, e.g. `17 54 AD 1`.
    pub address: &'a str,
    /// Vendor family id text; absent means 1.
    pub family: Option<&'a str>,
    /// Device-category override for the sub type.
    pub category: Option<&'a str>,
}

/// Classify a node: static table first, then the family heuristics.
pub fn classify(desc: &TypeDescriptor<'_>) -> Option<TypeInfo> {
    lookup(desc.type_code, desc.address).or_else(|| classify_heuristic(desc))
}

/// Static table lookup. First entry whose code matches and whose address
/// constraint (if any) holds wins.
pub fn lookup(type_code: &str, address: &str) -> Option<TypeInfo> {
    let last = address.split_whitespace().last().unwrap_or_default();
    table::ENTRIES
        .iter()
        .filter(|e| e.type_code == type_code)
        .find(|e| e.address.is_empty() || e.address == last)
        .map(|e| TypeInfo {
            kind: e.kind,
            name: e.name.to_owned(),
            connection: e.connection.to_owned(),
            battery_operated: e.battery_operated,
        })
}

/// Heuristic decomposition by family, main type, sub type and sub address.
pub fn classify_heuristic(desc: &TypeDescriptor<'_>) -> Option<TypeInfo> {
    let family = match desc.family.map(str::trim) {
        None | Some("") => 1,
        Some(text) => text.parse::<u32>().ok()?,
    };

    let mut parts = desc.type_code.split('.');
    let main: u32 = parts.next()?.trim().parse().ok()?;
    let mut sub: u32 = parts.next()?.trim().parse().ok()?;
    if let Some(cat) = desc.category.and_then(|c| c.trim().parse().ok()) {
        sub = cat;
    }

    let sub_address: Option<u32> = desc
        .address
        .split(' ')
        .nth(3)
        .and_then(|s| s.trim().parse().ok());

    match family {
        1 => insteon_family(main, sub, sub_address).map(|k| TypeInfo::generic(k, INSTEON)),
        4 => zwave_family(main, sub).map(|k| TypeInfo::generic(k, ZWAVE)),
        10 => (main == 1 && sub == 1)
            .then(|| TypeInfo::generic(DeviceKind::NodeServerNode, NODE_SERVER)),
        _ => None,
    }
}

fn insteon_family(main: u32, sub: u32, sub_address: Option<u32>) -> Option<DeviceKind> {
    match main {
        1 if sub == 46 && sub_address == Some(2) => Some(DeviceKind::Fan),
        1 => Some(DeviceKind::DimmableLight),
        2 if matches!(sub, 6 | 9 | 12 | 23 | 8 | 33 | 57) => Some(DeviceKind::Outlet),
        2 => Some(DeviceKind::Light),
        7 if sub == 0 => {
            if sub_address == Some(1) {
                Some(DeviceKind::DoorWindowSensor)
            } else {
                Some(DeviceKind::Outlet)
            }
        }
        15 if sub == 6 && sub_address == Some(1) => Some(DeviceKind::Lock),
        // Secondary motion-sensor nodes (dusk, battery) are ignored.
        16 if matches!(sub, 1 | 3) => {
            (sub_address == Some(1)).then_some(DeviceKind::MotionSensor)
        }
        16 if matches!(sub, 2 | 9 | 17) => Some(DeviceKind::DoorWindowSensor),
        5 => Some(DeviceKind::Thermostat),
        6 => Some(DeviceKind::LeakSensor),
        0 if matches!(sub, 6 | 8) => Some(DeviceKind::Remote),
        _ => None,
    }
}

fn zwave_family(main: u32, sub: u32) -> Option<DeviceKind> {
    match (main, sub) {
        (4, 16) => Some(DeviceKind::Light),
        (4, 111) => Some(DeviceKind::SecureLock),
        (4, 109) => Some(DeviceKind::DimmableLight),
        _ => None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn heuristic(family: &str, main: u32, sub: u32, sub_address: u32) -> Option<DeviceKind> {
        let type_code = format!("{main}.{sub}.0.0");
        let address = format!("AA BB CC {sub_address}");
        classify_heuristic(&TypeDescriptor {
            type_code: &type_code,
            address: &address,
            family: Some(family),
            category: None,
        })
        .map(|info| info.kind)
    }

    #[test]
    fn fanlinc_siblings_split_by_sub_address() {
        assert_eq!(heuristic("1", 1, 46, 2), Some(DeviceKind::Fan));
        assert_eq!(heuristic("1", 1, 46, 1), Some(DeviceKind::DimmableLight));
    }

    #[test]
    fn zwave_secure_lock() {
        assert_eq!(heuristic("4", 4, 111, 1), Some(DeviceKind::SecureLock));
        assert_eq!(heuristic("4", 4, 16, 1), Some(DeviceKind::Light));
        assert_eq!(heuristic("4", 4, 109, 1), Some(DeviceKind::DimmableLight));
        assert_eq!(heuristic("4", 4, 1, 1), None);
        assert_eq!(heuristic("4", 3, 111, 1), None);
    }

    #[test]
    fn zwave_connection_tag() {
        let info = classify_heuristic(&TypeDescriptor {
            type_code: "4.16.0.0",
            address: "ZW002_1",
            family: Some("4"),
            category: None,
        })
        .unwrap();
        assert_eq!(info.connection, ZWAVE);
        assert_eq!(info.name, "Generic Device");
    }

    #[test]
    fn insteon_relay_outlets() {
        for sub in [6, 9, 12, 23, 8, 33, 57] {
            assert_eq!(heuristic("1", 2, sub, 1), Some(DeviceKind::Outlet), "sub {sub}");
        }
        assert_eq!(heuristic("1", 2, 42, 1), Some(DeviceKind::Light));
    }

    #[test]
    fn io_linc_and_locks() {
        assert_eq!(heuristic("1", 7, 0, 1), Some(DeviceKind::DoorWindowSensor));
        assert_eq!(heuristic("1", 7, 0, 2), Some(DeviceKind::Outlet));
        assert_eq!(heuristic("1", 7, 3, 1), None);
        assert_eq!(heuristic("1", 15, 6, 1), Some(DeviceKind::Lock));
        assert_eq!(heuristic("1", 15, 6, 2), None);
    }

    #[test]
    fn secondary_motion_nodes_are_unclassified() {
        assert_eq!(heuristic("1", 16, 1, 1), Some(DeviceKind::MotionSensor));
        assert_eq!(heuristic("1", 16, 3, 1), Some(DeviceKind::MotionSensor));
        assert_eq!(heuristic("1", 16, 1, 2), None);
        assert_eq!(heuristic("1", 16, 3, 3), None);
        assert_eq!(heuristic("1", 16, 17, 1), Some(DeviceKind::DoorWindowSensor));
        assert_eq!(heuristic("1", 16, 4, 1), None);
    }

    #[test]
    fn remaining_insteon_branches() {
        assert_eq!(heuristic("1", 5, 0, 1), Some(DeviceKind::Thermostat));
        assert_eq!(heuristic("1", 6, 0, 1), Some(DeviceKind::LeakSensor));
        assert_eq!(heuristic("1", 0, 6, 1), Some(DeviceKind::Remote));
        assert_eq!(heuristic("1", 0, 7, 1), None);
        assert_eq!(heuristic("1", 9, 0, 1), None);
    }

    #[test]
    fn node_server_family() {
        assert_eq!(heuristic("10", 1, 1, 1), Some(DeviceKind::NodeServerNode));
        assert_eq!(heuristic("10", 1, 2, 1), None);
        assert_eq!(heuristic("7", 1, 1, 1), None);
    }

    #[test]
    fn missing_family_defaults_to_insteon() {
        let info = classify_heuristic(&TypeDescriptor {
            type_code: "1.99.0.0",
            address: "11 22 33 1",
            family: None,
            category: None,
        })
        .unwrap();
        assert_eq!(info.kind, DeviceKind::DimmableLight);
        assert_eq!(info.connection, INSTEON);
    }

    #[test]
    fn category_overrides_sub_type() {
        let desc = TypeDescriptor {
            type_code: "4.64.0.0",
            address: "ZW005_1",
            family: Some("4"),
            category: Some("111"),
        };
        assert_eq!(classify(&desc).unwrap().kind, DeviceKind::SecureLock);
    }

    #[test]
    fn malformed_codes_are_unclassified() {
        for code in ["", "abc", "1", "1.x.0.0"] {
            let desc = TypeDescriptor {
                type_code: code,
                address: "11 22 33 1",
                family: None,
                category: None,
            };
            assert!(classify(&desc).is_none(), "code {code:?}");
        }
    }

    #[test]
    fn table_entry_with_address_constraint() {
        assert_eq!(
            lookup("1.46.69.0", "14 A1 6D 2").unwrap().kind,
            DeviceKind::Fan
        );
        assert_eq!(
            lookup("1.46.69.0", "14 A1 6D 1").unwrap().kind,
            DeviceKind::DimmableLight
        );
        // Constrained entries only: no sibling matches button 3
        assert!(lookup("1.46.69.0", "14 A1 6D 3").is_none());
    }

    #[test]
    fn table_takes_precedence_over_heuristics() {
        let info = classify(&TypeDescriptor {
            type_code: "16.1.0.0",
            address: "2A 3B 4C 1",
            family: Some("1"),
            category: None,
        })
        .unwrap();
        assert_eq!(info.name, "Motion Sensor");
        assert!(info.battery_operated);
    }

    #[test]
    fn table_miss_falls_through_to_heuristics() {
        let info = classify(&TypeDescriptor {
            type_code: "7.0.65.0",
            address: "2A 3B 4C 3",
            family: None,
            category: None,
        })
        .unwrap();
        assert_eq!(info.kind, DeviceKind::Outlet);
        assert_eq!(info.name, "Generic Device");
    }
}
