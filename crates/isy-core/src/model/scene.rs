// ── Scene model ──
//
// A scene stores only member addresses. Its light state is derived from
// the member devices on demand and never cached.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::{Device, DeviceKind};

pub const SCENE_CONNECTION: &str = "Insteon Wired";
pub const SCENE_FRIENDLY_NAME: &str = "Insteon Scene";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub address: String,
    pub name: String,
    /// Member device addresses in controller order.
    pub members: Vec<String>,
    pub last_changed: DateTime<Utc>,
}

impl Scene {
    pub fn new(address: impl Into<String>, name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            members,
            last_changed: Utc::now(),
        }
    }

    pub fn includes(&self, address: &str) -> bool {
        self.members.iter().any(|m| m == address)
    }

    /// Mark the scene changed. Always reports a change.
    pub fn recalculate(&mut self) -> bool {
        self.last_changed = Utc::now();
        true
    }

    /// Build a display snapshot from the resolved member devices.
    pub fn view<'a>(&self, members: impl IntoIterator<Item = &'a Device>) -> SceneView {
        let state = SceneState::from_members(members);
        SceneView {
            address: self.address.clone(),
            name: self.name.clone(),
            kind: DeviceKind::Scene,
            connection: SCENE_CONNECTION.to_owned(),
            friendly_name: SCENE_FRIENDLY_NAME.to_owned(),
            members: self.members.clone(),
            light_on: state.light_on,
            dim_level: state.dim_level,
            last_changed: self.last_changed,
        }
    }
}

/// Aggregate light state over a scene's members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneState {
    /// Any light member is on.
    pub light_on: bool,
    /// Mean dim level over light members; 0 with no lights.
    pub dim_level: f64,
    pub light_count: usize,
}

impl SceneState {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn from_members<'a>(members: impl IntoIterator<Item = &'a Device>) -> Self {
        let mut light_on = false;
        let mut total = 0.0;
        let mut light_count = 0usize;
        for device in members.into_iter().filter(|d| d.kind.is_light()) {
            light_on |= device.light_on();
            total += f64::from(device.dim_level());
            light_count += 1;
        }
        let dim_level = if light_count == 0 {
            0.0
        } else {
            total / light_count as f64
        };
        Self {
            light_on,
            dim_level,
            light_count,
        }
    }
}

/// True when every light member's on/off state equals `state`.
/// Vacuously true for scenes without lights.
pub fn all_lights<'a>(members: impl IntoIterator<Item = &'a Device>, state: bool) -> bool {
    members
        .into_iter()
        .filter(|d| d.kind.is_light())
        .all(|d| d.light_on() == state)
}

/// Serializable scene snapshot with derived state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    pub address: String,
    pub name: String,
    pub kind: DeviceKind,
    pub connection: String,
    pub friendly_name: String,
    pub members: Vec<String>,
    pub light_on: bool,
    pub dim_level: f64,
    pub last_changed: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(address: &str, level: &str) -> Device {
        let mut d = Device::new(address, address, "1.32.65.0", DeviceKind::DimmableLight);
        d.apply_state(level, None);
        d
    }

    #[test]
    fn aggregate_over_light_members() {
        // 102/255 → 40%
        let members = [light("A", "102"), light("B", "0")];
        let state = SceneState::from_members(&members);
        assert!(state.light_on);
        assert_eq!(state.dim_level, 20.0);
        assert_eq!(state.light_count, 2);
        assert!(!all_lights(&members, true));
        assert!(!all_lights(&members, false));
    }

    #[test]
    fn non_light_members_are_ignored() {
        let mut lock = Device::new("L", "Lock", "15.6.0.0", DeviceKind::Lock);
        lock.apply_state("100", None);
        let members = [lock];
        let state = SceneState::from_members(&members);
        assert!(!state.light_on);
        assert_eq!(state.dim_level, 0.0);
        assert!(all_lights(&members, true));
    }

    #[test]
    fn recalculate_always_reports_change() {
        let mut scene = Scene::new("1234", "Evening", vec!["A".into()]);
        let first = scene.last_changed;
        assert!(scene.recalculate());
        let second = scene.last_changed;
        assert!(scene.recalculate());
        assert!(second >= first);
        assert!(scene.last_changed >= second);
    }

    #[test]
    fn membership_by_address() {
        let scene = Scene::new("1234", "Evening", vec!["A".into(), "B".into()]);
        assert!(scene.includes("B"));
        assert!(!scene.includes("C"));
    }
}
