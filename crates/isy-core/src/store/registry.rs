// ── Registry ──
//
// Owns every entity for one controller connection. Devices and listed
// scenes/zones/panel share one address namespace (the device list);
// scenes, zones and variables also keep their own collections for
// direct lookup. Rebuilt wholesale on reload.

use indexmap::IndexMap;
use isy_api::VariableKind;

use super::collection::Collection;
use crate::model::{
    AlarmPanel, AlarmZone, Device, Node, Scene, SceneView, Variable, variable_key,
};

/// What a device-list address resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listed {
    Device,
    Scene,
    Zone(u32),
    Panel,
}

#[derive(Debug, Default)]
pub struct Registry {
    devices: Collection<Device>,
    scenes: Collection<Scene>,
    zones: Collection<AlarmZone>,
    variables: Collection<Variable>,
    panel: Option<AlarmPanel>,
    /// Device-list namespace. A repeated address overwrites the earlier
    /// entry but keeps its position.
    listing: IndexMap<String, Listed>,
    loaded: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Readiness ────────────────────────────────────────────────────

    /// Initial load finished; change notifications may flow.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    // ── Population ───────────────────────────────────────────────────

    pub fn add_device(&mut self, device: Device) -> bool {
        let address = device.address.clone();
        self.listing.insert(address.clone(), Listed::Device);
        self.devices.upsert(address, device)
    }

    /// Add a scene; `listed` also places it in the device list.
    pub fn add_scene(&mut self, scene: Scene, listed: bool) -> bool {
        let address = scene.address.clone();
        if listed {
            self.listing.insert(address.clone(), Listed::Scene);
        }
        self.scenes.upsert(address, scene)
    }

    pub fn add_zone(&mut self, zone: AlarmZone) -> bool {
        self.zones.upsert(zone.zone.to_string(), zone)
    }

    /// Place a known zone in the device list. Returns `true` if it was
    /// newly listed.
    pub fn list_zone(&mut self, zone: u32) -> bool {
        let Some(z) = self.zones.get(&zone.to_string()) else {
            return false;
        };
        let address = z.address.clone();
        if self.listing.contains_key(&address) {
            return false;
        }
        self.listing.insert(address, Listed::Zone(zone));
        true
    }

    pub fn set_panel(&mut self, panel: AlarmPanel) {
        self.panel = Some(panel);
    }

    /// Place the alarm panel in the device list.
    pub fn list_panel(&mut self) {
        if let Some(panel) = &self.panel {
            self.listing.insert(panel.address.clone(), Listed::Panel);
        }
    }

    /// Add a variable. Duplicates are ignored; the first definition wins.
    pub fn add_variable(&mut self, variable: Variable) -> bool {
        self.variables.insert_new(variable.key(), variable)
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn device(&self, address: &str) -> Option<&Device> {
        self.devices.get(address)
    }

    pub fn device_mut(&mut self, address: &str) -> Option<&mut Device> {
        self.devices.get_mut(address)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn scene(&self, address: &str) -> Option<&Scene> {
        self.scenes.get(address)
    }

    pub fn scene_mut(&mut self, address: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(address)
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    pub fn zone(&self, zone: u32) -> Option<&AlarmZone> {
        self.zones.get(&zone.to_string())
    }

    pub fn zone_mut(&mut self, zone: u32) -> Option<&mut AlarmZone> {
        self.zones.get_mut(&zone.to_string())
    }

    pub fn zones(&self) -> impl Iterator<Item = &AlarmZone> {
        self.zones.values()
    }

    pub fn panel(&self) -> Option<&AlarmPanel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut AlarmPanel> {
        self.panel.as_mut()
    }

    pub fn variable(&self, kind: VariableKind, id: &str) -> Option<&Variable> {
        self.variables.get(&variable_key(kind, id))
    }

    pub fn variable_mut(&mut self, kind: VariableKind, id: &str) -> Option<&mut Variable> {
        self.variables.get_mut(&variable_key(kind, id))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// Resolve a scene's members against the device collection, skipping
    /// addresses with no device.
    pub fn scene_members<'a>(&'a self, scene: &'a Scene) -> impl Iterator<Item = &'a Device> {
        scene.members.iter().filter_map(|m| self.devices.get(m))
    }

    pub fn scene_view(&self, scene: &Scene) -> SceneView {
        scene.view(self.scene_members(scene))
    }

    /// Addresses of every scene containing `device`.
    pub fn scenes_including(&self, device: &str) -> Vec<String> {
        self.scenes
            .values()
            .filter(|s| s.includes(device))
            .map(|s| s.address.clone())
            .collect()
    }

    // ── Device list ──────────────────────────────────────────────────

    fn resolve(&self, address: &str, listed: Listed) -> Option<Node> {
        match listed {
            Listed::Device => self.devices.get(address).cloned().map(Node::Device),
            Listed::Scene => self
                .scenes
                .get(address)
                .map(|s| Node::Scene(self.scene_view(s))),
            Listed::Zone(zone) => self.zone(zone).cloned().map(Node::AlarmZone),
            Listed::Panel => self.panel.clone().map(Node::AlarmPanel),
        }
    }

    /// Snapshot of the device list in load order.
    pub fn node_list(&self) -> Vec<Node> {
        self.listing
            .iter()
            .filter_map(|(address, listed)| self.resolve(address, *listed))
            .collect()
    }

    /// Look up a device-list entry by address.
    pub fn node(&self, address: &str) -> Option<Node> {
        let listed = *self.listing.get(address)?;
        self.resolve(address, listed)
    }

    pub fn node_count(&self) -> usize {
        self.listing.len()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceKind;

    fn light(address: &str) -> Device {
        Device::new(address, format!("Light {address}"), "1.32.65.0", DeviceKind::DimmableLight)
    }

    #[test]
    fn duplicate_address_overwrites_in_place() {
        let mut reg = Registry::new();
        assert!(reg.add_device(light("A")));
        assert!(reg.add_device(light("B")));
        let mut again = light("A");
        again.name = "Renamed".into();
        assert!(!reg.add_device(again));

        let names: Vec<_> = reg.node_list().iter().map(|n| n.name().to_owned()).collect();
        assert_eq!(names, vec!["Renamed", "Light B"]);
        assert_eq!(reg.device("A").unwrap().name, "Renamed");
    }

    #[test]
    fn scenes_listed_only_on_request() {
        let mut reg = Registry::new();
        reg.add_device(light("A"));
        reg.add_scene(Scene::new("S1", "Evening", vec!["A".into()]), false);
        assert_eq!(reg.node_count(), 1);
        assert!(reg.node("S1").is_none());
        assert!(reg.scene("S1").is_some());

        reg.add_scene(Scene::new("S2", "Morning", vec!["A".into(), "Z".into()]), true);
        assert!(matches!(reg.node("S2"), Some(Node::Scene(_))));
        assert_eq!(reg.scenes_including("A"), vec!["S1", "S2"]);
        assert_eq!(reg.scene_members(reg.scene("S2").unwrap()).count(), 1);
    }

    #[test]
    fn variables_first_definition_wins() {
        let mut reg = Registry::new();
        assert!(reg.add_variable(Variable::new(VariableKind::State, "1", "Away")));
        assert!(!reg.add_variable(Variable::new(VariableKind::State, "1", "Dup")));
        assert!(reg.add_variable(Variable::new(VariableKind::Integer, "1", "Counter")));
        assert_eq!(reg.variable(VariableKind::State, "1").unwrap().name, "Away");
        assert_eq!(reg.variable_count(), 2);
    }

    #[test]
    fn zones_and_panel_join_the_list_explicitly() {
        let mut reg = Registry::new();
        reg.add_zone(AlarmZone::new(4, 1, "Back Door", None));
        assert!(reg.node("ElkZone4").is_none());
        assert!(reg.list_zone(4));
        assert!(!reg.list_zone(4));
        assert!(!reg.list_zone(9));

        reg.set_panel(AlarmPanel::new(1));
        assert!(reg.node("ElkPanel1").is_none());
        reg.list_panel();
        assert!(matches!(reg.node("ElkPanel1"), Some(Node::AlarmPanel(_))));
        assert_eq!(reg.node_count(), 2);
    }

    #[test]
    fn readiness_gate() {
        let mut reg = Registry::new();
        assert!(!reg.is_loaded());
        reg.mark_loaded();
        assert!(reg.is_loaded());
    }
}
