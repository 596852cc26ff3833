// ── Event Dispatcher ──
//
// Applies real-time event records to the Registry and tells the observer
// what changed. Each record is one unit of work: the caller holds the
// Registry for the whole `dispatch` call.

use std::sync::Arc;

use isy_api::event::EventRecord;
use isy_api::{VariableKind, parse_timestamp};
use tracing::{debug, trace};

use crate::defs;
use crate::model::{Change, Node, UpdateType, Value, Variable};
use crate::store::Registry;

// ── Observer ─────────────────────────────────────────────────────────

/// Receives change notifications. Called synchronously from `dispatch`,
/// so implementations must not block.
pub trait ChangeObserver: Send + Sync {
    fn node_changed(&self, node: &Node);

    fn variable_changed(&self, _variable: &Variable) {}
}

impl<F> ChangeObserver for F
where
    F: Fn(Change) + Send + Sync,
{
    fn node_changed(&self, node: &Node) {
        self(Change::Node(node.clone()));
    }

    fn variable_changed(&self, variable: &Variable) {
        self(Change::Variable(variable.clone()));
    }
}

// ── Routing ──────────────────────────────────────────────────────────

/// How a control code is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Primary state.
    State,
    /// Temperature or set point: scaled, maybe converted, then stored.
    ClimateMeasurement,
    /// Stored as a named property as-is.
    Property,
    /// `GV*` generic values.
    GenericValue,
    /// Security-system area/zone record.
    Security,
    /// System event; carries variable changes.
    System,
    Ignore,
}

pub fn route(control: &str) -> Route {
    if control.starts_with(defs::GENERIC_VALUE_PREFIX) {
        return Route::GenericValue;
    }
    match control {
        defs::STATUS => Route::State,
        defs::CLIMATE_TEMPERATURE | defs::CLIMATE_COOL_SETPOINT | defs::CLIMATE_HEAT_SETPOINT => {
            Route::ClimateMeasurement
        }
        defs::CLIMATE_HUMIDITY
        | defs::CLIMATE_OPERATING_MODE
        | defs::CLIMATE_MODE
        | defs::CLIMATE_FAN
        | defs::BATTERY_LEVEL
        | defs::POWER_FACTOR
        | defs::POLARIZED_POWER
        | defs::CURRENT_CURRENT
        | defs::TOTAL_POWER
        | defs::CURRENT_VOLTAGE => Route::Property,
        defs::SECURITY_EVENT => Route::Security,
        defs::SYSTEM_EVENT => Route::System,
        _ => Route::Ignore,
    }
}

/// Apply the fixed-point precision, then convert Fahrenheit readings to
/// Celsius rounded to one decimal.
pub fn scale_measurement(raw: f64, precision: Option<u32>, uom: Option<u32>) -> f64 {
    let value = match precision {
        Some(1) => raw / 10.0,
        Some(2) => raw / 100.0,
        _ => raw,
    };
    if uom == Some(defs::UOM_FAHRENHEIT) {
        let celsius = (5.0 / 9.0) * (value - 32.0);
        (celsius * 10.0).round() / 10.0
    } else {
        value
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

pub struct EventDispatcher {
    scenes_in_device_list: bool,
    observer: Arc<dyn ChangeObserver>,
}

impl EventDispatcher {
    pub fn new(scenes_in_device_list: bool, observer: Arc<dyn ChangeObserver>) -> Self {
        Self {
            scenes_in_device_list,
            observer,
        }
    }

    /// Apply one event record. Unknown controls and unknown targets are
    /// ignored.
    pub fn dispatch(&self, registry: &mut Registry, event: &EventRecord) {
        let control = event.control();
        let action = event.action_value();
        let formatted = event.fmt_act.as_deref();
        trace!(control, action, node = ?event.node_address(), "event");

        match route(control) {
            Route::State => {
                if let Some(address) = event.node_address() {
                    self.apply_state_update(registry, address, action, formatted);
                }
            }
            Route::ClimateMeasurement => {
                let Some(address) = event.node_address() else {
                    return;
                };
                let Some(raw) = Value::parse_numeric(action) else {
                    debug!(control, action, "ignoring non-numeric climate reading");
                    return;
                };
                let value = scale_measurement(raw, event.precision(), event.uom());
                self.apply_property_update(
                    registry,
                    address,
                    control,
                    &value.to_string(),
                    formatted,
                );
            }
            Route::Property => {
                if let Some(address) = event.node_address() {
                    self.apply_property_update(registry, address, control, action, formatted);
                }
            }
            Route::GenericValue => {
                let Some(address) = event.node_address() else {
                    return;
                };
                self.apply_property_update(registry, address, control, action, formatted);
                if let (Some(name), Some(value)) = (event.fmt_name.as_deref(), formatted) {
                    self.apply_property_update(registry, address, name, value, None);
                }
            }
            Route::Security => self.apply_security(registry, event),
            Route::System => self.apply_system(registry, event),
            Route::Ignore => {}
        }
    }

    /// Primary-state update. On change, recomputes and announces every
    /// scene that includes the device when scenes are listed.
    pub fn apply_state_update(
        &self,
        registry: &mut Registry,
        address: &str,
        raw: &str,
        formatted: Option<&str>,
    ) -> bool {
        let Some(device) = registry.device_mut(address) else {
            return false;
        };
        if !device.apply_state(raw, formatted) {
            return false;
        }
        device.update_type = Some(UpdateType::Generic);
        let snapshot = Node::Device(device.clone());
        self.notify(registry, &snapshot);

        if self.scenes_in_device_list {
            for scene_address in registry.scenes_including(address) {
                let recalculated = registry
                    .scene_mut(&scene_address)
                    .is_some_and(crate::model::Scene::recalculate);
                if recalculated {
                    if let Some(scene) = registry.scene(&scene_address) {
                        let view = Node::Scene(registry.scene_view(scene));
                        self.notify(registry, &view);
                    }
                }
            }
        }
        true
    }

    /// Named-property update on a device.
    pub fn apply_property_update(
        &self,
        registry: &mut Registry,
        address: &str,
        property: &str,
        raw: &str,
        formatted: Option<&str>,
    ) -> bool {
        let Some(device) = registry.device_mut(address) else {
            return false;
        };
        if !device.apply_property(property, raw, formatted) {
            return false;
        }
        device.update_type = Some(UpdateType::Property);
        let snapshot = Node::Device(device.clone());
        self.notify(registry, &snapshot);
        true
    }

    fn apply_security(&self, registry: &mut Registry, event: &EventRecord) {
        let Some(info) = event.event_info.as_ref() else {
            return;
        };
        match event.action_value() {
            defs::SECURITY_AREA_EVENT => {
                let (Some(update), Some(panel)) = (info.ae.as_ref(), registry.panel_mut()) else {
                    return;
                };
                if panel.apply_area_update(update) {
                    let snapshot = Node::AlarmPanel(panel.clone());
                    self.notify(registry, &snapshot);
                }
            }
            defs::SECURITY_ZONE_EVENT => {
                let Some(update) = info.ze.as_ref() else {
                    return;
                };
                let Some(zone) = registry.zone_mut(update.zone) else {
                    debug!(zone = update.zone, "event for unknown zone");
                    return;
                };
                if zone.apply_zone_update(update) {
                    let snapshot = Node::AlarmZone(zone.clone());
                    self.notify(registry, &snapshot);
                }
            }
            _ => {}
        }
    }

    fn apply_system(&self, registry: &mut Registry, event: &EventRecord) {
        if event.action_value() != defs::VARIABLE_VALUE_CHANGED {
            return;
        }
        let Some(var) = event.event_info.as_ref().and_then(|i| i.var.as_ref()) else {
            return;
        };
        let Some(kind) = VariableKind::from_code(&var.var_type) else {
            return;
        };
        let value = var.val.as_deref().and_then(Value::parse_numeric);
        let timestamp = var.ts.as_deref().and_then(parse_timestamp);

        let loaded = registry.is_loaded();
        let Some(variable) = registry.variable_mut(kind, &var.id) else {
            debug!(kind = kind.code(), id = %var.id, "event for unknown variable");
            return;
        };
        variable.set_value(value, timestamp);
        if loaded {
            self.observer.variable_changed(variable);
        }
    }

    /// Deliver a change, but only once the initial load has completed.
    fn notify(&self, registry: &Registry, node: &Node) {
        if registry.is_loaded() {
            debug!(address = node.address(), kind = %node.kind(), "node changed");
            self.observer.node_changed(node);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use isy_api::parse_event;

    use super::*;
    use crate::model::{AlarmMode, AlarmPanel, AlarmZone, Device, DeviceKind, Scene};

    #[derive(Default)]
    struct Recorder {
        changes: Mutex<Vec<Change>>,
    }

    impl Recorder {
        fn addresses(&self) -> Vec<String> {
            self.changes
                .lock()
                .unwrap()
                .iter()
                .map(|c| match c {
                    Change::Node(n) => n.address().to_owned(),
                    Change::Variable(v) => v.key(),
                })
                .collect()
        }
    }

    impl ChangeObserver for Recorder {
        fn node_changed(&self, node: &Node) {
            self.changes.lock().unwrap().push(Change::Node(node.clone()));
        }

        fn variable_changed(&self, variable: &Variable) {
            self.changes
                .lock()
                .unwrap()
                .push(Change::Variable(variable.clone()));
        }
    }

    fn setup(scenes_in_device_list: bool) -> (Registry, EventDispatcher, Arc<Recorder>) {
        let mut reg = Registry::new();
        reg.add_device(Device::new("A 1", "Hall", "1.32.65.0", DeviceKind::DimmableLight));
        reg.add_device(Device::new("B 1", "Porch", "2.42.67.0", DeviceKind::Light));
        reg.add_device(Device::new("T 1", "Stat", "5.11.16.0", DeviceKind::Thermostat));
        reg.add_scene(Scene::new("S1", "Evening", vec!["A 1".into(), "B 1".into()]), true);
        reg.add_scene(Scene::new("S2", "Outside", vec!["B 1".into()]), true);
        reg.mark_loaded();
        let recorder = Arc::new(Recorder::default());
        let dispatcher = EventDispatcher::new(scenes_in_device_list, recorder.clone());
        (reg, dispatcher, recorder)
    }

    fn event(xml: &str) -> EventRecord {
        parse_event(xml).unwrap().unwrap()
    }

    #[test]
    fn routes() {
        assert_eq!(route("ST"), Route::State);
        assert_eq!(route("CLISPH"), Route::ClimateMeasurement);
        assert_eq!(route("CLIFS"), Route::Property);
        assert_eq!(route("TPW"), Route::Property);
        assert_eq!(route("GV12"), Route::GenericValue);
        assert_eq!(route("_19"), Route::Security);
        assert_eq!(route("_1"), Route::System);
        assert_eq!(route("DON"), Route::Ignore);
    }

    #[test]
    fn fahrenheit_tenths_become_celsius() {
        let c = scale_measurement(720.0, Some(1), Some(17));
        assert!((c - 22.2).abs() < 1e-9, "got {c}");
        assert_eq!(scale_measurement(2150.0, Some(2), Some(4)), 21.5);
        assert_eq!(scale_measurement(72.0, None, None), 72.0);
    }

    #[test]
    fn state_change_notifies_device_then_scenes() {
        let (mut reg, d, rec) = setup(true);
        d.dispatch(
            &mut reg,
            &event("<Event><control>ST</control><action>255</action><node>B 1</node><fmtAct>On</fmtAct></Event>"),
        );
        assert_eq!(rec.addresses(), vec!["B 1", "S1", "S2"]);
        assert_eq!(reg.device("B 1").unwrap().update_type, Some(UpdateType::Generic));

        // Same value again: nothing
        d.dispatch(
            &mut reg,
            &event("<Event><control>ST</control><action>255</action><node>B 1</node></Event>"),
        );
        assert_eq!(rec.addresses().len(), 3);
    }

    #[test]
    fn scenes_untouched_when_not_listed() {
        let (mut reg, d, rec) = setup(false);
        d.dispatch(
            &mut reg,
            &event("<Event><control>ST</control><action>255</action><node>A 1</node></Event>"),
        );
        assert_eq!(rec.addresses(), vec!["A 1"]);
    }

    #[test]
    fn property_updates_skip_scene_recompute() {
        let (mut reg, d, rec) = setup(true);
        d.dispatch(
            &mut reg,
            &event("<Event><control>BATLVL</control><action>80</action><node>A 1</node></Event>"),
        );
        assert_eq!(rec.addresses(), vec!["A 1"]);
        let dev = reg.device("A 1").unwrap();
        assert_eq!(dev.update_type, Some(UpdateType::Property));
        assert_eq!(dev.updated_property.as_deref(), Some("BATLVL"));
    }

    #[test]
    fn temperature_event_is_scaled_and_converted() {
        let (mut reg, d, _rec) = setup(false);
        d.dispatch(
            &mut reg,
            &event(r#"<Event><control>CLITEMP</control><action uom="17" prec="1">720</action><node>T 1</node><fmtAct>72.0°F</fmtAct></Event>"#),
        );
        let dev = reg.device("T 1").unwrap();
        assert_eq!(dev.property("CLITEMP"), Some(&Value::Numeric(22.2)));
        assert_eq!(dev.formatted_property("CLITEMP"), Some(&Value::Display("72.0°F".into())));
    }

    #[test]
    fn generic_value_records_second_key() {
        let (mut reg, d, rec) = setup(false);
        d.dispatch(
            &mut reg,
            &event("<Event><control>GV3</control><action>68</action><node>T 1</node><fmtAct>68 °F</fmtAct><fmtName>Outside Temp</fmtName></Event>"),
        );
        let dev = reg.device("T 1").unwrap();
        assert_eq!(dev.property("GV3"), Some(&Value::Numeric(68.0)));
        assert_eq!(dev.property("Outside Temp"), Some(&Value::Display("68 °F".into())));
        assert_eq!(rec.addresses(), vec!["T 1", "T 1"]);
    }

    #[test]
    fn security_events_reach_panel_and_zone() {
        let (mut reg, d, rec) = setup(false);
        reg.set_panel(AlarmPanel::new(1));
        reg.add_zone(AlarmZone::new(5, 1, "Front", None));

        d.dispatch(
            &mut reg,
            &event(r#"<Event><control>_19</control><action>2</action><node/><eventInfo><ae type="3" area="1" val="2"/></eventInfo></Event>"#),
        );
        assert_eq!(reg.panel().unwrap().alarm_mode, AlarmMode::Stay);

        // Logical only: applied, silent
        d.dispatch(
            &mut reg,
            &event(r#"<Event><control>_19</control><action>3</action><node/><eventInfo><ze type="51" zone="5" val="2"/></eventInfo></Event>"#),
        );
        d.dispatch(
            &mut reg,
            &event(r#"<Event><control>_19</control><action>3</action><node/><eventInfo><ze type="52" zone="5" val="1"/></eventInfo></Event>"#),
        );
        // Unknown zone: ignored
        d.dispatch(
            &mut reg,
            &event(r#"<Event><control>_19</control><action>3</action><node/><eventInfo><ze type="52" zone="9" val="1"/></eventInfo></Event>"#),
        );
        assert_eq!(rec.addresses(), vec!["ElkPanel1", "ElkZone5"]);
    }

    #[test]
    fn variable_event_updates_value_and_notifies() {
        let (mut reg, d, rec) = setup(false);
        reg.add_variable(Variable::new(VariableKind::State, "3", "Away"));
        let frame = "<Event><control>_1</control><action>6</action><node/><eventInfo><var type=\"2\" id=\"3\"><val>1</val><ts>20240102 03:04:05</ts></var></eventInfo></Event>";
        d.dispatch(&mut reg, &event(frame));
        d.dispatch(&mut reg, &event(frame));

        let var = reg.variable(VariableKind::State, "3").unwrap();
        assert_eq!(var.value, Some(1.0));
        assert_eq!(var.last_changed, parse_timestamp("20240102 03:04:05"));
        // No change gate on variables
        assert_eq!(rec.addresses(), vec!["2:3", "2:3"]);
    }

    #[test]
    fn nothing_surfaces_before_load() {
        let mut reg = Registry::new();
        reg.add_device(Device::new("A 1", "Hall", "1.32.65.0", DeviceKind::DimmableLight));
        let rec = Arc::new(Recorder::default());
        let d = EventDispatcher::new(true, rec.clone());
        d.dispatch(
            &mut reg,
            &event("<Event><control>ST</control><action>128</action><node>A 1</node></Event>"),
        );
        assert_eq!(reg.device("A 1").unwrap().current_state, 128.0);
        assert!(rec.addresses().is_empty());
    }

    #[test]
    fn unknown_controls_and_nodes_are_ignored() {
        let (mut reg, d, rec) = setup(true);
        d.dispatch(
            &mut reg,
            &event("<Event><control>DON</control><action>0</action><node>A 1</node></Event>"),
        );
        d.dispatch(
            &mut reg,
            &event("<Event><control>ST</control><action>10</action><node>ZZ 9</node></Event>"),
        );
        assert!(rec.addresses().is_empty());
    }

    #[test]
    fn closures_are_observers() {
        let seen = Arc::new(Mutex::new(0usize));
        let counter = seen.clone();
        let observer = move |_change: Change| *counter.lock().unwrap() += 1;
        let (mut reg, _, _) = setup(false);
        let d = EventDispatcher::new(false, Arc::new(observer));
        d.dispatch(
            &mut reg,
            &event("<Event><control>ST</control><action>1</action><node>A 1</node></Event>"),
        );
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
