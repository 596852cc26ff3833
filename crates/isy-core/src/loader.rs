// ── Loader ──
//
// Builds a fresh Registry from the controller's REST snapshot: nodes and
// scenes, variables (integer then state), then the security system when
// enabled. Any failure except the optional variable definitions aborts
// the load.

use isy_api::xml::{ElkStatus, ElkTopology, GroupRecord, NodeRecord, VariableRecord};
use isy_api::{RestClient, VariableKind, parse_timestamp};
use tracing::{debug, info, warn};

use crate::classify::{self, TypeDescriptor, TypeInfo};
use crate::config::ControllerConfig;
use crate::defs;
use crate::dispatch::EventDispatcher;
use crate::error::CoreError;
use crate::model::{AlarmPanel, AlarmZone, Device, DeviceKind, NodeServerInfo, Scene, Value, Variable};
use crate::store::Registry;

const DEFAULT_ADDRESS: &str = "00 00 00 1";
const DEFAULT_TYPE: &str = "unknown";
const DEFAULT_NAME: &str = "Unnamed Device";
/// The controller's own root group.
const ROOT_GROUP_NAME: &str = "ISY";

/// Load everything and return a Registry marked as loaded.
pub async fn load(
    client: &RestClient,
    config: &ControllerConfig,
    dispatcher: &EventDispatcher,
) -> Result<Registry, CoreError> {
    let mut registry = Registry::new();

    let doc = client.nodes().await.map_err(|e| phase_error("nodes", e))?;
    load_devices(&mut registry, &doc.nodes, dispatcher);
    load_scenes(&mut registry, &doc.groups, config.scenes_in_device_list);

    for kind in VariableKind::ALL {
        load_variables(&mut registry, client, kind, config.variable_load_attempts).await?;
    }

    if config.elk_enabled {
        let topology = client
            .elk_topology()
            .await
            .map_err(|e| phase_error("security topology", e))?;
        registry.set_panel(AlarmPanel::new(config.elk_area));
        apply_topology(&mut registry, &topology);

        let status = client
            .elk_status()
            .await
            .map_err(|e| phase_error("security status", e))?;
        apply_status(&mut registry, &status);
    }

    registry.mark_loaded();
    if config.elk_enabled {
        registry.list_panel();
    }

    info!(
        nodes = registry.node_count(),
        variables = registry.variable_count(),
        "controller snapshot loaded"
    );
    Ok(registry)
}

/// Authentication failures keep their own variant; everything else names
/// the phase that failed.
fn phase_error(phase: &str, err: isy_api::Error) -> CoreError {
    match err {
        isy_api::Error::Authentication { .. } => err.into(),
        other => CoreError::phase(phase, other),
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// Classify one node record. Disabled nodes yield `None`.
pub fn build_device(node: &NodeRecord) -> Option<Device> {
    if node.enabled.as_deref().map(str::trim) == Some("false") {
        debug!(name = ?node.name, "skipping disabled node");
        return None;
    }

    let address = node.address.as_deref().unwrap_or(DEFAULT_ADDRESS);
    let type_code = node.type_code.as_deref().unwrap_or(DEFAULT_TYPE);
    let name = node.name.as_deref().unwrap_or(DEFAULT_NAME);

    let descriptor = TypeDescriptor {
        type_code,
        address,
        family: node.family.as_ref().map(|f| f.id.as_str()),
        category: node.devtype.as_ref().and_then(|d| d.cat.as_deref()),
    };
    let info = classify::classify(&descriptor).unwrap_or_else(|| {
        debug!(name, type_code, "unclassified node, using generic device");
        TypeInfo::unknown()
    });

    let mut device = Device::new(address, name, type_code, info.kind);
    device.battery_operated = info.battery_operated;
    device.friendly_name = info.name;
    device.connection = info.connection;

    if info.kind == DeviceKind::NodeServerNode {
        let family = node.family.as_ref();
        let slot = match family.and_then(|f| f.instance.as_deref()) {
            Some(instance) => format!("{}@{instance}", family.map_or("", |f| f.id.trim())),
            None => family.map(|f| f.id.trim().to_owned()).unwrap_or_default(),
        };
        device.node_server = Some(NodeServerInfo {
            slot,
            parent: node.pnode.clone(),
            node_def_id: node.node_def_id.clone(),
        });
        device.connection = classify::NODE_SERVER_V5.to_owned();
        device.friendly_name = "ISYv5 Node Server Device".to_owned();
    }

    // Property bag with formatted shadows; ST seeds the primary state below.
    for prop in &node.properties {
        let value = Value::coerce(&prop.value);
        let shadow = match prop.formatted.as_deref() {
            Some(f) => Value::coerce(f),
            None => value.clone(),
        };
        device.properties.insert(prop.id.clone(), value);
        device.properties.insert(format!("{}_f", prop.id), shadow);
    }

    Some(device)
}

/// Add every enabled node, then seed its primary state through the
/// dispatcher's state path.
pub fn load_devices(registry: &mut Registry, nodes: &[NodeRecord], dispatcher: &EventDispatcher) {
    for node in nodes {
        let Some(device) = build_device(node) else {
            continue;
        };
        let address = device.address.clone();
        registry.add_device(device);

        if let Some(status) = node.properties.iter().find(|p| p.id == defs::STATUS) {
            dispatcher.apply_state_update(
                registry,
                &address,
                &status.value,
                status.formatted.as_deref(),
            );
        }
    }
}

// ── Scenes ───────────────────────────────────────────────────────────

pub fn load_scenes(registry: &mut Registry, groups: &[GroupRecord], listed: bool) {
    for group in groups {
        if group.name == ROOT_GROUP_NAME {
            continue;
        }
        let members: Vec<String> = group
            .members
            .iter()
            .flat_map(|m| m.links.iter())
            .map(|l| l.address.trim().to_owned())
            .filter(|a| !a.is_empty())
            .collect();
        if members.is_empty() {
            debug!(scene = %group.name, "skipping empty scene");
            continue;
        }
        registry.add_scene(
            Scene::new(group.address.clone(), group.name.clone(), members),
            listed,
        );
    }
}

// ── Variables ────────────────────────────────────────────────────────

async fn load_variables(
    registry: &mut Registry,
    client: &RestClient,
    kind: VariableKind,
    attempts: u32,
) -> Result<(), CoreError> {
    let definitions = match client.variable_definitions(kind).await {
        Ok(defs) => defs,
        Err(e) => {
            // Controllers without variables of this type answer with an error.
            debug!(kind = kind.label(), error = %e, "no variable definitions");
            return Ok(());
        }
    };
    for def in &definitions.entries {
        registry.add_variable(Variable::new(kind, def.id.clone(), def.name.clone()));
    }

    let attempts = attempts.max(1);
    let mut attempt = 1;
    let values = loop {
        match client.variable_values(kind).await {
            Ok(values) => break values,
            Err(e) if attempt < attempts => {
                warn!(kind = kind.label(), attempt, error = %e, "variable values failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(phase_error("variables", e)),
        }
    };
    apply_variable_values(registry, &values.vars);
    Ok(())
}

/// Store fetched values onto known variables; unknown ids are ignored.
pub fn apply_variable_values(registry: &mut Registry, records: &[VariableRecord]) {
    for record in records {
        let Some(kind) = VariableKind::from_code(&record.var_type) else {
            continue;
        };
        if let Some(variable) = registry.variable_mut(kind, &record.id) {
            variable.set_value(
                record.val.as_deref().and_then(Value::parse_numeric),
                record.ts.as_deref().and_then(parse_timestamp),
            );
            variable.init = record.init.as_deref().and_then(Value::parse_numeric);
        }
    }
}

// ── Security system ──────────────────────────────────────────────────

pub fn apply_topology(registry: &mut Registry, topology: &ElkTopology) {
    for area in topology.areas() {
        for zone in &area.zones {
            registry.add_zone(AlarmZone::new(zone.id, area.id, zone.name.clone(), zone.alarm_def));
        }
    }
}

/// Apply the initial status records. Zones that report as present join
/// the device list.
pub fn apply_status(registry: &mut Registry, status: &ElkStatus) {
    if let Some(panel) = registry.panel_mut() {
        for update in &status.areas {
            panel.apply_area_update(update);
        }
    }
    for update in &status.zones {
        let Some(zone) = registry.zone_mut(update.zone) else {
            continue;
        };
        zone.apply_zone_update(update);
        if zone.is_present() {
            registry.list_zone(update.zone);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
