//! Device command handlers.

use std::str::FromStr;

use tabled::Tabled;

use isy_core::{Controller, Device, DeviceKind, Node};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
}

impl NodeRow {
    fn new(node: &Node, color: bool) -> Self {
        Self {
            address: node.address().to_owned(),
            name: node.name().to_owned(),
            kind: node.kind().to_string(),
            state: output::paint_state(&node.state_summary(), is_active(node), color),
        }
    }
}

fn is_active(node: &Node) -> bool {
    match node {
        Node::Device(d) => d.current_state > 0.0,
        Node::Scene(s) => s.light_on,
        Node::AlarmZone(z) => z.is_open(),
        Node::AlarmPanel(p) => p.alarm_mode != isy_core::AlarmMode::Disarmed,
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn device_detail(d: &Device) -> String {
    let mut lines = vec![
        format!("Address:    {}", d.address),
        format!("Name:       {}", d.name),
        format!("Kind:       {}", d.kind),
        format!("Type:       {}", d.type_code),
        format!("Connection: {}", d.connection),
        format!("Model:      {}", d.friendly_name),
        format!("State:      {} ({})", d.state_summary(), d.current_state),
        format!("Battery:    {}", if d.battery_operated { "yes" } else { "no" }),
        format!("Changed:    {}", d.last_changed.format("%Y-%m-%d %H:%M:%S")),
    ];
    if let Some(ref ns) = d.node_server {
        lines.push(format!("Slot:       {}", ns.slot));
        lines.push(format!("Parent:     {}", or_dash(ns.parent.as_deref())));
        lines.push(format!("Node def:   {}", or_dash(ns.node_def_id.as_deref())));
    }
    if d.kind == DeviceKind::Thermostat {
        let t = d.thermostat_status();
        lines.push(format!(
            "Setpoints:  heat {} / cool {}",
            or_dash(t.heat_set_point),
            or_dash(t.cool_set_point)
        ));
        lines.push(format!("Humidity:   {}", or_dash(t.humidity)));
        lines.push(format!("Mode:       {}", or_dash(t.mode)));
    }
    if !d.properties.is_empty() {
        lines.push("Properties:".into());
        for (name, value) in &d.properties {
            lines.push(format!("  {name:<10} {value}"));
        }
    }
    lines.join("\n")
}

fn node_detail(node: &Node) -> String {
    match node {
        Node::Device(d) => device_detail(d),
        Node::Scene(s) => super::scenes::detail(s),
        Node::AlarmZone(z) => super::alarm::zone_detail(z),
        Node::AlarmPanel(p) => super::alarm::panel_detail(p),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { kind } => {
            let filter = kind
                .map(|k| {
                    DeviceKind::from_str(&k).map_err(|_| CliError::Validation {
                        field: "kind".into(),
                        reason: format!("unknown device kind '{k}'"),
                    })
                })
                .transpose()?;

            let nodes: Vec<Node> = controller
                .nodes()
                .await
                .into_iter()
                .filter(|n| filter.is_none_or(|k| n.kind() == k))
                .collect();

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &nodes,
                |n| NodeRow::new(n, color),
                |n| n.address().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { address } => {
            let node = controller
                .node(&address)
                .await
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: address,
                    list_command: "devices list".into(),
                })?;
            let out = output::render_single(
                &global.output,
                &node,
                node_detail,
                |n| n.address().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
