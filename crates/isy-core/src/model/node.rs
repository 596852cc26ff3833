// Heterogeneous node snapshots handed to observers and front ends.

use serde::Serialize;

use super::alarm::{AlarmPanel, AlarmZone};
use super::device::{Device, DeviceKind};
use super::scene::SceneView;
use super::variable::Variable;

/// Anything that can appear in the device list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "entity", rename_all = "camelCase")]
pub enum Node {
    Device(Device),
    Scene(SceneView),
    AlarmZone(AlarmZone),
    AlarmPanel(AlarmPanel),
}

impl Node {
    pub fn address(&self) -> &str {
        match self {
            Self::Device(d) => &d.address,
            Self::Scene(s) => &s.address,
            Self::AlarmZone(z) => &z.address,
            Self::AlarmPanel(p) => &p.address,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Device(d) => &d.name,
            Self::Scene(s) => &s.name,
            Self::AlarmZone(z) => &z.name,
            Self::AlarmPanel(p) => &p.name,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Device(d) => d.kind,
            Self::Scene(s) => s.kind,
            Self::AlarmZone(z) => z.kind,
            Self::AlarmPanel(p) => p.kind,
        }
    }

    /// Human-readable state for listings.
    pub fn state_summary(&self) -> String {
        match self {
            Self::Device(d) => d.state_summary(),
            Self::Scene(s) => {
                if s.light_on {
                    format!("On {:.0}%", s.dim_level)
                } else {
                    "Off".to_owned()
                }
            }
            Self::AlarmZone(z) => format!("{} / {}", z.physical_state, z.logical_state),
            Self::AlarmPanel(p) => format!("{} / {}", p.alarm_mode, p.alarm_state),
        }
    }
}

/// A change delivered to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", content = "entity", rename_all = "camelCase")]
pub enum Change {
    Node(Node),
    Variable(Variable),
}
