//! Domain model: devices, scenes, security system, variables.

pub mod alarm;
pub mod device;
pub mod node;
pub mod scene;
pub mod value;
pub mod variable;

pub use alarm::{
    AlarmMode, AlarmPanel, AlarmState, AlarmTripState, AlarmZone, LogicalState, PhysicalState,
    ZoneSensorKind,
};
pub use device::{Device, DeviceKind, FanSpeed, NodeServerInfo, ThermostatStatus, UpdateType};
pub use node::{Change, Node};
pub use scene::{Scene, SceneState, SceneView, all_lights};
pub use value::Value;
pub use variable::{Variable, variable_key};
