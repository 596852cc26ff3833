//! Live device graph for ISY-family controllers.
//!
//! This crate sits between `isy-api` (transport) and front ends:
//!
//! - **[`classify`]** maps raw vendor type codes to a [`DeviceKind`].
//! - **[`model`]** holds devices, scenes, alarm panel/zones and variables,
//!   each with a compare-then-mutate update protocol.
//! - **[`Registry`]** owns every entity, indexed by address or id.
//! - **[`loader`]** builds a `Registry` from the REST snapshot.
//! - **[`EventDispatcher`]** applies real-time event records and
//!   notifies a [`ChangeObserver`].
//! - **[`supervisor`]** keeps the event stream alive, reconnecting when
//!   delivery stalls.
//! - **[`Controller`]** ties it together behind a cloneable handle and
//!   routes [`Command`]s to the REST API.

pub mod classify;
pub mod command;
pub mod config;
pub mod controller;
pub mod defs;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod model;
pub mod store;
pub mod supervisor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, ProgramAction};
pub use config::{ControllerConfig, Credentials, LivenessConfig, TlsVerification};
pub use controller::Controller;
pub use dispatch::{ChangeObserver, EventDispatcher};
pub use error::CoreError;
pub use store::Registry;
pub use supervisor::ConnectionState;

pub use model::{
    AlarmMode, AlarmPanel, AlarmState, AlarmTripState, AlarmZone, Change, Device, DeviceKind,
    FanSpeed, LogicalState, Node, NodeServerInfo, PhysicalState, Scene, SceneView,
    ThermostatStatus, UpdateType, Value, Variable, ZoneSensorKind,
};

pub use isy_api::VariableKind;
