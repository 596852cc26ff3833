// ── Command API ──
//
// Every write against the controller is a `Command`. The controller
// validates it against the Registry, turns it into a `/rest/...` path and
// reports plain success or failure. Issuing a command never mutates the
// Registry; confirmation arrives later as an event.

use isy_api::VariableKind;
use strum::{Display, EnumString};

use crate::defs;
use crate::error::CoreError;
use crate::model::{AlarmMode, DeviceKind, FanSpeed};
use crate::store::Registry;

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<bool, CoreError>>,
}

/// Program operations, named as the controller spells them in paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ProgramAction {
    Run,
    RunThen,
    RunElse,
    Stop,
    Enable,
    Disable,
    EnableRunAtStartup,
    DisableRunAtStartup,
}

/// All write operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Devices ──────────────────────────────────────────────────────
    SetLight { address: String, on: bool },
    /// Level in percent, 0-100.
    DimLight { address: String, level: u8 },
    SetLock { address: String, locked: bool },
    SetOutlet { address: String, on: bool },
    SetFanSpeed { address: String, speed: FanSpeed },
    /// Raw node command, e.g. `DFON` or `DON/128`.
    NodeCommand {
        address: String,
        command: String,
        parameter: Option<String>,
    },

    // ── Scenes ───────────────────────────────────────────────────────
    SetScene { address: String, on: bool },

    // ── Security system ──────────────────────────────────────────────
    SetAlarmMode { mode: AlarmMode },
    ClearBypasses,
    ToggleZoneBypass { zone: u32 },

    // ── Variables and programs ───────────────────────────────────────
    SetVariable {
        kind: VariableKind,
        id: String,
        value: i64,
    },
    Program { id: String, action: ProgramAction },
}

impl Command {
    /// Validate against the Registry and build the path relative to
    /// `/rest/`. `area` is the configured security-system area.
    pub fn rest_path(&self, registry: &Registry, area: u32) -> Result<String, CoreError> {
        match self {
            Self::SetLight { address, on } => {
                require_kind(registry, address, "light", DeviceKind::is_light)?;
                Ok(node_path(address, on_off(*on), None))
            }
            Self::DimLight { address, level } => {
                require_kind(registry, address, "dim", DeviceKind::is_light)?;
                let native = native_level(*level);
                Ok(node_path(address, defs::CMD_ON, Some(&native.to_string())))
            }
            Self::SetLock { address, locked } => {
                let kind = require_kind(registry, address, "lock", DeviceKind::is_lock)?;
                if kind == DeviceKind::SecureLock {
                    let param = if *locked { "1" } else { "0" };
                    Ok(node_path(address, defs::CMD_SECURE, Some(param)))
                } else {
                    Ok(node_path(address, on_off(*locked), None))
                }
            }
            Self::SetOutlet { address, on } => {
                require_kind(registry, address, "outlet", |k| k == DeviceKind::Outlet)?;
                Ok(node_path(address, on_off(*on), None))
            }
            Self::SetFanSpeed { address, speed } => {
                require_kind(registry, address, "fan", |k| k == DeviceKind::Fan)?;
                Ok(match speed.level() {
                    Some(level) => node_path(address, defs::CMD_ON, Some(&level.to_string())),
                    None => node_path(address, defs::CMD_OFF, None),
                })
            }
            Self::NodeCommand {
                address,
                command,
                parameter,
            } => {
                if registry.device(address).is_none() && registry.scene(address).is_none() {
                    return Err(CoreError::DeviceNotFound {
                        address: address.clone(),
                    });
                }
                Ok(node_path(address, command, parameter.as_deref()))
            }
            Self::SetScene { address, on } => {
                if registry.scene(address).is_none() {
                    return Err(CoreError::SceneNotFound {
                        address: address.clone(),
                    });
                }
                Ok(node_path(address, on_off(*on), None))
            }
            Self::SetAlarmMode { mode } => {
                require_panel(registry)?;
                Ok(if *mode == AlarmMode::Disarmed {
                    format!("elk/area/{area}/cmd/disarm")
                } else {
                    format!("elk/area/{area}/cmd/arm?armType={}", mode.code())
                })
            }
            Self::ClearBypasses => {
                require_panel(registry)?;
                Ok(format!("elk/area/{area}/cmd/unbypass"))
            }
            Self::ToggleZoneBypass { zone } => {
                require_panel(registry)?;
                if registry.zone(*zone).is_none() {
                    return Err(CoreError::DeviceNotFound {
                        address: format!("ElkZone{zone}"),
                    });
                }
                Ok(format!("elk/zone/{zone}/cmd/toggle/bypass"))
            }
            Self::SetVariable { kind, id, value } => {
                if registry.variable(*kind, id).is_none() {
                    return Err(CoreError::VariableNotFound {
                        kind: kind.label().to_owned(),
                        id: id.clone(),
                    });
                }
                Ok(format!("vars/set/{}/{id}/{value}", kind.code()))
            }
            Self::Program { id, action } => Ok(format!("programs/{id}/{action}")),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn on_off(on: bool) -> &'static str {
    if on { defs::CMD_ON } else { defs::CMD_OFF }
}

fn node_path(address: &str, command: &str, parameter: Option<&str>) -> String {
    match parameter {
        Some(p) => format!("nodes/{address}/cmd/{command}/{p}"),
        None => format!("nodes/{address}/cmd/{command}"),
    }
}

/// Percent to the native 0-255 scale, rounding up.
pub fn native_level(percent: u8) -> u16 {
    let percent = u16::from(percent.min(100));
    (percent * 255).div_ceil(100)
}

fn require_kind(
    registry: &Registry,
    address: &str,
    command: &str,
    accepts: impl Fn(DeviceKind) -> bool,
) -> Result<DeviceKind, CoreError> {
    let device = registry
        .device(address)
        .ok_or_else(|| CoreError::DeviceNotFound {
            address: address.to_owned(),
        })?;
    if accepts(device.kind) {
        Ok(device.kind)
    } else {
        Err(CoreError::UnsupportedCommand {
            address: address.to_owned(),
            kind: device.kind.to_string(),
            command: command.to_owned(),
        })
    }
}

fn require_panel(registry: &Registry) -> Result<(), CoreError> {
    registry
        .panel()
        .map(|_| ())
        .ok_or(CoreError::AlarmPanelDisabled)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{AlarmPanel, AlarmZone, Device, Scene, Variable};

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.add_device(Device::new("17 54 AD 1", "Hall", "1.32.65.0", DeviceKind::DimmableLight));
        reg.add_device(Device::new("2B 1 1 1", "Door", "4.64.0.0", DeviceKind::SecureLock));
        reg.add_device(Device::new("2C 1 1 1", "Shed", "15.1.0.0", DeviceKind::Lock));
        reg.add_device(Device::new("14 A1 6D 2", "Fan", "1.46.69.0", DeviceKind::Fan));
        reg.add_device(Device::new("3C 2 1 1", "Lamp", "2.9.0.0", DeviceKind::Outlet));
        reg.add_scene(Scene::new("12345", "Evening", vec!["17 54 AD 1".into()]), false);
        reg.add_variable(Variable::new(VariableKind::State, "3", "Away"));
        reg
    }

    fn with_panel() -> Registry {
        let mut reg = registry();
        reg.set_panel(AlarmPanel::new(1));
        reg.add_zone(AlarmZone::new(4, 1, "Back Door", None));
        reg
    }

    fn path(cmd: &Command, reg: &Registry) -> String {
        cmd.rest_path(reg, 1).unwrap()
    }

    #[test]
    fn light_commands() {
        let reg = registry();
        let on = Command::SetLight {
            address: "17 54 AD 1".into(),
            on: true,
        };
        assert_eq!(path(&on, &reg), "nodes/17 54 AD 1/cmd/DON");

        let dim = Command::DimLight {
            address: "17 54 AD 1".into(),
            level: 50,
        };
        assert_eq!(path(&dim, &reg), "nodes/17 54 AD 1/cmd/DON/128");
    }

    #[test]
    fn dim_level_rounds_up() {
        assert_eq!(native_level(0), 0);
        assert_eq!(native_level(1), 3);
        assert_eq!(native_level(50), 128);
        assert_eq!(native_level(100), 255);
        assert_eq!(native_level(200), 255);
    }

    #[test]
    fn secure_and_plain_locks_differ() {
        let reg = registry();
        let secure = Command::SetLock {
            address: "2B 1 1 1".into(),
            locked: false,
        };
        assert_eq!(path(&secure, &reg), "nodes/2B 1 1 1/cmd/SECMD/0");
        let plain = Command::SetLock {
            address: "2C 1 1 1".into(),
            locked: true,
        };
        assert_eq!(path(&plain, &reg), "nodes/2C 1 1 1/cmd/DON");
    }

    #[test]
    fn fan_speeds() {
        let reg = registry();
        let cmd = |speed| Command::SetFanSpeed {
            address: "14 A1 6D 2".into(),
            speed,
        };
        assert_eq!(path(&cmd(FanSpeed::Off), &reg), "nodes/14 A1 6D 2/cmd/DOF");
        assert_eq!(path(&cmd(FanSpeed::Low), &reg), "nodes/14 A1 6D 2/cmd/DON/63");
        assert_eq!(path(&cmd(FanSpeed::High), &reg), "nodes/14 A1 6D 2/cmd/DON/255");
    }

    #[test]
    fn wrong_kind_is_unsupported() {
        let reg = registry();
        let cmd = Command::SetFanSpeed {
            address: "3C 2 1 1".into(),
            speed: FanSpeed::Low,
        };
        let err = cmd.rest_path(&reg, 1).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedCommand { ref kind, .. } if kind == "outlet"));
    }

    #[test]
    fn unknown_targets_are_not_found() {
        let reg = registry();
        let light = Command::SetLight {
            address: "AA BB CC 1".into(),
            on: true,
        };
        assert!(matches!(light.rest_path(&reg, 1), Err(CoreError::DeviceNotFound { .. })));
        let scene = Command::SetScene {
            address: "999".into(),
            on: true,
        };
        assert!(matches!(scene.rest_path(&reg, 1), Err(CoreError::SceneNotFound { .. })));
        let var = Command::SetVariable {
            kind: VariableKind::Integer,
            id: "3".into(),
            value: 1,
        };
        assert!(matches!(var.rest_path(&reg, 1), Err(CoreError::VariableNotFound { .. })));
    }

    #[test]
    fn security_commands_need_the_panel() {
        let cmd = Command::SetAlarmMode {
            mode: AlarmMode::Away,
        };
        assert!(matches!(
            cmd.rest_path(&registry(), 1),
            Err(CoreError::AlarmPanelDisabled)
        ));

        let reg = with_panel();
        assert_eq!(path(&cmd, &reg), "elk/area/1/cmd/arm?armType=1");
        let disarm = Command::SetAlarmMode {
            mode: AlarmMode::Disarmed,
        };
        assert_eq!(path(&disarm, &reg), "elk/area/1/cmd/disarm");
        assert_eq!(path(&Command::ClearBypasses, &reg), "elk/area/1/cmd/unbypass");
        assert_eq!(
            path(&Command::ToggleZoneBypass { zone: 4 }, &reg),
            "elk/zone/4/cmd/toggle/bypass"
        );
    }

    #[test]
    fn arm_modes_carry_their_code() {
        let reg = with_panel();
        let paths: Vec<String> = [
            AlarmMode::Stay,
            AlarmMode::StayInstant,
            AlarmMode::Night,
            AlarmMode::NightInstant,
            AlarmMode::Vacation,
        ]
        .into_iter()
        .map(|mode| path(&Command::SetAlarmMode { mode }, &reg))
        .collect();
        insta::assert_snapshot!(paths.join("\n"), @r"
        elk/area/1/cmd/arm?armType=2
        elk/area/1/cmd/arm?armType=3
        elk/area/1/cmd/arm?armType=4
        elk/area/1/cmd/arm?armType=5
        elk/area/1/cmd/arm?armType=6
        ");
    }

    #[test]
    fn variables_and_programs() {
        let reg = registry();
        let set = Command::SetVariable {
            kind: VariableKind::State,
            id: "3".into(),
            value: -2,
        };
        assert_eq!(path(&set, &reg), "vars/set/2/3/-2");
        let run = Command::Program {
            id: "0012".into(),
            action: ProgramAction::RunThen,
        };
        assert_eq!(path(&run, &reg), "programs/0012/runThen");
        assert_eq!(
            "enableRunAtStartup".parse::<ProgramAction>().unwrap(),
            ProgramAction::EnableRunAtStartup
        );
    }

    #[test]
    fn raw_node_commands() {
        let reg = registry();
        let cmd = Command::NodeCommand {
            address: "12345".into(),
            command: "DFON".into(),
            parameter: None,
        };
        assert_eq!(path(&cmd, &reg), "nodes/12345/cmd/DFON");
    }
}
