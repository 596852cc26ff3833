//! Device, scene and program control handlers.

use isy_core::{Command as CoreCommand, Controller, FanSpeed, ProgramAction};

use crate::cli::{
    FanArgs, FanCommand, FanSpeedArg, GlobalOpts, LightArgs, LightCommand, LockArgs, LockCommand,
    OutletArgs, OutletCommand, ProgramArgs, ProgramCommand, ProgramOp, SceneArgs, SceneCommand,
};
use crate::error::CliError;

use super::util;

impl From<FanSpeedArg> for FanSpeed {
    fn from(speed: FanSpeedArg) -> Self {
        match speed {
            FanSpeedArg::Off => Self::Off,
            FanSpeedArg::Low => Self::Low,
            FanSpeedArg::Medium => Self::Medium,
            FanSpeedArg::High => Self::High,
        }
    }
}

impl From<ProgramOp> for ProgramAction {
    fn from(op: ProgramOp) -> Self {
        match op {
            ProgramOp::Run => Self::Run,
            ProgramOp::RunThen => Self::RunThen,
            ProgramOp::RunElse => Self::RunElse,
            ProgramOp::Stop => Self::Stop,
            ProgramOp::Enable => Self::Enable,
            ProgramOp::Disable => Self::Disable,
            ProgramOp::EnableRunAtStartup => Self::EnableRunAtStartup,
            ProgramOp::DisableRunAtStartup => Self::DisableRunAtStartup,
        }
    }
}

pub async fn light(
    controller: &Controller,
    args: LightArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (command, done) = match args.command {
        LightCommand::On { address } => {
            let done = format!("{address}: on");
            (CoreCommand::SetLight { address, on: true }, done)
        }
        LightCommand::Off { address } => {
            let done = format!("{address}: off");
            (CoreCommand::SetLight { address, on: false }, done)
        }
        LightCommand::Dim { address, level } => {
            let done = format!("{address}: {level}%");
            (CoreCommand::DimLight { address, level }, done)
        }
    };
    util::execute(controller, command, &done, global).await
}

pub async fn lock(
    controller: &Controller,
    args: LockArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (address, locked) = match args.command {
        LockCommand::Lock { address } => (address, true),
        LockCommand::Unlock { address } => {
            if !util::confirm(&format!("Unlock {address}?"), global.yes)? {
                return Ok(());
            }
            (address, false)
        }
    };
    let done = format!("{address}: {}", if locked { "locked" } else { "unlocked" });
    util::execute(controller, CoreCommand::SetLock { address, locked }, &done, global).await
}

pub async fn outlet(
    controller: &Controller,
    args: OutletArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (address, on) = match args.command {
        OutletCommand::On { address } => (address, true),
        OutletCommand::Off { address } => (address, false),
    };
    let done = format!("{address}: {}", if on { "on" } else { "off" });
    util::execute(controller, CoreCommand::SetOutlet { address, on }, &done, global).await
}

pub async fn fan(
    controller: &Controller,
    args: FanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let FanCommand::Set { address, speed } = args.command;
    let speed = FanSpeed::from(speed);
    let done = format!("{address}: fan {speed}");
    util::execute(controller, CoreCommand::SetFanSpeed { address, speed }, &done, global).await
}

pub async fn scene(
    controller: &Controller,
    args: SceneArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (address, on) = match args.command {
        SceneCommand::On { address } => (address, true),
        SceneCommand::Off { address } => (address, false),
    };
    let done = format!("scene {address}: {}", if on { "on" } else { "off" });
    util::execute(controller, CoreCommand::SetScene { address, on }, &done, global).await
}

pub async fn program(
    controller: &Controller,
    args: ProgramArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ProgramCommand::Run { id, action } = args.command;
    let action = ProgramAction::from(action);
    let done = format!("program {id}: {action}");
    util::execute(controller, CoreCommand::Program { id, action }, &done, global).await
}
