//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod alarm;
pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod scenes;
pub mod util;
pub mod variables;
pub mod watch;

use isy_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a snapshot-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Scenes(args) => scenes::handle(controller, args, global).await,
        Command::Variables(args) => variables::handle(controller, args, global).await,
        Command::Panel(args) => alarm::handle_panel(controller, args, global).await,
        Command::Zones(args) => alarm::handle_zones(controller, args, global).await,
        Command::Light(args) => control::light(controller, args, global).await,
        Command::Lock(args) => control::lock(controller, args, global).await,
        Command::Outlet(args) => control::outlet(controller, args, global).await,
        Command::Fan(args) => control::fan(controller, args, global).await,
        Command::Scene(args) => control::scene(controller, args, global).await,
        Command::Program(args) => control::program(controller, args, global).await,
        // Config, Completions and Watch are handled before dispatch
        Command::Config(_) | Command::Completions(_) | Command::Watch(_) => {
            unreachable!("handled in main")
        }
    }
}
