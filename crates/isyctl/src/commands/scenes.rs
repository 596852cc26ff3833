//! Scene command handlers.

use tabled::Tabled;

use isy_core::{Controller, SceneView};

use crate::cli::{GlobalOpts, ScenesArgs, ScenesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SceneRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Members")]
    members: usize,
    #[tabled(rename = "State")]
    state: String,
}

impl SceneRow {
    fn new(s: &SceneView, color: bool) -> Self {
        Self {
            address: s.address.clone(),
            name: s.name.clone(),
            members: s.members.len(),
            state: output::paint_state(&state(s), s.light_on, color),
        }
    }
}

fn state(s: &SceneView) -> String {
    if s.light_on {
        format!("On {:.0}%", s.dim_level)
    } else {
        "Off".into()
    }
}

pub(super) fn detail(s: &SceneView) -> String {
    let mut lines = vec![
        format!("Address:    {}", s.address),
        format!("Name:       {}", s.name),
        format!("State:      {}", state(s)),
        format!("Changed:    {}", s.last_changed.format("%Y-%m-%d %H:%M:%S")),
        "Members:".to_owned(),
    ];
    lines.extend(s.members.iter().map(|m| format!("  {m}")));
    lines.join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: ScenesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ScenesCommand::List => {
            let scenes = controller.scenes().await;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &scenes,
                |s| SceneRow::new(s, color),
                |s| s.address.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScenesCommand::Get { address } => {
            let scene = controller
                .scene(&address)
                .await
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "scene".into(),
                    identifier: address,
                    list_command: "scenes list".into(),
                })?;
            let out = output::render_single(&global.output, &scene, detail, |s| {
                s.address.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
