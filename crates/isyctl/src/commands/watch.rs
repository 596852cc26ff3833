//! Live change stream: print every accepted change until Ctrl-C.

use tokio::sync::broadcast::error::RecvError;

use isy_core::{Change, Controller, Node};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Address of the changed entity; variables use `<type>:<id>`.
fn change_address(change: &Change) -> String {
    match change {
        Change::Node(node) => node.address().to_owned(),
        Change::Variable(v) => v.key(),
    }
}

fn change_line(change: &Change, color: bool) -> String {
    let now = chrono::Local::now().format("%H:%M:%S");
    match change {
        Change::Node(node) => {
            let active = match node {
                Node::Device(d) => d.current_state > 0.0,
                Node::Scene(s) => s.light_on,
                Node::AlarmZone(z) => z.is_open(),
                Node::AlarmPanel(_) => true,
            };
            format!(
                "{now}  {:<16} {:<24} {}",
                node.address(),
                node.name(),
                output::paint_state(&node.state_summary(), active, color)
            )
        }
        Change::Variable(v) => format!(
            "{now}  {:<16} {:<24} {}",
            v.key(),
            v.name,
            v.value.map_or_else(|| "-".into(), |x| x.to_string())
        ),
    }
}

fn render(change: &Change, global: &GlobalOpts, color: bool) -> Result<String, CliError> {
    match global.output {
        OutputFormat::Table => Ok(change_line(change, color)),
        OutputFormat::Plain => Ok(change_address(change)),
        // Structured formats stream as JSON lines
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_json(change, true)
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut changes = controller.subscribe_changes();
    let mut state = controller.connection_state();
    let color = output::should_color(&global.color);

    if !global.quiet {
        eprintln!("Watching {} (Ctrl-C to stop)", controller.config().url);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = state.changed(), if args.connection => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                if !global.quiet {
                    eprintln!("connection: {current}");
                }
            }

            received = changes.recv() => match received {
                Ok(change) => {
                    if !args.address.is_empty()
                        && !args.address.iter().any(|a| *a == change_address(&change))
                    {
                        continue;
                    }
                    let line = render(&change, global, color)?;
                    output::print_output(&line, global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "change stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}
