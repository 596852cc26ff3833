mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::io::IsTerminal;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use isy_core::Controller;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "isyctl", &mut std::io::stdout());
            Ok(())
        }

        Command::Watch(args) => {
            let controller_config = config::controller_config(&cli.global)?;
            let controller = Controller::new(controller_config)?;
            load(&controller, &cli.global).await?;
            let result = commands::watch::handle(&controller, &args, &cli.global).await;
            controller.shutdown().await;
            result
        }

        // Everything else works on one snapshot without the event stream
        cmd => {
            let mut controller_config = config::controller_config(&cli.global)?;
            controller_config.event_stream_enabled = false;
            let controller = Controller::new(controller_config)?;
            load(&controller, &cli.global).await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.shutdown().await;
            result
        }
    }
}

/// Initialize the controller behind a spinner on interactive terminals.
async fn load(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = (!global.quiet && std::io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading {}", controller.config().url));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = controller.initialize().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    Ok(result?)
}
