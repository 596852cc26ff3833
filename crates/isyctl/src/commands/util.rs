//! Shared helpers for command handlers.

use isy_core::{Command as CoreCommand, Controller};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Run a core command and report the outcome on stderr.
///
/// A command the controller refused becomes `CommandFailed`.
pub async fn execute(
    controller: &Controller,
    command: CoreCommand,
    done: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    tracing::debug!(?command, "executing");
    if !controller.execute(command).await? {
        return Err(CliError::CommandFailed);
    }
    if !global.quiet {
        eprintln!("{done}");
    }
    Ok(())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// `-` for absent optional values in detail views.
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_render_as_dash() {
        assert_eq!(or_dash(None::<f64>), "-");
        assert_eq!(or_dash(Some(4)), "4");
    }
}
