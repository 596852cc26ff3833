//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use isy_config::ConfigError;
use isy_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(isyctl::connection_failed),
        help(
            "Check that the controller is reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(isyctl::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(isyctl::auth_failed),
        help(
            "The controller rejected the username or password.\n\
             Run: isyctl config set-password"
        )
    )]
    AuthFailed,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(isyctl::no_credentials),
        help(
            "Configure credentials with: isyctl config init\n\
             Or set ISY_USERNAME and ISY_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(isyctl::not_found),
        help("Run: isyctl {list_command} to see what the controller has")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{address} is a {kind} and does not accept '{command}'")]
    #[diagnostic(code(isyctl::unsupported_command))]
    UnsupportedCommand {
        address: String,
        kind: String,
        command: String,
    },

    #[error("Security panel support is not enabled")]
    #[diagnostic(
        code(isyctl::panel_disabled),
        help("Pass --elk or set `elk = true` in the profile.")
    )]
    PanelDisabled,

    #[error("The controller did not accept the command")]
    #[diagnostic(code(isyctl::command_failed), help("Run with -v for details."))]
    CommandFailed,

    // ── Controller ───────────────────────────────────────────────────
    #[error("Failed to load {phase} from the controller")]
    #[diagnostic(code(isyctl::initialization), help("{reason}"))]
    Initialization { phase: String, reason: String },

    #[error("Controller error: {message}")]
    #[diagnostic(code(isyctl::controller))]
    Controller { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(isyctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(isyctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: isyctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(isyctl::no_config),
        help(
            "Create a profile with: isyctl config init\n\
             Expected at: {path}\n\
             Or pass --controller."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(isyctl::config))]
    Config(String),

    // ── Output / IO ──────────────────────────────────────────────────
    #[error("Failed to render output: {0}")]
    #[diagnostic(code(isyctl::output))]
    Output(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::UnsupportedCommand { .. } | Self::PanelDisabled => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed,
            CoreError::ControllerDisconnected => Self::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "the controller has not been loaded".into(),
            },
            CoreError::Timeout => Self::Timeout,
            CoreError::InitializationFailed { phase, reason } => {
                Self::Initialization { phase, reason }
            }
            CoreError::DeviceNotFound { address } => Self::NotFound {
                resource_type: "device".into(),
                identifier: address,
                list_command: "devices list".into(),
            },
            CoreError::SceneNotFound { address } => Self::NotFound {
                resource_type: "scene".into(),
                identifier: address,
                list_command: "scenes list".into(),
            },
            CoreError::VariableNotFound { kind, id } => Self::NotFound {
                resource_type: format!("{kind} variable"),
                identifier: id,
                list_command: "variables list".into(),
            },
            CoreError::NotFound { path } => Self::NotFound {
                resource_type: "resource".into(),
                identifier: path,
                list_command: "devices list".into(),
            },
            CoreError::AlarmPanelDisabled => Self::PanelDisabled,
            CoreError::UnsupportedCommand {
                address,
                kind,
                command,
            } => Self::UnsupportedCommand {
                address,
                kind,
                command,
            },
            CoreError::Rejected { status } => Self::Controller {
                message: format!("request rejected with HTTP {status}"),
            },
            CoreError::Config { message } => Self::Config(message),
            CoreError::Internal(message) => Self::Controller { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile(name) => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::AuthenticationFailed { message: String::new() }, exit_code::AUTH),
            (CoreError::Timeout, exit_code::TIMEOUT),
            (
                CoreError::DeviceNotFound {
                    address: "1 2 3 1".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (CoreError::AlarmPanelDisabled, exit_code::USAGE),
            (CoreError::ControllerDisconnected, exit_code::CONNECTION),
            (CoreError::Internal("x".into()), exit_code::GENERAL),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn missing_credentials_are_an_auth_failure() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "home".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
