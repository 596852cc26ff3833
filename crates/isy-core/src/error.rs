// ── Core error types ──
//
// User-facing errors from isy-core. Consumers never see HTTP status codes
// or XML parse failures directly; the `From<isy_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Controller request timed out")]
    Timeout,

    // ── Startup ──────────────────────────────────────────────────────
    /// A load phase failed; the controller cannot be used.
    #[error("Initialization failed while loading {phase}: {reason}")]
    InitializationFailed { phase: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {address}")]
    DeviceNotFound { address: String },

    #[error("Scene not found: {address}")]
    SceneNotFound { address: String },

    #[error("Variable not found: type {kind} id {id}")]
    VariableNotFound { kind: String, id: String },

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Security system support is not enabled")]
    AlarmPanelDisabled,

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Command {command} is not supported by {address} ({kind})")]
    UnsupportedCommand {
        address: String,
        kind: String,
        command: String,
    },

    #[error("Controller rejected the request: HTTP {status}")]
    Rejected { status: u16 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap any error as a failure of the named load phase.
    pub(crate) fn phase(phase: &str, err: impl std::fmt::Display) -> Self {
        Self::InitializationFailed {
            phase: phase.to_owned(),
            reason: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<isy_api::Error> for CoreError {
    fn from(err: isy_api::Error) -> Self {
        match err {
            isy_api::Error::Authentication { path } => CoreError::AuthenticationFailed {
                message: format!("controller rejected credentials for {path}"),
            },
            isy_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            isy_api::Error::Status { status: 404, path } => CoreError::NotFound { path },
            isy_api::Error::Status { status, .. } => CoreError::Rejected { status },
            isy_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            isy_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            isy_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            isy_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
            isy_api::Error::Xml { message, body: _ } => {
                CoreError::Internal(format!("XML parse error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_map_to_domain_variants() {
        let not_found: CoreError = isy_api::Error::Status {
            status: 404,
            path: "nodes/x".into(),
        }
        .into();
        assert!(matches!(not_found, CoreError::NotFound { .. }));

        let rejected: CoreError = isy_api::Error::Status {
            status: 500,
            path: "nodes".into(),
        }
        .into();
        assert!(matches!(rejected, CoreError::Rejected { status: 500 }));

        let auth: CoreError = isy_api::Error::Authentication {
            path: "nodes".into(),
        }
        .into();
        assert!(matches!(auth, CoreError::AuthenticationFailed { .. }));
    }
}
