// ── Runtime connection configuration ──
//
// These types describe how to reach a controller and which optional
// subsystems to load. They carry credentials but never touch disk; the
// CLI builds a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// HTTP Basic credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Controllers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Timers driving the event-stream supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessConfig {
    /// How often the liveness check runs.
    pub check_interval: Duration,
    /// Silence longer than this forces a reconnect.
    pub stall_threshold: Duration,
    /// Keep-alive ping cadence while connected.
    pub ping_interval: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            stall_threshold: Duration::from_secs(60),
            ping_interval: Duration::from_secs(10),
        }
    }
}

/// Configuration for one controller connection.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller base URL, e.g. `http://192.168.1.20`.
    pub url: Url,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Request timeout for REST calls.
    pub timeout: Duration,
    /// Load the security-system (ELK) areas and zones.
    pub elk_enabled: bool,
    /// Security area the alarm panel represents.
    pub elk_area: u32,
    /// Surface scenes alongside devices and recompute them on member changes.
    pub scenes_in_device_list: bool,
    /// Open the real-time event stream after loading.
    pub event_stream_enabled: bool,
    pub liveness: LivenessConfig,
    /// Attempts for the initial variable-value fetch before giving up.
    pub variable_load_attempts: u32,
}

impl ControllerConfig {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self {
            url,
            credentials,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            elk_enabled: false,
            elk_area: 1,
            scenes_in_device_list: false,
            event_stream_enabled: true,
            liveness: LivenessConfig::default(),
            variable_load_attempts: 3,
        }
    }

    /// `ws(s)://host/rest/subscribe`, following the REST scheme.
    pub fn subscribe_url(&self) -> Result<Url, CoreError> {
        let mut url = self.url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| CoreError::Config {
            message: format!("cannot derive event-stream URL from {}", self.url),
        })?;
        url.set_path("/rest/subscribe");
        url.set_query(None);
        Ok(url)
    }
}
