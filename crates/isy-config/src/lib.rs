//! Configuration for isyctl.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `isy_core::ControllerConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use isy_core::{ControllerConfig, Credentials, TlsVerification};

/// Keyring service name.
const KEYRING_SERVICE: &str = "isyctl";
/// Environment prefix for overrides.
pub const ENV_PREFIX: &str = "ISY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to the configured default name.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned()))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_elk_area() -> u32 {
    1
}

/// A named controller profile.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// Controller host (`10.0.0.5`, `isy.local:8080`) or full URL.
    pub controller: String,

    /// Use HTTPS/WSS when `controller` is a bare host.
    #[serde(default)]
    pub https: bool,

    pub username: Option<String>,

    /// Plaintext password; prefer the keyring or `ISY_PASSWORD`.
    pub password: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Verify certificates against the system store instead of accepting
    /// the controller's self-signed one.
    #[serde(default)]
    pub verify_tls: bool,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Load the security-system panel and zones.
    #[serde(default)]
    pub elk: bool,

    #[serde(default = "default_elk_area")]
    pub elk_area: u32,

    /// List scenes alongside devices.
    #[serde(default)]
    pub scenes_in_device_list: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            controller: String::new(),
            https: false,
            username: None,
            password: None,
            ca_cert: None,
            verify_tls: false,
            timeout: None,
            elk: false,
            elk_area: default_elk_area(),
            scenes_in_device_list: false,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "isyctl", "isyctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("isyctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?
        .set_password(password)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Resolve username + password: `ISY_PASSWORD` env, then the keyring,
/// then the plaintext profile field.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("ISY_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = std::env::var("ISY_PASSWORD")
        .ok()
        .or_else(|| {
            keyring_entry(profile_name)
                .ok()
                .and_then(|entry| entry.get_password().ok())
        })
        .or_else(|| profile.password.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    Ok(Credentials {
        username,
        password: SecretString::from(password),
    })
}

// ── Profile → ControllerConfig ──────────────────────────────────────

/// Base URL for a profile. Bare hosts get `http://` or `https://` from
/// the `https` flag.
pub fn controller_url(profile: &Profile) -> Result<Url, ConfigError> {
    let raw = profile.controller.trim();
    if raw.is_empty() {
        return Err(ConfigError::Validation {
            field: "controller".into(),
            reason: "empty".into(),
        });
    }
    let full = if raw.contains("://") {
        raw.to_owned()
    } else {
        let scheme = if profile.https { "https" } else { "http" };
        format!("{scheme}://{raw}")
    };
    Url::parse(&full).map_err(|e| ConfigError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL {full}: {e}"),
    })
}

pub fn tls_verification(profile: &Profile) -> TlsVerification {
    if let Some(ref ca) = profile.ca_cert {
        TlsVerification::CustomCa(ca.clone())
    } else if profile.verify_tls {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    }
}

/// Build a `ControllerConfig` from a profile with already-resolved
/// credentials.
pub fn build_controller_config(
    profile: &Profile,
    credentials: Credentials,
) -> Result<ControllerConfig, ConfigError> {
    let mut cfg = ControllerConfig::new(controller_url(profile)?, credentials);
    cfg.tls = tls_verification(profile);
    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    cfg.elk_enabled = profile.elk;
    cfg.elk_area = profile.elk_area;
    cfg.scenes_in_device_list = profile.scenes_in_device_list;
    Ok(cfg)
}

/// Build a `ControllerConfig` from a profile, resolving credentials
/// through the usual chain.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    build_controller_config(profile, credentials)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(controller: &str) -> Profile {
        Profile {
            controller: controller.into(),
            elk_area: 1,
            ..Profile::default()
        }
    }

    fn creds() -> Credentials {
        Credentials {
            username: "admin".into(),
            password: SecretString::from("secret".to_string()),
        }
    }

    #[test]
    fn bare_host_follows_https_flag() {
        let mut p = profile("10.0.0.5");
        assert_eq!(controller_url(&p).unwrap().as_str(), "http://10.0.0.5/");
        p.https = true;
        assert_eq!(controller_url(&p).unwrap().as_str(), "https://10.0.0.5/");
    }

    #[test]
    fn full_url_is_kept() {
        let p = profile("https://isy.local:8443");
        assert_eq!(controller_url(&p).unwrap().port(), Some(8443));
        assert!(controller_url(&profile("  ")).is_err());
    }

    #[test]
    fn tls_mode_selection() {
        let mut p = profile("10.0.0.5");
        assert_eq!(tls_verification(&p), TlsVerification::DangerAcceptInvalid);
        p.verify_tls = true;
        assert_eq!(tls_verification(&p), TlsVerification::SystemDefaults);
        p.ca_cert = Some("/etc/isy/ca.pem".into());
        assert_eq!(
            tls_verification(&p),
            TlsVerification::CustomCa("/etc/isy/ca.pem".into())
        );
    }

    #[test]
    fn profile_fields_reach_controller_config() {
        let mut p = profile("10.0.0.5");
        p.elk = true;
        p.elk_area = 2;
        p.scenes_in_device_list = true;
        p.timeout = Some(5);
        let cfg = build_controller_config(&p, creds()).unwrap();
        assert!(cfg.elk_enabled);
        assert_eq!(cfg.elk_area, 2);
        assert!(cfg.scenes_in_device_list);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.credentials.username, "admin");
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut home = profile("10.0.0.5");
        home.username = Some("admin".into());
        home.elk = true;
        cfg.profiles.insert("home".into(), home.clone());
        cfg.default_profile = Some("home".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, p) = loaded.profile(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(p, &home);
        assert!(matches!(
            loaded.profile(Some("cabin")),
            Err(ConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }
}
