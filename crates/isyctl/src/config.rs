//! Profile resolution for the CLI: the config file's profile with global
//! flags layered on top, translated to `isy_core::ControllerConfig`.

use isy_config::{Config, Profile};
use isy_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Find the active profile and apply flag overrides.
///
/// A profile named explicitly with `--profile` must exist. Without one,
/// a missing profile is fine as long as `--controller` names a host.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            });
        }
        None if global.controller.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: isy_config::config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);
    Ok((name, profile))
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.https {
        profile.https = true;
    }
    if global.insecure {
        profile.verify_tls = false;
        profile.ca_cert = None;
    }
    if global.elk {
        profile.elk = true;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

/// Comma-separated profile names for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build the `ControllerConfig` for a controller-bound command.
pub fn controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = isy_config::load_config_or_default();
    let (name, profile) = resolve_profile(global, &cfg)?;
    Ok(isy_config::profile_to_controller_config(&profile, &name)?)
}
