//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use isy_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Plaintext passwords never leave the process.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

fn detail(cfg: &Config) -> String {
    let mut lines = vec![
        format!(
            "Default profile: {}",
            cfg.default_profile.as_deref().unwrap_or("default")
        ),
        format!("Output:          {}", cfg.defaults.output),
        format!("Timeout:         {}s", cfg.defaults.timeout),
    ];
    for (name, p) in &cfg.profiles {
        lines.push(String::new());
        lines.push(format!("[{name}]"));
        lines.push(format!("  controller:  {}", p.controller));
        lines.push(format!("  https:       {}", p.https));
        lines.push(format!("  username:    {}", p.username.as_deref().unwrap_or("-")));
        lines.push(format!("  verify_tls:  {}", p.verify_tls));
        lines.push(format!("  elk:         {} (area {})", p.elk, p.elk_area));
    }
    lines.join("\n")
}

fn prompt_password(label: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(secret)
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = isy_config::config_path();
    eprintln!("isyctl configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let controller: String = Input::new()
        .with_prompt("Controller host or URL")
        .default("192.168.1.10".into())
        .interact_text()
        .map_err(prompt_err)?;

    let https = Confirm::new()
        .with_prompt("Use HTTPS?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .default("admin".into())
        .interact_text()
        .map_err(prompt_err)?;

    let password = prompt_password("Password: ")?;

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password = if store_selection == 0 {
        isy_config::store_password(&profile_name, &password)?;
        eprintln!("   Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    let elk = Confirm::new()
        .with_prompt("Load the ELK security panel?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let profile = Profile {
        controller,
        https,
        username: Some(username),
        password,
        elk,
        ..Profile::default()
    };
    // Reject an unusable host before saving
    isy_config::controller_url(&profile)?;

    let mut cfg = isy_config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    isy_config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: isyctl devices list");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(isy_config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, detail, |c| {
                c.default_profile.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", isy_config::config_path().display());
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = isy_config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let secret = prompt_password("Password: ")?;
            isy_config::store_password(&profile_name, &secret)?;
            eprintln!("Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_passwords_are_masked() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                controller: "10.0.0.5".into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert("lab".into(), Profile::default());

        let cfg = redacted(cfg);
        assert_eq!(cfg.profiles["home"].password.as_deref(), Some(MASK));
        assert_eq!(cfg.profiles["lab"].password, None);
        assert!(!detail(&cfg).contains("hunter2"));
    }
}
