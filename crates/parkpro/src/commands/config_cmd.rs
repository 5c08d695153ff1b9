//! Config subcommand handlers.

use std::collections::HashMap;
use std::str::FromStr;

use dialoguer::{Confirm, Input};

use parkpro_config::Defaults;
use parkpro_core::billing::RATE_HINT;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, DEFAULT_PROFILE, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    let path = config::save_config(cfg)?;
    tracing::debug!(path = %path.display(), "config saved");
    Ok(())
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

fn parse_flag<T: FromStr>(field: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: hint.into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("ParkPro configuration wizard");
            eprintln!("   Config path: {}", config_path.display());
            eprintln!("   Billing: {RATE_HINT}\n");

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(DEFAULT_PROFILE.into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("Transaction store URL")
                .default(Profile::default().base_url)
                .validate_with(|s: &String| {
                    config::parse_base_url(s)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let timeout: String = Input::new()
                .with_prompt("Request timeout in seconds (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let timeout = match timeout.trim() {
                "" => None,
                t => Some(parse_flag("timeout", t, "must be a number (seconds)")?),
            };

            let insecure = base_url.starts_with("https")
                && Confirm::new()
                    .with_prompt("Accept self-signed TLS certificates?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?;

            let profile = Profile {
                base_url,
                timeout,
                insecure: insecure.then_some(true),
                ca_cert: None,
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: parkpro slots");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out =
                output::render_single(global.output, &cfg, format_config, |_| "config".into())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "base_url" | "base-url" | "store_url" | "store-url" => {
                    config::parse_base_url(&value)?;
                    profile.base_url = value;
                }
                "insecure" => {
                    let insecure = parse_flag("insecure", &value, "must be 'true' or 'false'")?;
                    profile.insecure = Some(insecure);
                }
                "timeout" => {
                    let secs = parse_flag("timeout", &value, "must be a number (seconds)")?;
                    profile.timeout = Some(secs);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: base_url, insecure, \
                             timeout, ca_cert"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: parkpro config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name.as_str() == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if name != DEFAULT_PROFILE && !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
