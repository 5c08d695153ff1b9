//! CLI configuration: a thin wrapper around `parkpro_config` that applies
//! `GlobalOpts` overrides (--store-url, --insecure, --timeout).

use std::time::Duration;

use parkpro_core::{StoreConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use parkpro_config::{
    Config, DEFAULT_PROFILE, Profile, config_path, load_config_or_default, parse_base_url,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config
        .active_profile_name(global.profile.as_deref())
        .to_owned()
}

/// Build the `StoreConfig` for this invocation.
///
/// Flag (or its env var) beats profile, profile beats built-in default.
pub fn resolve_store_config(global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profile(&name) {
        Ok(profile) => profile,
        // A URL on the command line makes a missing profile irrelevant.
        Err(_) if global.store_url.is_some() => Profile::default(),
        Err(_) => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
    };

    let mut store = parkpro_config::profile_to_store_config(&profile, &cfg.defaults)?;

    if let Some(ref raw) = global.store_url {
        store.base_url = parse_base_url(raw)?;
    }
    if global.insecure {
        store.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        store.timeout = Some(Duration::from_secs(secs));
    }

    tracing::debug!(profile = %name, base_url = %store.base_url, "resolved store config");
    Ok(store)
}
