//! Shared configuration for the ParkPro CLI and TUI.
//!
//! TOML profiles loaded through figment (defaults, then the config file,
//! then `PARKPRO_*` environment), and translation to
//! `parkpro_core::StoreConfig`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use parkpro_api::DEFAULT_BASE_URL;
use parkpro_core::{StoreConfig, TlsVerification};

pub const DEFAULT_PROFILE: &str = "default";
const ENV_PREFIX: &str = "PARKPRO_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

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

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named store profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the active profile: the explicit one, else `default_profile`.
    pub fn active_profile_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Look up a profile. The implicit `default` profile always resolves,
    /// falling back to the built-in store URL.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == DEFAULT_PROFILE => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named transaction store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Store base URL (e.g., "http://127.0.0.1:5000/api").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Absent means no client timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: None,
            insecure: None,
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "parkpro", "parkpro").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("parkpro");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file contributes nothing.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `StoreConfig` from a profile, without CLI flag overrides.
///
/// `insecure` wins over `ca_cert`; a profile that sets neither inherits
/// `defaults.insecure`.
pub fn profile_to_store_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<StoreConfig, ConfigError> {
    let base_url = parse_base_url(&profile.base_url)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(StoreConfig {
        base_url,
        tls,
        timeout: profile.timeout.map(Duration::from_secs),
    })
}

/// Parse and sanity-check a store URL.
pub fn parse_base_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.active_profile_name(None), "default");
        assert_eq!(cfg.defaults.output, "table");

        let profile = cfg.profile("default").unwrap();
        assert_eq!(profile.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_profile = Some("lot-b".into());
        cfg.profiles.insert(
            "lot-b".into(),
            Profile {
                base_url: "https://lot-b.example/api".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.active_profile_name(None), "lot-b");
        assert_eq!(loaded.active_profile_name(Some("other")), "other");
        assert_eq!(loaded.profiles["lot-b"].timeout, Some(5));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn store_config_tls_precedence() {
        let defaults = Defaults::default();
        let mut profile = Profile {
            ca_cert: Some(PathBuf::from("/tmp/ca.pem")),
            timeout: Some(12),
            ..Profile::default()
        };

        let sc = profile_to_store_config(&profile, &defaults).unwrap();
        assert_eq!(sc.tls, TlsVerification::CustomCa(PathBuf::from("/tmp/ca.pem")));
        assert_eq!(sc.timeout, Some(Duration::from_secs(12)));

        profile.insecure = Some(true);
        let sc = profile_to_store_config(&profile, &defaults).unwrap();
        assert_eq!(sc.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(parse_base_url("ftp://lot/api").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert_eq!(
            parse_base_url("http://127.0.0.1:5000/api").unwrap().path(),
            "/api"
        );
    }
}
