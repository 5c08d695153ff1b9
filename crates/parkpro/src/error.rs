//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use std::fmt::Write as _;

use miette::Diagnostic;
use thiserror::Error;

use parkpro_config::ConfigError;
use parkpro_core::{CoreError, FieldErrors};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the transaction store at {url}")]
    #[diagnostic(
        code(parkpro::connection_failed),
        help(
            "Check that the store is running and accessible.\n\
             Reason: {reason}\n\
             Override the address with --store-url or PARKPRO_STORE_URL."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(parkpro::timeout),
        help("Increase the limit with --timeout or check the store's responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────
    #[error("Session '{identifier}' not found")]
    #[diagnostic(
        code(parkpro::not_found),
        help("Run: parkpro {list_command} to see available sessions")
    )]
    NotFound {
        identifier: String,
        list_command: String,
    },

    #[error("The store rejected the request: {message}")]
    #[diagnostic(code(parkpro::conflict))]
    Conflict { message: String },

    // ── Store ────────────────────────────────────────────────────────
    #[error("Store error{}: {message}", .status.map_or_else(String::new, |s| format!(" ({s})")))]
    #[diagnostic(code(parkpro::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(parkpro::validation))]
    Validation { field: String, reason: String },

    #[error("{count} field(s) need attention")]
    #[diagnostic(code(parkpro::invalid_session), help("{details}"))]
    InvalidFields { count: usize, details: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(parkpro::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: parkpro config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(parkpro::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(parkpro::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(parkpro::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidFields { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// One `Label: message` line per failing field.
    pub fn from_field_errors(errors: &FieldErrors) -> Self {
        let mut details = String::new();
        for (field, message) in errors.iter() {
            let _ = writeln!(details, "{}: {message}", field.label());
        }
        Self::InvalidFields {
            count: errors.len(),
            details: details.trim_end().to_owned(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotFound { identifier } => Self::NotFound {
                identifier,
                list_command: "sessions list".into(),
            },
            CoreError::Validation { errors } => Self::from_field_errors(&errors),
            CoreError::Api {
                message,
                status: Some(409),
            } => Self::Conflict { message },
            CoreError::Api { message, status } => Self::ApiError { status, message },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
