// ── Core error types ──
//
// User-facing errors from parkpro-core. Front ends never see HTTP status
// codes or JSON parse failures directly; the `From<parkpro_api::Error>`
// impl translates transport-layer errors into these variants.

use thiserror::Error;

use crate::registration::FieldErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the transaction store at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the transaction store timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Transaction not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Validation failed: {errors}")]
    Validation { errors: FieldErrors },

    // ── Store errors (wrapped, not exposed raw) ──────────────────────
    #[error("Store error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The store could not be reached at all, as opposed to answering
    /// with an error.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<parkpro_api::Error> for CoreError {
    fn from(err: parkpro_api::Error) -> Self {
        match err {
            parkpro_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            parkpro_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            parkpro_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            parkpro_api::Error::Api {
                status: 404,
                message,
            } => CoreError::NotFound {
                identifier: message,
            },
            parkpro_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            parkpro_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_404_is_not_found() {
        let err = CoreError::from(parkpro_api::Error::Api {
            status: 404,
            message: "no such transaction".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn store_500_keeps_status() {
        let err = CoreError::from(parkpro_api::Error::Api {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
        assert_eq!(err.to_string(), "Store error: boom");
        assert!(!err.is_unreachable());
    }

    #[test]
    fn timeout_counts_as_unreachable() {
        assert!(CoreError::Timeout.is_unreachable());
    }
}
