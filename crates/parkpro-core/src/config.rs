// ── Runtime store configuration ──
//
// Describes *where* the transaction store lives and how to reach it.
// Front ends build a `StoreConfig` from their own config layer and hand it
// in; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Connection settings for a single transaction store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: Url,
    pub tls: TlsVerification,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl StoreConfig {
    /// Strict TLS, no timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: None,
        }
    }
}
