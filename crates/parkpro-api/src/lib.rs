//! Async client for the ParkPro transaction store.
//!
//! The store is a plain JSON-over-HTTP service that owns persistence for
//! parking sessions. This crate speaks its wire format and nothing else:
//!
//! - **[`StoreClient`]**: one method per endpoint (`/transactions`,
//!   `/history`, `/parking/occupied`), all joined onto a single base URL.
//! - **[`types`]**: tolerant wire records. Every field is optional so a
//!   malformed or partial row never fails a whole listing.
//! - **[`TransportConfig`]**: TLS and timeout knobs for the underlying
//!   `reqwest::Client`. No timeout is applied unless one is configured.
//!
//! Domain rules (revenue, validation, filtering) live in `parkpro-core`.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_BASE_URL, StoreClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{NewSessionRecord, RecordId, SessionRecord};
