// parkpro-core: session lifecycle, billing rules and per-screen state
// shared by the ParkPro CLI and TUI.

pub mod billing;
pub mod board;
pub mod config;
pub mod controller;
pub mod convert;
pub mod epoch;
pub mod error;
pub mod ledger;
pub mod model;
pub mod registration;
pub mod report;
pub mod search;

// ── Primary re-exports ──────────────────────────────────────────────
pub use board::{BoardStats, SessionBoard, SessionFilter, TimeOutModal};
pub use config::{StoreConfig, TlsVerification};
pub use controller::{Controller, SYNC_FAILED_MESSAGE, SyncWarning};
pub use epoch::{Generation, ViewEpoch};
pub use error::CoreError;
pub use ledger::{DeleteArm, HistoryLedger, LedgerSummary, SortKey, SortOrder};
pub use registration::{Field, FieldErrors, NewSession, RegistrationForm, SessionDraft, SlotOption};
pub use report::{HistoryReport, Receipt, ReportRow};

// Re-export model types at the crate root for ergonomics.
pub use model::{ParkingSession, ParkingSlot, SessionId, Timestamp, VehicleType};
