//! Everything that can happen in the dashboard, as one enum.
//!
//! Key handlers and background requests both produce [`Action`]s; the app
//! loop drains them in order and hands each to the screens.

use std::collections::BTreeSet;
use std::fmt;

use parkpro_core::{CoreError, Generation, ParkingSession, ParkingSlot, SessionId, SyncWarning};

use crate::screen::ScreenId;

#[derive(Debug)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Search (typed into the status bar, applied by the active screen) ──
    OpenSearch,
    CloseSearch,
    SearchInput(String),

    // ── Confirmation dialog ──
    RequestConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    Confirmed(ConfirmAction),
    Cancelled(ConfirmAction),

    // ── Store responses ──
    /// Occupied slots for the registration form, tagged with the
    /// generation that asked for them.
    SlotsLoaded {
        generation: Generation,
        result: Result<BTreeSet<ParkingSlot>, CoreError>,
    },
    SessionsLoaded {
        generation: Generation,
        result: Result<Vec<ParkingSession>, CoreError>,
    },
    HistoryLoaded {
        generation: Generation,
        result: Result<Vec<ParkingSession>, CoreError>,
    },
    /// A registration finished. Every screen sees it so dependent views
    /// can re-fetch.
    Registered(Result<ParkingSession, CoreError>),
    /// A time-out finished.
    TimedOut(Result<ParkingSession, CoreError>),
    /// A detached delete failed after the row was already removed.
    SyncFailed(SyncWarning),

    Notify(Notification),
}

/// An operation that waits for `y`/`n` before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTransaction { id: SessionId, plate: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteTransaction { id, plate } => {
                write!(f, "Delete transaction {id} ({plate})?")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Toast shown in the bottom-right corner for a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error)
    }
}
