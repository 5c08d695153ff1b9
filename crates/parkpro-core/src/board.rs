// ── Active session board ──
//
// Sessions fetched from `/transactions`, a filter tab, a search term and
// the time-out dialog. Everything except `refresh` and
// `confirm_time_out` is computed locally.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use tracing::info;

use crate::billing;
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{ParkingSession, SessionId, Timestamp, VehicleType};
use crate::registration::{Field, FieldErrors};
use crate::search;

// ── Filter ──────────────────────────────────────────────────────────

/// Which sessions the board shows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SessionFilter {
    #[default]
    All,
    /// Open sessions.
    Parked,
    /// Sessions with an exit time.
    Completed,
}

impl SessionFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Transactions",
            Self::Parked => "Currently Parked",
            Self::Completed => "Completed",
        }
    }

    pub fn admits(self, session: &ParkingSession) -> bool {
        match self {
            Self::All => true,
            Self::Parked => session.is_open(),
            Self::Completed => session.is_closed(),
        }
    }
}

// ── Stats ───────────────────────────────────────────────────────────

/// Headline counts for the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub parked: usize,
    pub completed: usize,
    /// Sessions per vehicle type; untyped sessions are not counted.
    pub by_vehicle_type: BTreeMap<VehicleType, usize>,
    /// Sum over closed sessions only.
    pub total_revenue: u64,
}

impl BoardStats {
    pub fn count(&self, vehicle_type: VehicleType) -> usize {
        self.by_vehicle_type.get(&vehicle_type).copied().unwrap_or(0)
    }
}

// ── Time-out dialog ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeOutModal {
    #[default]
    Closed,
    Open {
        session: Box<ParkingSession>,
        /// Exit time as typed. Empty means "now".
        exit_input: String,
    },
}

impl TimeOutModal {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Resolve the dialog's exit input: blank means `now`, anything else must
/// parse.
pub fn resolve_exit_input(input: &str, now: NaiveDateTime) -> Result<Timestamp, FieldErrors> {
    match Timestamp::parse(input.trim()) {
        None => Ok(Timestamp::from_datetime(now)),
        Some(ts) if ts.is_valid() => Ok(ts),
        Some(_) => {
            let mut errors = FieldErrors::default();
            errors.insert(Field::ExitTime, "Exit time must be a valid date and time.");
            Err(errors)
        }
    }
}

// ── Board ───────────────────────────────────────────────────────────

/// State behind the active-sessions screen.
#[derive(Debug, Clone, Default)]
pub struct SessionBoard {
    sessions: Vec<ParkingSession>,
    filter: SessionFilter,
    search: String,
    modal: TimeOutModal,
    updating: bool,
}

impl SessionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[ParkingSession] {
        &self.sessions
    }

    pub fn set_sessions(&mut self, sessions: Vec<ParkingSession>) {
        self.sessions = sessions;
    }

    pub fn filter(&self) -> SessionFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: SessionFilter) {
        self.filter = filter;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn modal(&self) -> &TimeOutModal {
        &self.modal
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    // ── Derived views ───────────────────────────────────────────────

    pub fn stats(&self) -> BoardStats {
        let mut stats = BoardStats {
            total: self.sessions.len(),
            ..BoardStats::default()
        };
        for session in &self.sessions {
            if session.is_open() {
                stats.parked += 1;
            } else {
                stats.completed += 1;
                stats.total_revenue += session.revenue();
            }
            if let Some(vt) = session.vehicle_type {
                *stats.by_vehicle_type.entry(vt).or_default() += 1;
            }
        }
        stats
    }

    /// Sessions passing both the filter and the search, in fetch order.
    pub fn visible(&self) -> Vec<&ParkingSession> {
        self.sessions
            .iter()
            .filter(|s| self.filter.admits(s) && search::matches(s, &self.search))
            .collect()
    }

    /// `Showing X of Y transactions`
    pub fn showing_summary(&self) -> String {
        format!(
            "Showing {} of {} transactions",
            self.visible().len(),
            self.sessions.len()
        )
    }

    /// Placeholder text when [`visible`](Self::visible) is empty.
    pub fn empty_message(&self) -> &'static str {
        if !self.search.trim().is_empty() {
            return "No results match your search.";
        }
        match self.filter {
            SessionFilter::All => "No parking transactions recorded yet.",
            SessionFilter::Parked => "No vehicles currently parked.",
            SessionFilter::Completed => "No completed transactions yet.",
        }
    }

    // ── Time-out dialog ─────────────────────────────────────────────

    /// Open the dialog for a session, prefilled with its exit time.
    ///
    /// Returns `false` if no session has that id.
    pub fn open_time_out(&mut self, id: &SessionId) -> bool {
        let Some(session) = self.sessions.iter().find(|s| s.has_id(id)) else {
            return false;
        };
        let exit_input = session
            .exit_time
            .as_ref()
            .map(|t| t.raw().to_owned())
            .unwrap_or_default();
        self.modal = TimeOutModal::Open {
            session: Box::new(session.clone()),
            exit_input,
        };
        true
    }

    pub fn set_exit_input(&mut self, text: impl Into<String>) {
        if let TimeOutModal::Open { exit_input, .. } = &mut self.modal {
            *exit_input = text.into();
        }
    }

    /// Charge if the session were closed at the typed time, or at `now`
    /// when the input is blank or unparseable. `None` with the dialog
    /// closed.
    pub fn preview_revenue(&self, now: NaiveDateTime) -> Option<u64> {
        let TimeOutModal::Open {
            session,
            exit_input,
        } = &self.modal
        else {
            return None;
        };
        let exit = Timestamp::parse(exit_input)
            .and_then(|t| t.datetime())
            .unwrap_or(now);
        Some(billing::revenue(
            session.entry_time.as_ref().and_then(Timestamp::datetime),
            Some(exit),
        ))
    }

    pub fn cancel_time_out(&mut self) {
        self.modal = TimeOutModal::Closed;
    }

    /// Resolve the dialog into the request to send and mark the board as
    /// updating. `Ok(None)` when the dialog is closed or an update is
    /// already running.
    pub fn begin_time_out(
        &mut self,
        now: NaiveDateTime,
    ) -> Result<Option<(ParkingSession, Timestamp)>, CoreError> {
        if self.updating {
            return Ok(None);
        }
        let TimeOutModal::Open {
            session,
            exit_input,
        } = &self.modal
        else {
            return Ok(None);
        };
        let exit =
            resolve_exit_input(exit_input, now).map_err(|errors| CoreError::Validation { errors })?;
        self.updating = true;
        Ok(Some((session.as_ref().clone(), exit)))
    }

    /// Apply the store's answer. Success closes the dialog; failure leaves
    /// it open with the typed input intact.
    pub fn finish_time_out(&mut self, result: &Result<ParkingSession, CoreError>) {
        self.updating = false;
        if result.is_ok() {
            self.modal = TimeOutModal::Closed;
        }
    }

    /// Close the session in the dialog, then re-fetch the board.
    pub async fn confirm_time_out(
        &mut self,
        controller: &Controller,
        now: NaiveDateTime,
    ) -> Result<(), CoreError> {
        let Some((session, exit)) = self.begin_time_out(now)? else {
            return Ok(());
        };
        let result = controller.time_out(&session, &exit).await;
        self.finish_time_out(&result);
        result?;
        self.refresh(controller).await
    }

    /// Re-fetch all sessions.
    pub async fn refresh(&mut self, controller: &Controller) -> Result<(), CoreError> {
        let sessions = controller.list_sessions().await?;
        info!(count = sessions.len(), "board refreshed");
        self.sessions = sessions;
        Ok(())
    }
}
