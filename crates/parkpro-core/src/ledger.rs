// ── History ledger ──
//
// Past sessions from `/history` with search, sort, a two-step delete and
// document export. Deletes are optimistic: the row disappears at once and
// the store is told in the background.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use tokio::task::JoinHandle;
use tracing::info;

use crate::controller::{Controller, SyncWarning};
use crate::error::CoreError;
use crate::model::{ParkingSession, SessionId, Timestamp};
use crate::report::{HistoryReport, Receipt, ReportRow};
use crate::search;

const MS_PER_HOUR: f64 = 3_600_000.0;

// ── Sorting ─────────────────────────────────────────────────────────

/// Column the ledger is ordered by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortKey {
    #[default]
    ExitTime,
    EntryTime,
    #[strum(to_string = "owner", serialize = "owner-name")]
    OwnerName,
    #[strum(to_string = "vehicle", serialize = "vehicle-name")]
    VehicleName,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::ExitTime => "Exit Time",
            Self::EntryTime => "Entry Time",
            Self::OwnerName => "Owner",
            Self::VehicleName => "Vehicle",
        }
    }

    /// Next key in the cycle, for a single-key toggle.
    pub fn next(self) -> Self {
        match self {
            Self::ExitTime => Self::EntryTime,
            Self::EntryTime => Self::OwnerName,
            Self::OwnerName => Self::VehicleName,
            Self::VehicleName => Self::ExitTime,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display)]
pub enum SortOrder {
    #[strum(serialize = "↑ Asc")]
    Asc,
    #[default]
    #[strum(serialize = "↓ Desc")]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Comparable projection of one sort column. `None` sorts first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Time(Option<NaiveDateTime>),
    Text(Option<String>),
}

fn sort_value(session: &ParkingSession, key: SortKey) -> SortValue {
    let time = |t: Option<&Timestamp>| SortValue::Time(t.and_then(Timestamp::datetime));
    let text = |s: &str| {
        let s = s.trim();
        SortValue::Text((!s.is_empty()).then(|| s.to_lowercase()))
    };
    match key {
        SortKey::ExitTime => time(session.exit_time.as_ref()),
        SortKey::EntryTime => time(session.entry_time.as_ref()),
        SortKey::OwnerName => text(&session.owner_name),
        SortKey::VehicleName => text(&session.vehicle_name),
    }
}

/// Order two sessions by `key`. Missing values come before present ones
/// in ascending order.
pub fn compare(a: &ParkingSession, b: &ParkingSession, key: SortKey, order: SortOrder) -> Ordering {
    let ordering = sort_value(a, key).cmp(&sort_value(b, key));
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

// ── Delete confirmation ─────────────────────────────────────────────

/// At most one row is armed for deletion at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteArm {
    #[default]
    Idle,
    Armed(SessionId),
}

// ── Summary ─────────────────────────────────────────────────────────

/// Summary cards over the full history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub sessions: usize,
    pub total_revenue: u64,
    /// Mean length of sessions with a valid interval, one decimal.
    pub average_hours: f64,
}

// ── Ledger ──────────────────────────────────────────────────────────

/// State behind the history screen.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    rows: Vec<ParkingSession>,
    search: String,
    sort_key: SortKey,
    sort_order: SortOrder,
    delete_arm: DeleteArm,
    last_warning: Option<SyncWarning>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ParkingSession] {
        &self.rows
    }

    pub fn set_rows(&mut self, rows: Vec<ParkingSession>) {
        self.rows = rows;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    pub fn delete_arm(&self) -> &DeleteArm {
        &self.delete_arm
    }

    pub fn last_warning(&self) -> Option<&SyncWarning> {
        self.last_warning.as_ref()
    }

    /// Record a background sync failure for display.
    pub fn set_warning(&mut self, warning: SyncWarning) {
        self.last_warning = Some(warning);
    }

    pub fn dismiss_warning(&mut self) {
        self.last_warning = None;
    }

    // ── Derived views ───────────────────────────────────────────────

    /// Searched then sorted. The sort is stable: rows with equal keys keep
    /// their fetch order.
    pub fn visible(&self) -> Vec<&ParkingSession> {
        let mut rows: Vec<&ParkingSession> = self
            .rows
            .iter()
            .filter(|s| search::matches(s, &self.search))
            .collect();
        rows.sort_by(|a, b| compare(a, b, self.sort_key, self.sort_order));
        rows
    }

    pub fn empty_message(&self) -> &'static str {
        if self.search.trim().is_empty() {
            "No completed transactions recorded yet."
        } else {
            "No transactions match your search criteria."
        }
    }

    pub fn summary(&self) -> LedgerSummary {
        let total_revenue = self.rows.iter().map(ParkingSession::revenue).sum();

        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let hours: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|s| {
                let entry = s.entry_time.as_ref()?.datetime()?;
                let exit = s.exit_time.as_ref()?.datetime()?;
                let ms = (exit - entry).num_milliseconds();
                (ms >= 0).then(|| ms as f64 / MS_PER_HOUR)
            })
            .collect();

        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let average_hours = if hours.is_empty() {
            0.0
        } else {
            let mean = hours.iter().sum::<f64>() / hours.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        LedgerSummary {
            sessions: self.rows.len(),
            total_revenue,
            average_hours,
        }
    }

    // ── Delete ──────────────────────────────────────────────────────

    /// Arm a row, replacing any previously armed one.
    pub fn arm_delete(&mut self, id: SessionId) {
        self.delete_arm = DeleteArm::Armed(id);
    }

    pub fn disarm_delete(&mut self) {
        self.delete_arm = DeleteArm::Idle;
    }

    pub fn is_armed(&self, id: &SessionId) -> bool {
        matches!(&self.delete_arm, DeleteArm::Armed(armed) if armed == id)
    }

    /// Remove an armed row locally and tell the store in the background.
    ///
    /// Does nothing and returns `None` unless `id` is the armed row. A
    /// store failure arrives later on [`Controller::warnings`], never here.
    pub fn confirm_delete(
        &mut self,
        id: &SessionId,
        controller: &Controller,
    ) -> Option<JoinHandle<()>> {
        if !self.is_armed(id) {
            return None;
        }
        let before = self.rows.len();
        self.rows.retain(|s| !s.has_id(id));
        self.delete_arm = DeleteArm::Idle;
        info!(%id, removed = before - self.rows.len(), "history row removed");
        Some(controller.delete_detached(id.clone()))
    }

    /// Re-fetch the history.
    pub async fn refresh(&mut self, controller: &Controller) -> Result<(), CoreError> {
        self.rows = controller.list_history().await?;
        Ok(())
    }

    // ── Documents ───────────────────────────────────────────────────

    /// Report of exactly the rows currently visible, in display order.
    pub fn export(&self, now: NaiveDateTime) -> HistoryReport {
        let rows: Vec<ReportRow> = self.visible().into_iter().map(ReportRow::from).collect();
        HistoryReport {
            generated_at: now,
            total_sessions: rows.len(),
            total_revenue: rows.iter().map(|r| r.revenue).sum(),
            rows,
        }
    }

    /// Receipt for one row, `None` if the id isn't in the ledger.
    pub fn receipt(&self, id: &SessionId, now: NaiveDateTime) -> Option<Receipt> {
        self.rows
            .iter()
            .find(|s| s.has_id(id))
            .map(|s| Receipt::new(s, now))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use parkpro_api::{RecordId, SessionRecord};
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;
    use crate::config::StoreConfig;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    fn row(id: i64, owner: &str, entry: Option<&str>, exit: Option<&str>) -> ParkingSession {
        ParkingSession::from(SessionRecord {
            id: Some(RecordId::Number(id)),
            owner_name: Some(owner.into()),
            vehicle_name: Some(format!("Car {id}")),
            plate_number: Some(format!("ABC{id:03}")),
            parking_slot: Some("B2".into()),
            entry_time: entry.map(Into::into),
            exit_time: exit.map(Into::into),
            ..SessionRecord::default()
        })
    }

    fn ledger() -> HistoryLedger {
        let mut ledger = HistoryLedger::new();
        ledger.set_rows(vec![
            row(1, "Carla", Some("2024-01-01T08:00"), Some("2024-01-01T10:30")),
            row(2, "alice", Some("2024-01-01T07:00"), Some("2024-01-01T08:00")),
            row(3, "Bob", Some("2024-01-01T09:00"), None),
            row(4, "Dan", Some("2024-01-01T11:00"), Some("2024-01-01T10:00")),
        ]);
        ledger
    }

    fn ids(rows: &[&ParkingSession]) -> Vec<String> {
        rows.iter()
            .map(|s| s.id.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect()
    }

    #[test]
    fn default_sort_is_latest_exit_first_with_missing_last() {
        let ledger = ledger();
        assert_eq!(ids(&ledger.visible()), ["1", "4", "2", "3"]);
    }

    #[test]
    fn ascending_is_exact_reverse_for_distinct_keys() {
        let mut ledger = ledger();
        let desc = ids(&ledger.visible());
        ledger.set_sort_order(SortOrder::Asc);
        let mut asc = ids(&ledger.visible());
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn name_sort_ignores_case_and_is_stable() {
        let mut ledger = ledger();
        ledger.set_rows(vec![
            row(1, "bob", None, None),
            row(2, "Alice", None, None),
            row(3, "Bob", None, None),
            row(4, "", None, None),
        ]);
        ledger.set_sort_key(SortKey::OwnerName);
        ledger.set_sort_order(SortOrder::Asc);
        assert_eq!(ids(&ledger.visible()), ["4", "2", "1", "3"]);

        ledger.set_sort_order(SortOrder::Desc);
        assert_eq!(ids(&ledger.visible()), ["1", "3", "2", "4"]);
    }

    #[test]
    fn sort_key_parses_cli_names() {
        assert_eq!("owner".parse::<SortKey>().unwrap(), SortKey::OwnerName);
        assert_eq!("exit-time".parse::<SortKey>().unwrap(), SortKey::ExitTime);
        assert_eq!("vehicle".parse::<SortKey>().unwrap(), SortKey::VehicleName);
    }

    #[test]
    fn summary_covers_full_history() {
        let mut ledger = ledger();
        ledger.set_search("carla");
        let summary = ledger.summary();

        assert_eq!(summary.sessions, 4);
        assert_eq!(summary.total_revenue, 60 + 20);
        // (2.5 + 1.0) / 2, the open and reversed rows are left out.
        assert!((summary.average_hours - 1.8).abs() < f64::EPSILON);
    }

    #[test]
    fn export_totals_match_visible_rows() {
        let mut ledger = ledger();
        ledger.set_search("a");
        let report = ledger.export(at(12, 0));

        let visible = ledger.visible();
        assert_eq!(report.total_sessions, visible.len());
        assert_eq!(
            report.total_revenue,
            visible.iter().map(|s| s.revenue()).sum::<u64>()
        );
        assert_eq!(report.rows.len(), report.total_sessions);
    }

    #[test]
    fn receipt_looks_up_by_id() {
        let ledger = ledger();
        let receipt = ledger.receipt(&SessionId::from(1), at(12, 0)).unwrap();
        assert_eq!(receipt.total, 60);
        assert!(ledger.receipt(&SessionId::from(42), at(12, 0)).is_none());
    }

    #[test]
    fn arming_is_exclusive() {
        let mut ledger = ledger();
        ledger.arm_delete(SessionId::from(1));
        ledger.arm_delete(SessionId::from(2));
        assert!(!ledger.is_armed(&SessionId::from(1)));
        assert!(ledger.is_armed(&SessionId::from(2)));
        ledger.disarm_delete();
        assert_eq!(ledger.delete_arm(), &DeleteArm::Idle);
    }

    #[tokio::test]
    async fn delete_is_optimistic_and_failure_becomes_a_warning() {
        // Nothing listens on port 1, so the background delete fails.
        let config = StoreConfig::new(Url::parse("http://127.0.0.1:1/api").unwrap());
        let controller = Controller::new(config).unwrap();
        let mut warnings = controller.warnings();

        let mut ledger = ledger();
        let id = SessionId::from(1);

        assert!(ledger.confirm_delete(&id, &controller).is_none());
        assert_eq!(ledger.rows().len(), 4);

        ledger.arm_delete(id.clone());
        let handle = ledger.confirm_delete(&id, &controller).unwrap();
        assert_eq!(ledger.rows().len(), 3);
        assert!(ledger.rows().iter().all(|s| !s.has_id(&id)));
        assert_eq!(ledger.delete_arm(), &DeleteArm::Idle);

        handle.await.unwrap();
        let warning = warnings.recv().await.unwrap();
        assert_eq!(warning.session_id, id);
        assert_eq!(
            warning.message,
            "Transaction removed locally, but server sync failed"
        );
        assert_eq!(ledger.rows().len(), 3);
    }
}
