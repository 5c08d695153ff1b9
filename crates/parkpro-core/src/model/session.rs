// ── Parking session ──

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use parkpro_api::{RecordId, SessionRecord};

use super::slot::ParkingSlot;
use super::timestamp::Timestamp;
use super::vehicle::VehicleType;
use crate::billing::{self, DurationDisplay};

/// Store-assigned session identifier.
///
/// Opaque: the store may use integers or strings. Always displayed as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(RecordId);

impl SessionId {
    pub fn as_record_id(&self) -> &RecordId {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RecordId> for SessionId {
    fn from(id: RecordId) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(RecordId::from(s))
    }
}

impl From<i64> for SessionId {
    fn from(n: i64) -> Self {
        Self(RecordId::Number(n))
    }
}

impl FromStr for SessionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.trim()))
    }
}

/// A vehicle's stay in one slot, open until an exit time is recorded.
///
/// Missing text fields from the store decode as empty strings; unknown
/// vehicle types, slots and unparseable times decode as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkingSession {
    pub id: Option<SessionId>,
    pub owner_name: String,
    pub vehicle_name: String,
    pub vehicle_type: Option<VehicleType>,
    pub plate_number: String,
    pub parking_slot: Option<ParkingSlot>,
    pub entry_time: Option<Timestamp>,
    pub exit_time: Option<Timestamp>,

    /// The record as the store sent it, so updates echo unknown values back.
    #[serde(skip)]
    pub(crate) source: SessionRecord,
}

impl ParkingSession {
    /// No exit time recorded yet.
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// `true` if this session carries the given id.
    pub fn has_id(&self, id: &SessionId) -> bool {
        self.id.as_ref() == Some(id)
    }

    fn entry_at(&self) -> Option<NaiveDateTime> {
        self.entry_time.as_ref().and_then(Timestamp::datetime)
    }

    fn exit_at(&self) -> Option<NaiveDateTime> {
        self.exit_time.as_ref().and_then(Timestamp::datetime)
    }

    /// Charge for a closed session; zero while open.
    pub fn revenue(&self) -> u64 {
        billing::revenue(self.entry_at(), self.exit_at())
    }

    pub fn duration(&self) -> DurationDisplay {
        billing::duration(self.entry_at(), self.exit_at())
    }

    /// Duration measured to the exit time, or to `now` while open.
    pub fn duration_until(&self, now: NaiveDateTime) -> DurationDisplay {
        billing::duration(self.entry_at(), self.exit_at().or(Some(now)))
    }

    /// Charge measured to the exit time, or to `now` while open.
    pub fn revenue_until(&self, now: NaiveDateTime) -> u64 {
        billing::revenue(self.entry_at(), self.exit_at().or(Some(now)))
    }

    /// Slot label, `N/A` when unknown.
    pub fn slot_label(&self) -> String {
        self.parking_slot
            .map_or_else(|| "N/A".to_owned(), |s| s.to_string())
    }

    pub fn vehicle_type_label(&self) -> &'static str {
        self.vehicle_type.map_or("N/A", VehicleType::label)
    }

    /// Full record for a `PUT`: every field as received, exit time replaced.
    pub fn with_exit_time(&self, exit: &Timestamp) -> SessionRecord {
        SessionRecord {
            exit_time: Some(exit.raw().to_owned()),
            ..self.source.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record() -> SessionRecord {
        SessionRecord {
            id: Some(RecordId::Number(7)),
            owner_name: Some("Jane Doe".into()),
            vehicle_name: Some("Civic".into()),
            vehicle_type: Some("hovercraft".into()),
            plate_number: Some("ABC123".into()),
            parking_slot: Some("A1".into()),
            entry_time: Some("2024-01-01T08:00".into()),
            exit_time: None,
        }
    }

    #[test]
    fn update_body_keeps_unknown_values() {
        let session = ParkingSession::from(record());
        assert_eq!(session.vehicle_type, None);

        let exit = Timestamp::parse("2024-01-01T10:30").unwrap();
        let body = session.with_exit_time(&exit);

        assert_eq!(body.vehicle_type.as_deref(), Some("hovercraft"));
        assert_eq!(body.exit_time.as_deref(), Some("2024-01-01T10:30"));
        assert_eq!(body.entry_time.as_deref(), Some("2024-01-01T08:00"));
    }

    #[test]
    fn open_session_has_no_revenue_yet() {
        let session = ParkingSession::from(record());
        assert!(session.is_open());
        assert_eq!(session.revenue(), 0);
        assert_eq!(session.duration(), DurationDisplay::NotAvailable);
    }
}
