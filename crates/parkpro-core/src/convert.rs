// ── API-to-domain conversions ──
//
// Turns tolerant `parkpro_api` records into `ParkingSession`s. Missing text
// becomes an empty string; values that don't parse become `None`.

use parkpro_api::SessionRecord;

use crate::model::{ParkingSession, ParkingSlot, SessionId, Timestamp, VehicleType};

fn text(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_owned()).unwrap_or_default()
}

fn timestamp(raw: Option<&str>) -> Option<Timestamp> {
    raw.and_then(Timestamp::parse)
}

impl From<SessionRecord> for ParkingSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.id.clone().map(SessionId::from),
            owner_name: text(record.owner_name.as_deref()),
            vehicle_name: text(record.vehicle_name.as_deref()),
            vehicle_type: record
                .vehicle_type
                .as_deref()
                .and_then(|s| s.trim().parse::<VehicleType>().ok()),
            plate_number: text(record.plate_number.as_deref()),
            parking_slot: record
                .parking_slot
                .as_deref()
                .and_then(|s| s.parse::<ParkingSlot>().ok()),
            entry_time: timestamp(record.entry_time.as_deref()),
            exit_time: timestamp(record.exit_time.as_deref()),
            source: record,
        }
    }
}

#[cfg(test)]
mod tests {
    use parkpro_api::RecordId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_exit_time_means_open() {
        let session = ParkingSession::from(SessionRecord {
            id: Some(RecordId::Text("x1".into())),
            exit_time: Some(String::new()),
            ..SessionRecord::default()
        });
        assert!(session.is_open());
        assert_eq!(session.id.map(|id| id.to_string()), Some("x1".to_owned()));
    }

    #[test]
    fn missing_fields_degrade() {
        let session = ParkingSession::from(SessionRecord {
            vehicle_type: Some("Car".into()),
            parking_slot: Some("Z9".into()),
            entry_time: Some("soon".into()),
            ..SessionRecord::default()
        });
        assert_eq!(session.owner_name, "");
        assert_eq!(session.vehicle_type, Some(VehicleType::Car));
        assert_eq!(session.parking_slot, None);
        assert_eq!(session.slot_label(), "N/A");
        assert!(session.entry_time.as_ref().is_some_and(|t| !t.is_valid()));
    }
}
