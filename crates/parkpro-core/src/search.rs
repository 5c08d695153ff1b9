use crate::model::ParkingSession;

/// Case-insensitive substring match over owner, vehicle, plate and slot.
/// The slot is tried both as parsed and as the store spelled it.
///
/// An empty (or all-whitespace) term matches every session.
pub fn matches(session: &ParkingSession, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let slot = session.parking_slot.map(|s| s.to_string());
    [
        Some(session.owner_name.as_str()),
        Some(session.vehicle_name.as_str()),
        Some(session.plate_number.as_str()),
        slot.as_deref(),
        session.source.parking_slot.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use parkpro_api::SessionRecord;

    use super::*;

    fn session(owner: &str, plate: &str, slot: Option<&str>) -> ParkingSession {
        ParkingSession::from(SessionRecord {
            owner_name: Some(owner.into()),
            vehicle_name: Some("Civic".into()),
            plate_number: Some(plate.into()),
            parking_slot: slot.map(Into::into),
            ..SessionRecord::default()
        })
    }

    #[test]
    fn empty_term_matches_all() {
        assert!(matches(&session("Jane", "ABC123", None), ""));
        assert!(matches(&session("Jane", "ABC123", None), "   "));
    }

    #[test]
    fn matches_any_searchable_field_ignoring_case() {
        let s = session("Jane Doe", "ABC123", Some("C4"));
        assert!(matches(&s, "jane"));
        assert!(matches(&s, "civic"));
        assert!(matches(&s, "abc1"));
        assert!(matches(&s, "c4"));
        assert!(!matches(&s, "truck"));
    }

    #[test]
    fn missing_slot_is_not_an_error() {
        let s = session("Jane", "ABC123", None);
        assert!(!matches(&s, "a1"));
    }

    #[test]
    fn off_grid_slot_is_found_by_its_raw_name() {
        let s = session("Jane", "ABC123", Some("Basement-7"));
        assert!(s.parking_slot.is_none());
        assert!(matches(&s, "basement"));
        assert!(matches(&s, "T-7"));
    }
}
