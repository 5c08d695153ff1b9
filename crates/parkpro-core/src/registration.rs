// ── Session registration ──
//
// Form state for checking a vehicle in. Validation is synchronous and
// never touches the network; only `submit` and `load_slots` talk to the
// store. Front ends that drive the network themselves use the
// `begin_submit` / `finish_submit` pair instead of `submit`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{info, warn};

use parkpro_api::NewSessionRecord;

use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{ParkingSession, ParkingSlot, Timestamp, VehicleType};

// ── Fields and errors ───────────────────────────────────────────────

/// An operator-editable field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    OwnerName,
    VehicleName,
    VehicleType,
    PlateNumber,
    EntryTime,
    ParkingSlot,
    /// Only edited in the time-out dialog.
    ExitTime,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Self::OwnerName => "Owner Name",
            Self::VehicleName => "Vehicle Name",
            Self::VehicleType => "Vehicle Type",
            Self::PlateNumber => "Plate Number",
            Self::EntryTime => "Entry Time",
            Self::ParkingSlot => "Parking Slot",
            Self::ExitTime => "Exit Time",
        }
    }

    /// Fields shown on the registration form, in display order.
    pub fn registration() -> impl Iterator<Item = Self> {
        Self::iter().filter(|f| *f != Self::ExitTime)
    }
}

/// Per-field validation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

// ── Draft ───────────────────────────────────────────────────────────

/// Raw form contents exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDraft {
    pub owner_name: String,
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub plate_number: String,
    pub entry_time: String,
    pub parking_slot: String,
}

impl SessionDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::OwnerName => &self.owner_name,
            Field::VehicleName => &self.vehicle_name,
            Field::VehicleType => &self.vehicle_type,
            Field::PlateNumber => &self.plate_number,
            Field::EntryTime => &self.entry_time,
            Field::ParkingSlot => &self.parking_slot,
            Field::ExitTime => "",
        }
    }

    fn get_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::OwnerName => Some(&mut self.owner_name),
            Field::VehicleName => Some(&mut self.vehicle_name),
            Field::VehicleType => Some(&mut self.vehicle_type),
            Field::PlateNumber => Some(&mut self.plate_number),
            Field::EntryTime => Some(&mut self.entry_time),
            Field::ParkingSlot => Some(&mut self.parking_slot),
            Field::ExitTime => None,
        }
    }
}

/// A draft that passed validation, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub owner_name: String,
    pub vehicle_name: String,
    pub vehicle_type: VehicleType,
    /// Upper-cased.
    pub plate_number: String,
    pub entry_time: Timestamp,
    pub parking_slot: ParkingSlot,
}

impl NewSession {
    pub fn to_record(&self) -> NewSessionRecord {
        NewSessionRecord {
            owner_name: self.owner_name.clone(),
            vehicle_name: self.vehicle_name.clone(),
            vehicle_type: self.vehicle_type.to_string(),
            plate_number: self.plate_number.clone(),
            entry_time: self.entry_time.raw().to_owned(),
            parking_slot: self.parking_slot.to_string(),
        }
    }
}

/// `^[A-Z]{3}[0-9]{3}$`, checked on the upper-cased plate.
pub fn is_valid_plate(plate: &str) -> bool {
    let bytes = plate.as_bytes();
    bytes.len() == 6
        && bytes.iter().take(3).all(u8::is_ascii_uppercase)
        && bytes.iter().skip(3).all(u8::is_ascii_digit)
}

/// Validate a draft against the occupied set.
pub fn validate_draft(
    draft: &SessionDraft,
    occupied: &BTreeSet<ParkingSlot>,
) -> Result<NewSession, FieldErrors> {
    let mut errors = FieldErrors::default();

    let owner_name = draft.owner_name.trim();
    if owner_name.is_empty() {
        errors.insert(Field::OwnerName, "Owner name is required.");
    }

    let vehicle_name = draft.vehicle_name.trim();
    if vehicle_name.is_empty() {
        errors.insert(Field::VehicleName, "Vehicle name is required.");
    }

    let vehicle_type = draft.vehicle_type.trim().parse::<VehicleType>().ok();
    if vehicle_type.is_none() {
        errors.insert(Field::VehicleType, "Vehicle type is required.");
    }

    let plate_number = draft.plate_number.trim().to_uppercase();
    if !is_valid_plate(&plate_number) {
        errors.insert(Field::PlateNumber, "Plate number must be like ABC123.");
    }

    let entry_time = Timestamp::parse(draft.entry_time.trim()).filter(Timestamp::is_valid);
    if entry_time.is_none() {
        errors.insert(Field::EntryTime, "Entry time is required.");
    }

    let parking_slot = draft.parking_slot.parse::<ParkingSlot>().ok();
    match parking_slot {
        None => errors.insert(Field::ParkingSlot, "Parking slot is required."),
        Some(slot) if occupied.contains(&slot) => {
            errors.insert(Field::ParkingSlot, "Parking slot is already occupied.");
        }
        Some(_) => {}
    }

    match (vehicle_type, entry_time, parking_slot) {
        (Some(vehicle_type), Some(entry_time), Some(parking_slot)) if errors.is_empty() => {
            Ok(NewSession {
                owner_name: owner_name.to_owned(),
                vehicle_name: vehicle_name.to_owned(),
                vehicle_type,
                plate_number,
                entry_time,
                parking_slot,
            })
        }
        _ => Err(errors),
    }
}

// ── Form ────────────────────────────────────────────────────────────

/// One slot in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotOption {
    pub slot: ParkingSlot,
    /// `false` when an open session holds the slot.
    pub available: bool,
}

impl SlotOption {
    /// `A1 (Available)` / `A1 (Taken)`
    pub fn label(&self) -> String {
        let state = if self.available { "Available" } else { "Taken" };
        format!("{} ({state})", self.slot)
    }
}

/// State behind the registration screen.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    draft: SessionDraft,
    errors: FieldErrors,
    occupied: BTreeSet<ParkingSlot>,
    submitting: bool,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &SessionDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn occupied(&self) -> &BTreeSet<ParkingSlot> {
        &self.occupied
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Update one field and clear any error shown for it.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        if let Some(slot) = self.draft.get_mut(field) {
            *slot = value.into();
            self.errors.remove(field);
        }
    }

    /// Validate the draft, replacing the current error set.
    pub fn validate(&mut self) -> Result<NewSession, FieldErrors> {
        let result = validate_draft(&self.draft, &self.occupied);
        self.errors = match &result {
            Ok(_) => FieldErrors::default(),
            Err(errors) => errors.clone(),
        };
        result
    }

    /// All 25 slots; occupied ones are unavailable.
    pub fn slot_options(&self) -> Vec<SlotOption> {
        ParkingSlot::all()
            .map(|slot| SlotOption {
                slot,
                available: !self.occupied.contains(&slot),
            })
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// `N of 25 slots occupied`
    pub fn occupancy_summary(&self) -> String {
        format!(
            "{} of {} slots occupied",
            self.occupied_count(),
            ParkingSlot::COUNT
        )
    }

    pub fn set_occupied(&mut self, slots: impl IntoIterator<Item = ParkingSlot>) {
        self.occupied = slots.into_iter().collect();
    }

    /// Reset the draft and errors. The occupied set is kept.
    pub fn clear(&mut self) {
        self.draft = SessionDraft::default();
        self.errors.clear();
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Validate and mark the form as submitting.
    ///
    /// Returns `None` if a submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<Result<NewSession, FieldErrors>> {
        if self.submitting {
            return None;
        }
        let result = self.validate();
        self.submitting = result.is_ok();
        Some(result)
    }

    /// Apply the store's answer to a submission started with
    /// [`begin_submit`](Self::begin_submit). The draft is cleared only on
    /// success.
    pub fn finish_submit(&mut self, result: &Result<ParkingSession, CoreError>) {
        self.submitting = false;
        if result.is_ok() {
            self.clear();
        }
    }

    /// Validate, create the session, then refresh the occupied set.
    ///
    /// On a store failure the draft is left untouched so the operator can
    /// retry.
    pub async fn submit(&mut self, controller: &Controller) -> Result<ParkingSession, CoreError> {
        let new_session = match self.begin_submit() {
            Some(Ok(new_session)) => new_session,
            Some(Err(errors)) => return Err(CoreError::Validation { errors }),
            None => return Err(CoreError::Internal("submission already in progress".into())),
        };

        let result = controller.create_session(&new_session).await;
        self.finish_submit(&result);
        let created = result?;
        info!(
            plate = %created.plate_number,
            slot = %created.slot_label(),
            "vehicle registered"
        );

        if let Err(e) = self.load_slots(controller).await {
            warn!(error = %e, "failed to refresh occupied slots after registration");
        }
        Ok(created)
    }

    /// Fetch the occupied slot set.
    pub async fn load_slots(&mut self, controller: &Controller) -> Result<(), CoreError> {
        let slots = controller.occupied_slots().await?;
        self.set_occupied(slots);
        Ok(())
    }
}
