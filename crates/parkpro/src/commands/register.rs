//! Vehicle registration handler.
//!
//! Flags fill the form; anything missing is prompted for on a terminal.
//! Validation runs once, on the whole form, so every bad field is
//! reported together.

use dialoguer::{Input, Select};
use strum::IntoEnumIterator;

use parkpro_core::{Controller, Field, RegistrationForm, Timestamp, VehicleType};

use crate::cli::{GlobalOpts, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::sessions::{SessionView, detail};
use super::util::{self, prompt_err};

fn prompt_text(label: &str, default: Option<String>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default);
    }
    input.interact_text().map_err(prompt_err)
}

fn prompt_vehicle_type() -> Result<String, CliError> {
    let types: Vec<VehicleType> = VehicleType::iter().collect();
    let items: Vec<String> = types
        .iter()
        .map(|t| format!("{} {}", t.glyph(), t.label()))
        .collect();
    let idx = Select::new()
        .with_prompt("Vehicle type")
        .items(&items)
        .default(1)
        .interact()
        .map_err(prompt_err)?;
    Ok(types.get(idx).map(ToString::to_string).unwrap_or_default())
}

/// Only free slots are offered.
fn prompt_slot(form: &RegistrationForm) -> Result<String, CliError> {
    let free: Vec<String> = form
        .slot_options()
        .into_iter()
        .filter(|o| o.available)
        .map(|o| o.slot.to_string())
        .collect();
    if free.is_empty() {
        return Err(CliError::Validation {
            field: "parking_slot".into(),
            reason: "every slot is occupied".into(),
        });
    }
    let idx = Select::new()
        .with_prompt(format!("Parking slot ({})", form.occupancy_summary()))
        .items(&free)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(free.get(idx).cloned().unwrap_or_default())
}

pub async fn handle(
    controller: &Controller,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut form = RegistrationForm::new();
    form.load_slots(controller).await?;

    let interactive = !args.no_input && util::is_interactive();
    let now = Timestamp::from_datetime(util::now()).raw().to_owned();

    let owner = match args.owner {
        Some(v) => v,
        None if interactive => prompt_text("Owner name", None)?,
        None => String::new(),
    };
    let vehicle = match args.vehicle {
        Some(v) => v,
        None if interactive => prompt_text("Vehicle name", None)?,
        None => String::new(),
    };
    let vehicle_type = match args.vehicle_type {
        Some(v) => v,
        None if interactive => prompt_vehicle_type()?,
        None => String::new(),
    };
    let plate = match args.plate {
        Some(v) => v,
        None if interactive => prompt_text("Plate number (ABC123)", None)?,
        None => String::new(),
    };
    let entry = match args.entry {
        Some(v) => v,
        None if interactive => prompt_text("Entry time", Some(now))?,
        None => now,
    };
    let slot = match args.slot {
        Some(v) => v,
        None if interactive => prompt_slot(&form)?,
        None => String::new(),
    };

    form.set_field(Field::OwnerName, owner);
    form.set_field(Field::VehicleName, vehicle);
    form.set_field(Field::VehicleType, vehicle_type);
    form.set_field(Field::PlateNumber, plate);
    form.set_field(Field::EntryTime, entry);
    form.set_field(Field::ParkingSlot, slot);

    let created = form.submit(controller).await?;

    if !global.quiet {
        let color = output::should_color(global.color);
        eprintln!(
            "{} Vehicle has been registered and parked. {}",
            output::accent("✓", color),
            form.occupancy_summary()
        );
    }

    let view = SessionView::new(&created, util::now());
    let out = output::render_single(global.output, &view, detail, SessionView::id)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
