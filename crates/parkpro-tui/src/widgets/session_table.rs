//! Session rows as the board and the ledger both show them.

use chrono::NaiveDateTime;
use ratatui::layout::Constraint;
use ratatui::widgets::{Cell, Row};

use parkpro_core::ParkingSession;
use parkpro_core::billing::format_currency;

use crate::theme;

pub const WIDTHS: [Constraint; 10] = [
    Constraint::Length(5),  // ID
    Constraint::Min(12),    // Owner
    Constraint::Min(10),    // Vehicle
    Constraint::Length(10), // Type
    Constraint::Length(8),  // Plate
    Constraint::Length(4),  // Slot
    Constraint::Length(16), // Entry
    Constraint::Length(16), // Exit
    Constraint::Length(8),  // Duration
    Constraint::Length(8),  // Charge
];

pub fn header() -> Row<'static> {
    Row::new(
        [
            "ID", "Owner", "Vehicle", "Type", "Plate", "Slot", "Entry", "Exit", "Duration",
            "Charge",
        ]
        .into_iter()
        .map(|h| Cell::from(h).style(theme::table_header())),
    )
}

/// Open sessions are measured to `now` and their charge is marked as an
/// estimate.
pub fn row(session: &ParkingSession, now: NaiveDateTime) -> Row<'static> {
    let id = session
        .id
        .as_ref()
        .map_or_else(String::new, ToString::to_string);
    let entry = session
        .entry_time
        .as_ref()
        .map_or_else(|| "N/A".to_owned(), ToString::to_string);
    let charge = format_currency(session.revenue_until(now));

    let (exit, charge, status) = match &session.exit_time {
        Some(exit) => (exit.to_string(), charge, theme::completed()),
        None => ("Parked".to_owned(), format!("~{charge}"), theme::parked()),
    };

    Row::new(vec![
        Cell::from(id),
        Cell::from(session.owner_name.clone()),
        Cell::from(session.vehicle_name.clone()),
        Cell::from(vehicle_type(session)),
        Cell::from(session.plate_number.clone()),
        Cell::from(session.slot_label()),
        Cell::from(entry),
        Cell::from(exit).style(status),
        Cell::from(session.duration_until(now).to_string()),
        Cell::from(charge).style(status),
    ])
    .style(theme::table_row())
}

fn vehicle_type(session: &ParkingSession) -> String {
    session.vehicle_type.map_or_else(
        || "N/A".to_owned(),
        |t| format!("{} {}", t.glyph(), t.label()),
    )
}
