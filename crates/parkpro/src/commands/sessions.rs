//! Session board handlers: list, stats, time out.

use chrono::NaiveDateTime;
use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use parkpro_core::billing::{DurationDisplay, RATE_HINT, format_currency};
use parkpro_core::{
    BoardStats, Controller, ParkingSession, SessionBoard, SessionFilter, SessionId, VehicleType,
};

use crate::cli::{FilterArg, GlobalOpts, OutputFormat, SessionsArgs, SessionsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Shared session view ─────────────────────────────────────────────

/// A session plus its live figures. Open sessions are measured to `now`.
#[derive(Serialize)]
pub struct SessionView<'a> {
    #[serde(flatten)]
    pub session: &'a ParkingSession,
    pub status: &'static str,
    pub duration: DurationDisplay,
    pub charge: u64,
}

impl<'a> SessionView<'a> {
    pub fn new(session: &'a ParkingSession, now: NaiveDateTime) -> Self {
        Self {
            session,
            status: if session.is_open() { "parked" } else { "completed" },
            duration: session.duration_until(now),
            charge: session.revenue_until(now),
        }
    }

    pub fn id(&self) -> String {
        self.session
            .id
            .as_ref()
            .map_or_else(String::new, ToString::to_string)
    }
}

#[derive(Tabled)]
pub struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Type")]
    vtype: String,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Exit")]
    exit: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Charge")]
    charge: String,
}

impl From<&SessionView<'_>> for SessionRow {
    fn from(v: &SessionView<'_>) -> Self {
        let s = v.session;
        let charge = format_currency(v.charge);
        Self {
            id: v.id(),
            owner: s.owner_name.clone(),
            vehicle: s.vehicle_name.clone(),
            vtype: s.vehicle_type_label().to_owned(),
            plate: s.plate_number.clone(),
            slot: s.slot_label(),
            entry: s
                .entry_time
                .as_ref()
                .map_or_else(|| "N/A".into(), ToString::to_string),
            exit: s
                .exit_time
                .as_ref()
                .map_or_else(|| "Parked".into(), ToString::to_string),
            duration: v.duration.to_string(),
            // Running charge for open sessions is an estimate.
            charge: if s.is_open() { format!("~{charge}") } else { charge },
        }
    }
}

/// Multi-line detail for a single session.
pub fn detail(v: &SessionView<'_>) -> String {
    let s = v.session;
    [
        format!("ID:        {}", v.id()),
        format!("Owner:     {}", s.owner_name),
        format!("Vehicle:   {} ({})", s.vehicle_name, s.vehicle_type_label()),
        format!("Plate:     {}", s.plate_number),
        format!("Slot:      {}", s.slot_label()),
        format!(
            "Entry:     {}",
            s.entry_time
                .as_ref()
                .map_or_else(|| "N/A".into(), ToString::to_string)
        ),
        format!(
            "Exit:      {}",
            s.exit_time
                .as_ref()
                .map_or_else(|| "Parked".into(), ToString::to_string)
        ),
        format!("Duration:  {}", v.duration),
        format!("Charge:    {}", format_currency(v.charge)),
    ]
    .join("\n")
}

// ── Stats view ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatsView {
    #[serde(flatten)]
    stats: BoardStats,
    occupancy: String,
}

fn stats_detail(view: &StatsView) -> String {
    let s = &view.stats;
    let mut lines = vec![
        format!("Total transactions:  {}", s.total),
        format!("Currently parked:    {}", s.parked),
        format!("Completed:           {}", s.completed),
        format!("Total revenue:       {}", format_currency(s.total_revenue)),
        format!("Occupancy:           {}", view.occupancy),
        String::new(),
        "By vehicle type:".to_owned(),
    ];
    for vt in VehicleType::iter() {
        lines.push(format!("  {} {:<12} {}", vt.glyph(), vt.label(), s.count(vt)));
    }
    lines.join("\n")
}

fn filter_of(arg: FilterArg) -> SessionFilter {
    match arg {
        FilterArg::All => SessionFilter::All,
        FilterArg::Parked => SessionFilter::Parked,
        FilterArg::Completed => SessionFilter::Completed,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: SessionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut board = SessionBoard::new();
    board.refresh(controller).await?;

    match args.command {
        SessionsCommand::List { filter, search } => {
            board.set_filter(filter_of(filter));
            if let Some(term) = search {
                board.set_search(term);
            }

            let now = util::now();
            let views: Vec<SessionView<'_>> = board
                .visible()
                .into_iter()
                .map(|s| SessionView::new(s, now))
                .collect();

            let table = matches!(global.output, OutputFormat::Table);
            if table && views.is_empty() {
                output::print_output(board.empty_message(), global.quiet);
                return Ok(());
            }

            let out = output::render_list(
                global.output,
                &views,
                |v| SessionRow::from(v),
                SessionView::id,
            )?;
            output::print_output(&out, global.quiet);
            if table {
                output::print_output(&board.showing_summary(), global.quiet);
            }
            Ok(())
        }

        SessionsCommand::Stats => {
            let occupied = controller.occupied_slots().await?;
            let view = StatsView {
                stats: board.stats(),
                occupancy: format!(
                    "{} of {} slots occupied",
                    occupied.len(),
                    parkpro_core::ParkingSlot::COUNT
                ),
            };
            let out = output::render_single(global.output, &view, stats_detail, |v| {
                v.stats.total.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SessionsCommand::Timeout { id, exit } => {
            let id: SessionId = SessionId::from(id.as_str());
            let session = util::find_session(board.sessions(), &id, "sessions list")?;
            if session.is_closed() {
                return Err(CliError::Validation {
                    field: "id".into(),
                    reason: format!("session {id} already has an exit time"),
                });
            }

            board.open_time_out(&id);
            if let Some(raw) = exit {
                board.set_exit_input(raw);
            }

            let now = util::now();
            if let Some(preview) = board.preview_revenue(now) {
                tracing::debug!(%id, charge = preview, rate = RATE_HINT, "timing out");
            }
            board.confirm_time_out(controller, now).await?;

            let updated = util::find_session(board.sessions(), &id, "sessions list")?;
            let view = SessionView::new(updated, now);
            let out = output::render_single(global.output, &view, detail, SessionView::id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
