//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{Local, NaiveDateTime};

use parkpro_core::{ParkingSession, SessionId};

use crate::error::CliError;

/// Local wall-clock time; the store's timestamps carry no zone.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `true` when prompts can be shown.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Find a session by id in an already-fetched listing.
pub fn find_session<'a>(
    sessions: &'a [ParkingSession],
    id: &SessionId,
    list_command: &str,
) -> Result<&'a ParkingSession, CliError> {
    sessions
        .iter()
        .find(|s| s.has_id(id))
        .ok_or_else(|| CliError::NotFound {
            identifier: id.to_string(),
            list_command: list_command.into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !is_interactive() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
