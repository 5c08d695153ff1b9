//! Command dispatch: bridges CLI args -> core screen state -> output formatting.

pub mod config_cmd;
pub mod history;
pub mod register;
pub mod sessions;
pub mod slots;
pub mod util;

use parkpro_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Slots => slots::handle(controller, global).await,
        Command::Register(args) => register::handle(controller, args, global).await,
        Command::Sessions(args) => sessions::handle(controller, args, global).await,
        Command::History(args) => history::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
