//! Screen implementations. Each screen is a top-level Component.

pub mod history;
pub mod register;
pub mod sessions;

use std::path::PathBuf;

use parkpro_core::Controller;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create one component per tab, each holding its own controller handle.
pub fn create_screens(
    controller: &Controller,
    export_dir: PathBuf,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Register,
            Box::new(register::RegisterScreen::new(controller.clone())),
        ),
        (
            ScreenId::Sessions,
            Box::new(sessions::SessionsScreen::new(controller.clone())),
        ),
        (
            ScreenId::History,
            Box::new(history::HistoryScreen::new(controller.clone(), export_dir)),
        ),
    ]
}
