//! Palette and semantic styles. Colours borrow from car-park signage:
//! asphalt backgrounds, sign blue for focus, lane yellow for anything still
//! on the clock.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ─────────────────────────────────────────────────────────

pub const SIGN_BLUE: Color = Color::Rgb(74, 144, 226); // #4a90e2
pub const SKY: Color = Color::Rgb(140, 210, 255); // #8cd2ff
pub const LANE_YELLOW: Color = Color::Rgb(250, 204, 21); // #facc15
pub const GO_GREEN: Color = Color::Rgb(74, 222, 128); // #4ade80
pub const STOP_RED: Color = Color::Rgb(248, 113, 113); // #f87171
pub const ROSE: Color = Color::Rgb(251, 146, 160); // #fb92a0

pub const CHALK: Color = Color::Rgb(214, 211, 209); // #d6d3d1
const CONCRETE: Color = Color::Rgb(120, 113, 108); // #78716c
const ASPHALT_LIGHT: Color = Color::Rgb(41, 37, 36); // #292524
pub const ASPHALT: Color = Color::Rgb(28, 25, 23); // #1c1917

// ── Chrome ──────────────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::new().fg(SKY).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::new().fg(SIGN_BLUE)
}

pub fn border_default() -> Style {
    Style::new().fg(CONCRETE)
}

pub fn tab_active() -> Style {
    Style::new()
        .fg(ASPHALT)
        .bg(SIGN_BLUE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::new().fg(CHALK)
}

/// Hint text, e.g. "q quit  ? help".
pub fn key_hint() -> Style {
    Style::new().fg(CONCRETE)
}

/// The key itself inside a hint.
pub fn key_hint_key() -> Style {
    Style::new().fg(SKY).add_modifier(Modifier::BOLD)
}

// ── Tables ──────────────────────────────────────────────────────────

pub fn table_header() -> Style {
    Style::new().fg(SKY).add_modifier(Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::new().fg(CHALK)
}

pub fn table_selected() -> Style {
    Style::new()
        .bg(ASPHALT_LIGHT)
        .fg(SIGN_BLUE)
        .add_modifier(Modifier::BOLD)
}

// ── Session state ───────────────────────────────────────────────────

/// Inline validation message under a form field.
pub fn field_error() -> Style {
    Style::new().fg(STOP_RED)
}

/// Open sessions and other figures still running.
pub fn parked() -> Style {
    Style::new().fg(LANE_YELLOW)
}

pub fn completed() -> Style {
    Style::new().fg(GO_GREEN)
}
