//! Registration screen: the new-session form and the slot grid.
//!
//! Text fields are edited in place after `Enter`; vehicle type and slot are
//! picked with the arrow keys, and the slot picker skips taken slots. The
//! whole form is validated on submit so every bad field is flagged at once.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use parkpro_core::billing::RATE_HINT;
use parkpro_core::{
    Controller, Field, ParkingSlot, RegistrationForm, Timestamp, VehicleType, ViewEpoch,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::data_bridge;
use crate::theme;

const FIELDS: [Field; 6] = [
    Field::OwnerName,
    Field::VehicleName,
    Field::VehicleType,
    Field::PlateNumber,
    Field::EntryTime,
    Field::ParkingSlot,
];

fn is_choice(field: Field) -> bool {
    matches!(field, Field::VehicleType | Field::ParkingSlot)
}

pub struct RegisterScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    controller: Controller,
    form: RegistrationForm,
    epoch: ViewEpoch,
    selected: usize,
    editing: bool,
    loading_slots: bool,
}

impl RegisterScreen {
    pub fn new(controller: Controller) -> Self {
        Self {
            focused: false,
            action_tx: None,
            controller,
            form: RegistrationForm::new(),
            epoch: ViewEpoch::new(),
            selected: 0,
            editing: false,
            loading_slots: false,
        }
    }

    fn current_field(&self) -> Field {
        FIELDS.get(self.selected).copied().unwrap_or(Field::OwnerName)
    }

    fn reload_slots(&mut self) {
        let generation = self.epoch.advance();
        if let Some(tx) = &self.action_tx {
            self.loading_slots = true;
            data_bridge::load_slots(&self.controller, generation, tx);
        }
    }

    fn move_field(&mut self, delta: isize) {
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(FIELDS.len() - 1);
    }

    // ── Choice fields ───────────────────────────────────────────────

    fn cycle_vehicle_type(&mut self, forward: bool) {
        let types: Vec<VehicleType> = VehicleType::iter().collect();
        let current = self
            .form
            .draft()
            .vehicle_type
            .parse::<VehicleType>()
            .ok()
            .and_then(|t| types.iter().position(|x| *x == t));
        if let Some(next) = cycle(current, types.len(), forward).and_then(|i| types.get(i)) {
            self.form.set_field(Field::VehicleType, next.to_string());
        }
    }

    /// Taken slots are never offered.
    fn cycle_slot(&mut self, forward: bool) -> Option<Action> {
        let free: Vec<ParkingSlot> = self
            .form
            .slot_options()
            .into_iter()
            .filter(|o| o.available)
            .map(|o| o.slot)
            .collect();
        if free.is_empty() {
            return Some(Action::Notify(Notification::warning(
                "Every slot is occupied.",
            )));
        }
        let current = self
            .form
            .draft()
            .parking_slot
            .parse::<ParkingSlot>()
            .ok()
            .and_then(|s| free.iter().position(|x| *x == s));
        if let Some(next) = cycle(current, free.len(), forward).and_then(|i| free.get(i)) {
            self.form.set_field(Field::ParkingSlot, next.to_string());
        }
        None
    }

    fn choose(&mut self, forward: bool) -> Option<Action> {
        match self.current_field() {
            Field::VehicleType => {
                self.cycle_vehicle_type(forward);
                None
            }
            Field::ParkingSlot => self.cycle_slot(forward),
            _ => None,
        }
    }

    // ── Text editing ────────────────────────────────────────────────

    fn edit_key(&mut self, key: KeyEvent) {
        let field = self.current_field();
        let mut value = self.form.draft().get(field).to_owned();
        match key.code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter | KeyCode::Tab => {
                self.editing = false;
                self.move_field(1);
                return;
            }
            KeyCode::Esc => {
                self.editing = false;
                return;
            }
            _ => return,
        }
        self.form.set_field(field, value);
    }

    fn fill_entry_now(&mut self) {
        let now = Timestamp::from_datetime(data_bridge::now());
        self.form.set_field(Field::EntryTime, now.raw());
    }

    // ── Submit ──────────────────────────────────────────────────────

    fn submit(&mut self) -> Option<Action> {
        let tx = self.action_tx.clone()?;
        match self.form.begin_submit()? {
            Ok(new_session) => {
                debug!(plate = %new_session.plate_number, "submitting registration");
                data_bridge::register(&self.controller, new_session, &tx);
                None
            }
            Err(errors) => Some(Action::Notify(Notification::error(format!(
                "{} field(s) need attention",
                errors.len()
            )))),
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn field_value(&self, field: Field) -> String {
        let raw = self.form.draft().get(field);
        match field {
            Field::VehicleType => match raw.parse::<VehicleType>() {
                Ok(t) => format!("‹ {} {} ›", t.glyph(), t.label()),
                Err(_) => "‹ select ›".to_owned(),
            },
            Field::ParkingSlot if raw.is_empty() => "‹ select ›".to_owned(),
            Field::ParkingSlot => format!("‹ {raw} ›"),
            Field::EntryTime if raw.is_empty() && !self.editing => {
                "YYYY-MM-DDTHH:MM  (n = now)".to_owned()
            }
            _ => raw.to_owned(),
        }
    }

    fn form_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from("")];
        for (i, field) in FIELDS.iter().copied().enumerate() {
            let selected = i == self.selected && self.focused;
            let marker = if selected { "▸" } else { " " };
            let label_style = if selected {
                theme::tab_active()
            } else {
                theme::tab_inactive()
            };
            let mut value = self.field_value(field);
            if selected && self.editing {
                value.push('█');
            }
            let value_style = if self.form.draft().get(field).is_empty() && !self.editing {
                theme::key_hint()
            } else {
                Style::default().fg(theme::SKY)
            };

            lines.push(Line::from(vec![
                Span::styled(format!(" {marker} "), label_style),
                Span::styled(format!("{:<14}", field.label()), label_style),
                Span::styled(value, value_style),
            ]));
            match self.form.errors().get(field) {
                Some(message) => lines.push(Line::from(Span::styled(
                    format!("     ↳ {message}"),
                    theme::field_error(),
                ))),
                None => lines.push(Line::from("")),
            }
        }
        if self.form.is_submitting() {
            lines.push(Line::from(Span::styled(
                "   Registering…",
                Style::default().fg(theme::LANE_YELLOW),
            )));
        }
        lines
    }

    fn slot_grid(&self) -> Vec<Line<'static>> {
        let chosen = self.form.draft().parking_slot.parse::<ParkingSlot>().ok();
        let mut lines = vec![Line::from("")];
        for row in ParkingSlot::ALL.chunks(5) {
            let mut spans = vec![Span::raw("  ")];
            for slot in row {
                let style = if Some(*slot) == chosen {
                    theme::table_selected()
                } else if self.form.occupied().contains(slot) {
                    Style::default()
                        .fg(theme::STOP_RED)
                        .add_modifier(Modifier::DIM)
                } else {
                    theme::completed()
                };
                spans.push(Span::styled(format!(" {slot} "), style));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        let summary = if self.loading_slots {
            "  Loading slots…".to_owned()
        } else {
            format!("  {}", self.form.occupancy_summary())
        };
        lines.push(Line::from(Span::styled(summary, theme::tab_inactive())));
        lines.push(Line::from(Span::styled(
            format!("  Rate: {RATE_HINT}"),
            theme::key_hint(),
        )));
        lines
    }
}

/// Index after (or before) `current` in a list of `len`, wrapping. With no
/// current pick, forward starts at the first entry and backward at the last.
fn cycle(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

impl Component for RegisterScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            self.edit_key(key);
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_field(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_field(-1);
                None
            }
            KeyCode::Char('l') | KeyCode::Right => self.choose(true),
            KeyCode::Char('h') | KeyCode::Left => self.choose(false),
            KeyCode::Enter if is_choice(self.current_field()) => self.choose(true),
            KeyCode::Enter => {
                self.editing = true;
                None
            }
            KeyCode::Char('n') => {
                self.fill_entry_now();
                None
            }
            KeyCode::Char('s') => self.submit(),
            KeyCode::Char('c') => {
                self.form.clear();
                self.selected = 0;
                None
            }
            KeyCode::Char('r') => {
                self.reload_slots();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SlotsLoaded { generation, result } => {
                let Some(result) = self.epoch.accept(*generation, result) else {
                    debug!("stale slot response dropped");
                    return Ok(None);
                };
                self.loading_slots = false;
                match result {
                    Ok(slots) => self.form.set_occupied(slots.iter().copied()),
                    Err(e) => {
                        return Ok(Some(Action::Notify(Notification::error(format!(
                            "Could not load slots: {e}"
                        )))));
                    }
                }
            }
            Action::Registered(result) => {
                self.form.finish_submit(result);
                return Ok(Some(match result {
                    Ok(_) => {
                        self.selected = 0;
                        self.reload_slots();
                        Action::Notify(Notification::success(
                            "Vehicle has been registered and parked.",
                        ))
                    }
                    Err(e) => Action::Notify(Notification::error(e.to_string())),
                }));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Register Vehicle ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [form_area, grid_area] =
            Layout::horizontal([Constraint::Min(40), Constraint::Length(34)]).areas(inner);

        frame.render_widget(Paragraph::new(self.form_lines()), form_area);

        let grid_block = Block::default()
            .title(" Slots ")
            .title_style(theme::title_style())
            .borders(Borders::LEFT)
            .border_style(theme::border_default());
        let grid_inner = grid_block.inner(grid_area);
        frame.render_widget(grid_block, grid_area);
        frame.render_widget(Paragraph::new(self.slot_grid()), grid_inner);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    /// Mounting re-fetches the occupied slots; unmounting orphans any
    /// fetch still in flight.
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.reload_slots();
        } else {
            self.epoch.advance();
            self.editing = false;
            self.loading_slots = false;
        }
    }

    fn captures_input(&self) -> bool {
        self.editing
    }

    fn hints(&self) -> &'static str {
        if self.editing {
            "type to edit  Enter next  Esc done"
        } else {
            "j/k field  Enter edit  ←/→ choose  n now  s submit  c clear  r slots"
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use crossterm::event::KeyModifiers;
    use parkpro_core::StoreConfig;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;

    fn screen() -> (RegisterScreen, mpsc::UnboundedReceiver<Action>) {
        let config = StoreConfig::new("http://127.0.0.1:5000/api".parse().unwrap());
        let mut screen = RegisterScreen::new(Controller::new(config).unwrap());
        let (tx, rx) = mpsc::unbounded_channel();
        screen.init(tx).unwrap();
        (screen, rx)
    }

    fn press(screen: &mut RegisterScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut RegisterScreen, text: &str) {
        press(screen, KeyCode::Enter);
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
        press(screen, KeyCode::Enter);
    }

    fn slots(codes: &[&str]) -> BTreeSet<ParkingSlot> {
        codes.iter().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn typing_fills_field_and_advances() {
        let (mut screen, _rx) = screen();
        type_text(&mut screen, "Jane Doe");
        assert_eq!(screen.form.draft().owner_name, "Jane Doe");
        assert_eq!(screen.current_field(), Field::VehicleName);
        assert!(!screen.captures_input());
    }

    #[test]
    fn editing_captures_global_keys() {
        let (mut screen, _rx) = screen();
        press(&mut screen, KeyCode::Enter);
        assert!(screen.captures_input());
        press(&mut screen, KeyCode::Char('q'));
        press(&mut screen, KeyCode::Backspace);
        press(&mut screen, KeyCode::Char('s'));
        assert_eq!(screen.form.draft().owner_name, "s");
        assert!(!screen.form.is_submitting());
    }

    #[test]
    fn slot_picker_skips_taken_slots() {
        let (mut screen, _rx) = screen();
        screen.form.set_occupied(slots(&["A1", "A2"]));
        screen.selected = 5;

        press(&mut screen, KeyCode::Right);
        assert_eq!(screen.form.draft().parking_slot, "A3");
        press(&mut screen, KeyCode::Left);
        assert_eq!(screen.form.draft().parking_slot, "E5");
    }

    #[test]
    fn full_lot_warns_instead_of_picking() {
        let (mut screen, _rx) = screen();
        screen.form.set_occupied(ParkingSlot::all());
        screen.selected = 5;

        let action = press(&mut screen, KeyCode::Right);
        assert!(matches!(action, Some(Action::Notify(_))));
        assert_eq!(screen.form.draft().parking_slot, "");
    }

    #[test]
    fn vehicle_type_cycles_through_every_type() {
        let (mut screen, _rx) = screen();
        screen.selected = 2;
        let mut seen = Vec::new();
        for _ in 0..VehicleType::iter().count() {
            press(&mut screen, KeyCode::Right);
            seen.push(screen.form.draft().vehicle_type.clone());
        }
        press(&mut screen, KeyCode::Right);
        assert_eq!(screen.form.draft().vehicle_type, seen[0]);
        assert_eq!(seen[1], "car");
    }

    #[test]
    fn empty_submit_flags_every_field() {
        let (mut screen, mut rx) = screen();
        let action = press(&mut screen, KeyCode::Char('s'));

        assert!(matches!(action, Some(Action::Notify(_))));
        assert_eq!(screen.form.errors().len(), 6);
        assert!(!screen.form.is_submitting());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_slot_response_is_ignored() {
        let (mut screen, _rx) = screen();
        let stale = screen.epoch.advance();
        let current = screen.epoch.advance();

        screen
            .update(&Action::SlotsLoaded {
                generation: stale,
                result: Ok(slots(&["B2"])),
            })
            .unwrap();
        assert_eq!(screen.form.occupied_count(), 0);

        screen
            .update(&Action::SlotsLoaded {
                generation: current,
                result: Ok(slots(&["B2", "C3"])),
            })
            .unwrap();
        assert_eq!(screen.form.occupancy_summary(), "2 of 25 slots occupied");
    }
}
