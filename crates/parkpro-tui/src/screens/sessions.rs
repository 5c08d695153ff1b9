//! Active session board: headline stats, filter tabs, the session table
//! and the time-out dialog.

use chrono::NaiveDateTime;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Table, TableState};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use parkpro_core::billing::{RATE_HINT, format_currency};
use parkpro_core::{
    Controller, CoreError, Field, ParkingSession, SessionBoard, SessionFilter, TimeOutModal,
    VehicleType, ViewEpoch,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::data_bridge;
use crate::theme;
use crate::widgets::{self, session_table, sub_tabs};

pub struct SessionsScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    controller: Controller,
    board: SessionBoard,
    epoch: ViewEpoch,
    table_state: TableState,
    loading: bool,
    /// Why the last time-out attempt was refused.
    modal_error: Option<String>,
    now: NaiveDateTime,
}

impl SessionsScreen {
    pub fn new(controller: Controller) -> Self {
        Self {
            focused: false,
            action_tx: None,
            controller,
            board: SessionBoard::new(),
            epoch: ViewEpoch::new(),
            table_state: TableState::default(),
            loading: false,
            modal_error: None,
            now: data_bridge::now(),
        }
    }

    fn reload(&mut self) {
        let generation = self.epoch.advance();
        if let Some(tx) = &self.action_tx {
            self.loading = true;
            data_bridge::load_sessions(&self.controller, generation, tx);
        }
    }

    fn selected_session(&self) -> Option<&ParkingSession> {
        let visible = self.board.visible();
        self.table_state
            .selected()
            .and_then(|i| visible.get(i).copied())
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.board.visible().len();
        self.table_state
            .select(widgets::step(self.table_state.selected(), len, delta));
    }

    fn cycle_filter(&mut self, forward: bool) {
        let filters: Vec<SessionFilter> = SessionFilter::iter().collect();
        let idx = filters
            .iter()
            .position(|f| *f == self.board.filter())
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % filters.len()
        } else {
            (idx + filters.len() - 1) % filters.len()
        };
        if let Some(filter) = filters.get(next) {
            self.board.set_filter(*filter);
        }
        self.move_selection(0);
    }

    fn open_time_out(&mut self) -> Option<Action> {
        let session = self.selected_session()?;
        let id = session.id.clone()?;
        if session.is_closed() {
            return Some(Action::Notify(Notification::info(format!(
                "Transaction {id} already has an exit time"
            ))));
        }
        self.modal_error = None;
        self.board.open_time_out(&id);
        None
    }

    // ── Time-out dialog ─────────────────────────────────────────────

    fn exit_input(&self) -> &str {
        match self.board.modal() {
            TimeOutModal::Open { exit_input, .. } => exit_input,
            TimeOutModal::Closed => "",
        }
    }

    fn confirm_time_out(&mut self) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let now = data_bridge::now();
        match self.board.begin_time_out(now) {
            Ok(Some((session, exit))) => {
                self.modal_error = None;
                data_bridge::time_out(&self.controller, session, exit, &tx);
            }
            Ok(None) => {}
            Err(CoreError::Validation { errors }) => {
                self.modal_error = errors.get(Field::ExitTime).map(ToOwned::to_owned);
            }
            Err(e) => self.modal_error = Some(e.to_string()),
        }
    }

    fn modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.board.cancel_time_out();
                self.modal_error = None;
            }
            KeyCode::Enter => self.confirm_time_out(),
            KeyCode::Backspace => {
                let mut input = self.exit_input().to_owned();
                input.pop();
                self.board.set_exit_input(input);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.board.set_exit_input("");
            }
            KeyCode::Char(c) => {
                let input = format!("{}{c}", self.exit_input());
                self.board.set_exit_input(input);
            }
            _ => {}
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let stats = self.board.stats();
        let label = |s: &'static str| Span::styled(s, theme::key_hint());
        let value = |s: String| Span::styled(s, theme::title_style());

        let headline = Line::from(vec![
            label(" Total "),
            value(stats.total.to_string()),
            label("   Parked "),
            Span::styled(stats.parked.to_string(), theme::parked()),
            label("   Completed "),
            Span::styled(stats.completed.to_string(), theme::completed()),
            label("   Revenue "),
            value(format_currency(stats.total_revenue)),
        ]);

        let mut by_type = vec![Span::raw(" ")];
        for vt in VehicleType::iter() {
            by_type.push(Span::styled(
                format!("{} {} {}   ", vt.glyph(), vt.label(), stats.count(vt)),
                theme::tab_inactive(),
            ));
        }

        frame.render_widget(
            Paragraph::new(vec![headline, Line::from(by_type)]),
            area,
        );
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let visible = self.board.visible();
        if visible.is_empty() {
            let message = if self.loading {
                "Loading transactions…"
            } else {
                self.board.empty_message()
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!("  {message}"),
                    theme::key_hint(),
                ))),
                area,
            );
            return;
        }

        let rows = visible
            .iter()
            .map(|s| session_table::row(s, self.now));
        let table = Table::new(rows, session_table::WIDTHS)
            .header(session_table::header())
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_modal(&self, frame: &mut Frame, area: Rect) {
        let TimeOutModal::Open {
            session,
            exit_input,
        } = self.board.modal()
        else {
            return;
        };

        let dialog = widgets::centered(area, 58, 13);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Time Out ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::LANE_YELLOW))
            .style(Style::default().bg(theme::ASPHALT));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<11}"), theme::key_hint()),
                Span::styled(value, Style::default().fg(theme::CHALK)),
            ])
        };

        let input = if exit_input.is_empty() {
            Span::styled("blank = now█", theme::key_hint())
        } else {
            Span::styled(
                format!("{exit_input}█"),
                Style::default().fg(theme::SKY),
            )
        };
        let preview = self
            .board
            .preview_revenue(self.now)
            .map_or_else(String::new, format_currency);

        let mut lines = vec![
            Line::from(""),
            row("Plate", session.plate_number.clone()),
            row("Owner", session.owner_name.clone()),
            row("Slot", session.slot_label()),
            row(
                "Entry",
                session
                    .entry_time
                    .as_ref()
                    .map_or_else(|| "N/A".to_owned(), ToString::to_string),
            ),
            row("Rate", RATE_HINT.to_owned()),
            Line::from(vec![
                Span::styled("  Exit time  ", theme::key_hint()),
                input,
            ]),
            Line::from(vec![
                Span::styled("  Charge     ", theme::key_hint()),
                Span::styled(preview, theme::title_style()),
            ]),
        ];
        match (&self.modal_error, self.board.is_updating()) {
            (_, true) => lines.push(Line::from(Span::styled(
                "  Saving…",
                Style::default().fg(theme::LANE_YELLOW),
            ))),
            (Some(error), false) => lines.push(Line::from(Span::styled(
                format!("  {error}"),
                theme::field_error(),
            ))),
            (None, false) => lines.push(Line::from("")),
        }
        lines.push(Line::from(vec![
            Span::styled("  Enter ", theme::key_hint_key()),
            Span::styled("confirm   ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for SessionsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.board.modal().is_open() {
            self.modal_key(key);
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') => {
                self.table_state.select(widgets::step(
                    Some(0),
                    self.board.visible().len(),
                    0,
                ));
                None
            }
            KeyCode::Char('G') => {
                self.move_selection(isize::MAX);
                None
            }
            KeyCode::Char('f') | KeyCode::Right => {
                self.cycle_filter(true);
                None
            }
            KeyCode::Char('F') | KeyCode::Left => {
                self.cycle_filter(false);
                None
            }
            KeyCode::Enter | KeyCode::Char('t') => self.open_time_out(),
            KeyCode::Char('r') => {
                self.reload();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.now = data_bridge::now(),

            Action::SessionsLoaded { generation, result } => {
                let Some(result) = self.epoch.accept(*generation, result) else {
                    debug!("stale session response dropped");
                    return Ok(None);
                };
                self.loading = false;
                match result {
                    Ok(sessions) => {
                        self.board.set_sessions(sessions.clone());
                        self.move_selection(0);
                    }
                    Err(e) => {
                        return Ok(Some(Action::Notify(Notification::error(format!(
                            "Could not load transactions: {e}"
                        )))));
                    }
                }
            }

            Action::TimedOut(result) => {
                self.board.finish_time_out(result);
                return Ok(Some(match result {
                    Ok(session) => {
                        self.reload();
                        let id = session
                            .id
                            .as_ref()
                            .map_or_else(String::new, ToString::to_string);
                        Action::Notify(Notification::success(format!(
                            "Transaction {id} timed out · {}",
                            format_currency(session.revenue())
                        )))
                    }
                    Err(e) => {
                        self.modal_error = Some(e.to_string());
                        Action::Notify(Notification::error(e.to_string()))
                    }
                }));
            }

            Action::SearchInput(query) if self.focused => {
                self.board.set_search(query.clone());
                self.move_selection(0);
            }
            Action::CloseSearch if self.focused => {
                self.board.set_search("");
                self.move_selection(0);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.board.search().is_empty() {
            " Active Sessions ".to_owned()
        } else {
            format!(" Active Sessions [\"{}\"] ", self.board.search())
        };
        let block = Block::default()
            .title(title)
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

        let [stats_area, tabs_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.render_stats(frame, stats_area);

        let labels: Vec<&str> = SessionFilter::iter().map(SessionFilter::label).collect();
        let active = SessionFilter::iter()
            .position(|f| f == self.board.filter())
            .unwrap_or(0);
        frame.render_widget(
            Paragraph::new(sub_tabs::render_sub_tabs(&labels, active)),
            tabs_area,
        );

        self.render_table(frame, table_area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", self.board.showing_summary()),
                theme::key_hint(),
            ))),
            footer_area,
        );

        self.render_modal(frame, area);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.reload();
        } else {
            self.epoch.advance();
            self.loading = false;
        }
    }

    fn captures_input(&self) -> bool {
        self.board.modal().is_open()
    }

    fn hints(&self) -> &'static str {
        if self.board.modal().is_open() {
            "type exit time  Ctrl+u clear  Enter confirm  Esc cancel"
        } else {
            "j/k move  f filter  Enter time out  r refresh"
        }
    }
}
