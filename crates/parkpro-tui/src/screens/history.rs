//! History ledger: summary cards, sortable and searchable table, delete
//! with confirmation, and printable exports.
//!
//! Deletes are optimistic. The row disappears at once and the store is told
//! in the background; if the store refuses, a warning banner appears here
//! and the row stays gone until the next refresh.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Table, TableState};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use parkpro_core::billing::format_currency;
use parkpro_core::{Controller, HistoryLedger, ParkingSession, SortKey, SortOrder, ViewEpoch};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::data_bridge;
use crate::theme;
use crate::widgets::{self, session_table, sub_tabs};

pub struct HistoryScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    controller: Controller,
    ledger: HistoryLedger,
    epoch: ViewEpoch,
    table_state: TableState,
    loading: bool,
    /// Where reports and receipts are written.
    export_dir: PathBuf,
    now: NaiveDateTime,
}

impl HistoryScreen {
    pub fn new(controller: Controller, export_dir: PathBuf) -> Self {
        Self {
            focused: false,
            action_tx: None,
            controller,
            ledger: HistoryLedger::new(),
            epoch: ViewEpoch::new(),
            table_state: TableState::default(),
            loading: false,
            export_dir,
            now: data_bridge::now(),
        }
    }

    fn reload(&mut self) {
        let generation = self.epoch.advance();
        if let Some(tx) = &self.action_tx {
            self.loading = true;
            data_bridge::load_history(&self.controller, generation, tx);
        }
    }

    fn selected_row(&self) -> Option<&ParkingSession> {
        let visible = self.ledger.visible();
        self.table_state
            .selected()
            .and_then(|i| visible.get(i).copied())
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.ledger.visible().len();
        self.table_state
            .select(widgets::step(self.table_state.selected(), len, delta));
    }

    // ── Delete ──────────────────────────────────────────────────────

    fn arm_selected(&mut self) -> Option<Action> {
        let row = self.selected_row()?;
        let id = row.id.clone()?;
        let plate = row.plate_number.clone();
        self.ledger.arm_delete(id.clone());
        Some(Action::RequestConfirm(ConfirmAction::DeleteTransaction {
            id,
            plate,
        }))
    }

    fn confirm_delete(&mut self, confirm: &ConfirmAction) -> Option<Action> {
        let ConfirmAction::DeleteTransaction { id, .. } = confirm;
        // The handle is dropped: the request runs detached and reports
        // failure through the controller's warning channel.
        let _handle = self.ledger.confirm_delete(id, &self.controller)?;
        self.move_selection(0);
        Some(Action::Notify(Notification::success(format!(
            "Transaction {id} removed"
        ))))
    }

    // ── Documents ───────────────────────────────────────────────────

    fn export_report(&self) -> Action {
        let report = self.ledger.export(data_bridge::now());
        let name = format!(
            "parking-history-{}.html",
            report.generated_at.format("%Y%m%d-%H%M%S")
        );
        match write_document(&self.export_dir, &name, &report.render_html()) {
            Ok(path) => {
                info!(path = %path.display(), rows = report.total_sessions, "report exported");
                Action::Notify(Notification::success(format!(
                    "Report saved to {}",
                    path.display()
                )))
            }
            Err(e) => Action::Notify(Notification::error(format!("Export failed: {e}"))),
        }
    }

    fn print_receipt(&self) -> Option<Action> {
        let id = self.selected_row()?.id.clone()?;
        let receipt = self.ledger.receipt(&id, data_bridge::now())?;
        let name = format!("receipt-{id}.html");
        Some(
            match write_document(&self.export_dir, &name, &receipt.render_html()) {
                Ok(path) => Action::Notify(Notification::success(format!(
                    "Receipt saved to {}",
                    path.display()
                ))),
                Err(e) => Action::Notify(Notification::error(format!("Receipt failed: {e}"))),
            },
        )
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let summary = self.ledger.summary();
        let label = |s: &'static str| Span::styled(s, theme::key_hint());
        let line = Line::from(vec![
            label(" Sessions "),
            Span::styled(summary.sessions.to_string(), theme::title_style()),
            label("   Revenue "),
            Span::styled(format_currency(summary.total_revenue), theme::completed()),
            label("   Avg duration "),
            Span::styled(
                format!("{:.1}h", summary.average_hours),
                theme::title_style(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_sort(&self, frame: &mut Frame, area: Rect) {
        let labels: Vec<&str> = SortKey::iter().map(SortKey::label).collect();
        let active = SortKey::iter()
            .position(|k| k == self.ledger.sort_key())
            .unwrap_or(0);
        let mut line = sub_tabs::render_sub_tabs(&labels, active);
        line.spans.push(Span::styled(
            format!("   {}", self.ledger.sort_order()),
            theme::key_hint_key(),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let visible = self.ledger.visible();
        if visible.is_empty() {
            let message = if self.loading {
                "Loading history…"
            } else {
                self.ledger.empty_message()
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

        let rows = visible.iter().map(|s| {
            let row = session_table::row(s, self.now);
            match &s.id {
                Some(id) if self.ledger.is_armed(id) => row.style(
                    Style::default()
                        .fg(theme::STOP_RED)
                        .add_modifier(Modifier::CROSSED_OUT),
                ),
                _ => row,
            }
        });
        let table = Table::new(rows, session_table::WIDTHS)
            .header(session_table::header())
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_warning(&self, frame: &mut Frame, area: Rect) {
        let Some(warning) = self.ledger.last_warning() else {
            return;
        };
        let line = Line::from(vec![
            Span::styled(" ! ", Style::default().fg(theme::ROSE)),
            Span::styled(
                format!("{} ({})", warning.message, warning.detail),
                Style::default().fg(theme::ROSE),
            ),
            Span::styled("   x ", theme::key_hint_key()),
            Span::styled("dismiss", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Write `content` to `dir/name`, creating `dir` if needed.
fn write_document(dir: &Path, name: &str, content: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

impl Component for HistoryScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
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
                    self.ledger.visible().len(),
                    0,
                ));
                None
            }
            KeyCode::Char('G') => {
                self.move_selection(isize::MAX);
                None
            }
            KeyCode::Char('s') => {
                self.ledger.set_sort_key(self.ledger.sort_key().next());
                None
            }
            KeyCode::Char('o') => {
                self.ledger.set_sort_order(self.ledger.sort_order().toggled());
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => self.arm_selected(),
            KeyCode::Char('e') => Some(self.export_report()),
            KeyCode::Char('p') => self.print_receipt(),
            KeyCode::Char('x') => {
                self.ledger.dismiss_warning();
                None
            }
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

            Action::HistoryLoaded { generation, result } => {
                let Some(result) = self.epoch.accept(*generation, result) else {
                    debug!("stale history response dropped");
                    return Ok(None);
                };
                self.loading = false;
                match result {
                    Ok(rows) => {
                        self.ledger.set_rows(rows.clone());
                        self.move_selection(0);
                    }
                    Err(e) => {
                        return Ok(Some(Action::Notify(Notification::error(format!(
                            "Could not load history: {e}"
                        )))));
                    }
                }
            }

            Action::Confirmed(confirm) => return Ok(self.confirm_delete(confirm)),
            Action::Cancelled(ConfirmAction::DeleteTransaction { .. }) => {
                self.ledger.disarm_delete();
            }

            Action::SyncFailed(warning) => {
                self.ledger.set_warning(warning.clone());
            }

            Action::SearchInput(query) if self.focused => {
                self.ledger.set_search(query.clone());
                self.move_selection(0);
            }
            Action::CloseSearch if self.focused => {
                self.ledger.set_search("");
                self.move_selection(0);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.ledger.search().is_empty() {
            " Transaction History ".to_owned()
        } else {
            format!(" Transaction History [\"{}\"] ", self.ledger.search())
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

        let warning_height = u16::from(self.ledger.last_warning().is_some());
        let [warning_area, summary_area, sort_area, table_area] = Layout::vertical([
            Constraint::Length(warning_height),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .areas(inner);

        self.render_warning(frame, warning_area);
        self.render_summary(frame, summary_area);
        self.render_sort(frame, sort_area);
        self.render_table(frame, table_area);
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
            self.ledger.disarm_delete();
        }
    }

    fn hints(&self) -> &'static str {
        "s sort  o order  d delete  e export  p receipt  r refresh"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parkpro_api::{RecordId, SessionRecord};
    use parkpro_core::{SessionId, StoreConfig, SyncWarning};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;

    fn row(id: i64, owner: &str, exit: &str) -> ParkingSession {
        ParkingSession::from(SessionRecord {
            id: Some(RecordId::Number(id)),
            owner_name: Some(owner.into()),
            vehicle_name: Some("Civic".into()),
            vehicle_type: Some("car".into()),
            plate_number: Some(format!("ABC{id:03}")),
            parking_slot: Some("A1".into()),
            entry_time: Some("2024-01-01T08:00".into()),
            exit_time: Some(exit.into()),
        })
    }

    fn screen(dir: &Path) -> (HistoryScreen, mpsc::UnboundedReceiver<Action>) {
        let config = StoreConfig::new("http://127.0.0.1:5000/api".parse().unwrap());
        let mut screen = HistoryScreen::new(Controller::new(config).unwrap(), dir.to_path_buf());
        let (tx, rx) = mpsc::unbounded_channel();
        screen.init(tx).unwrap();
        screen.focused = true;

        let generation = screen.epoch.advance();
        screen
            .update(&Action::HistoryLoaded {
                generation,
                result: Ok(vec![
                    row(1, "jane", "2024-01-01T10:30"),
                    row(2, "Bob", "2024-01-01T09:00"),
                ]),
            })
            .unwrap();
        (screen, rx)
    }

    fn press(screen: &mut HistoryScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, crossterm::event::KeyModifiers::NONE))
            .unwrap()
    }

    fn owners(screen: &HistoryScreen) -> Vec<String> {
        screen
            .ledger
            .visible()
            .iter()
            .map(|s| s.owner_name.clone())
            .collect()
    }

    #[test]
    fn sort_keys_cycle_and_order_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let (mut screen, _rx) = screen(dir.path());
        assert_eq!(owners(&screen), ["jane", "Bob"]);

        press(&mut screen, KeyCode::Char('s'));
        press(&mut screen, KeyCode::Char('s'));
        assert_eq!(screen.ledger.sort_key(), SortKey::OwnerName);
        assert_eq!(owners(&screen), ["jane", "Bob"]);

        press(&mut screen, KeyCode::Char('o'));
        assert_eq!(screen.ledger.sort_order(), SortOrder::Asc);
        assert_eq!(owners(&screen), ["Bob", "jane"]);
    }

    #[test]
    fn cancelled_delete_keeps_row() {
        let dir = tempfile::tempdir().unwrap();
        let (mut screen, _rx) = screen(dir.path());

        let Some(Action::RequestConfirm(confirm)) = press(&mut screen, KeyCode::Char('d')) else {
            panic!("expected a confirmation request");
        };
        assert!(screen.ledger.is_armed(&SessionId::from(1)));

        screen.update(&Action::Cancelled(confirm)).unwrap();
        assert!(!screen.ledger.is_armed(&SessionId::from(1)));
        assert_eq!(screen.ledger.rows().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_row_at_once() {
        let dir = tempfile::tempdir().unwrap();
        let (mut screen, _rx) = screen(dir.path());

        let Some(Action::RequestConfirm(confirm)) = press(&mut screen, KeyCode::Char('d')) else {
            panic!("expected a confirmation request");
        };
        let follow_up = screen.update(&Action::Confirmed(confirm)).unwrap();

        assert!(matches!(follow_up, Some(Action::Notify(_))));
        assert_eq!(screen.ledger.rows().len(), 1);
        assert!(!screen.ledger.rows()[0].has_id(&SessionId::from(1)));
        assert_eq!(screen.table_state.selected(), Some(0));
    }

    #[test]
    fn sync_failure_shows_banner_until_dismissed() {
        let dir = tempfile::tempdir().unwrap();
        let (mut screen, _rx) = screen(dir.path());

        screen
            .update(&Action::SyncFailed(SyncWarning {
                session_id: SessionId::from(1),
                message: parkpro_core::SYNC_FAILED_MESSAGE.to_owned(),
                detail: "Store error (500)".to_owned(),
            }))
            .unwrap();
        assert!(screen.ledger.last_warning().is_some());

        press(&mut screen, KeyCode::Char('x'));
        assert!(screen.ledger.last_warning().is_none());
    }

    #[test]
    fn export_and_receipt_are_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (mut screen, _rx) = screen(dir.path());

        let action = press(&mut screen, KeyCode::Char('e'));
        assert!(matches!(
            action,
            Some(Action::Notify(Notification { level: crate::action::NotificationLevel::Success, .. }))
        ));

        press(&mut screen, KeyCode::Char('p'));
        let receipt = fs::read_to_string(dir.path().join("receipt-1.html")).unwrap();
        assert!(receipt.contains("ABC001"));

        let reports = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("parking-history-"))
            .count();
        assert_eq!(reports, 1);
    }
}
