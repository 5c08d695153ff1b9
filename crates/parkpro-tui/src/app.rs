//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parkpro_core::{Controller, CoreError};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Below this width the tab bar uses short labels.
const NARROW_WIDTH: u16 = 60;

/// Store reachability as last observed by a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStatus {
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    store_status: StoreStatus,
    help_visible: bool,
    /// Text typed into the status-bar search while it is open.
    search: Option<String>,
    /// Terminal size for responsive layout.
    terminal_size: (u16, u16),
    /// Components dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Stops the sync warning bridge on exit.
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(controller: Controller, export_dir: PathBuf) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(&controller, export_dir)
            .into_iter()
            .collect();

        Self {
            active_screen: ScreenId::Register,
            previous_screen: None,
            screens,
            running: true,
            store_status: StoreStatus::default(),
            help_visible: false,
            search: None,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
        }
    }

    /// Hand every screen the action sender and mount the first one.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.init_screens()?;

        tokio::spawn(crate::data_bridge::forward_sync_warnings(
            self.controller.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(store = %self.controller.config().base_url, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if let Some(query) = &mut self.search {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::CloseSearch),
                // Keep the filter applied and hand the keyboard back.
                KeyCode::Enter => {
                    self.search = None;
                    None
                }
                KeyCode::Backspace => {
                    query.pop();
                    Some(Action::SearchInput(query.clone()))
                }
                KeyCode::Char(c) => {
                    query.push(c);
                    Some(Action::SearchInput(query.clone()))
                }
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };
        if screen.captures_input() {
            return screen.handle_key_event(key);
        }

        let global = match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Action::Quit),
            (_, KeyCode::Char('?')) => Some(Action::ToggleHelp),
            (KeyModifiers::NONE, KeyCode::Char('/')) if self.active_screen.is_searchable() => {
                Some(Action::OpenSearch)
            }
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='3')) => c
                .to_digit(10)
                .and_then(|n| u8::try_from(n).ok())
                .and_then(ScreenId::from_number)
                .map(Action::SwitchScreen),
            (KeyModifiers::NONE, KeyCode::Tab) => {
                Some(Action::SwitchScreen(self.active_screen.next()))
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                Some(Action::SwitchScreen(self.active_screen.prev()))
            }
            (KeyModifiers::NONE, KeyCode::Esc) => Some(Action::GoBack),
            _ => None,
        };
        if global.is_some() {
            return Ok(global);
        }

        screen.handle_key_event(key)
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => self.terminal_size = (*w, *h),

            Action::Render => {}

            Action::SwitchScreen(target) => self.switch_screen(*target),

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::OpenSearch => self.search = Some(String::new()),

            Action::CloseSearch => {
                self.search = None;
                self.broadcast(action)?;
            }

            Action::SearchInput(_) => self.broadcast(action)?,

            Action::RequestConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.action_tx.send(Action::Confirmed(confirm))?;
                }
            }

            Action::ConfirmNo => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.action_tx.send(Action::Cancelled(confirm))?;
                }
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                self.broadcast(action)?;
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::SlotsLoaded { result, .. } => {
                self.observe_store(result.as_ref().err());
                self.broadcast(action)?;
            }
            Action::SessionsLoaded { result, .. } | Action::HistoryLoaded { result, .. } => {
                self.observe_store(result.as_ref().err());
                self.broadcast(action)?;
            }

            Action::SyncFailed(warning) => {
                warn!(id = %warning.session_id, detail = %warning.detail, "delete not synced");
                self.notification = Some((
                    Notification::warning(warning.message.clone()),
                    Instant::now(),
                ));
                self.broadcast(action)?;
            }

            Action::Registered(_)
            | Action::TimedOut(_)
            | Action::Confirmed(_)
            | Action::Cancelled(_) => self.broadcast(action)?,
        }
        Ok(())
    }

    /// Hand an action to every screen and queue their follow-ups.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn switch_screen(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);

        // A search belongs to the screen it was typed on.
        self.search = None;

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.previous_screen = Some(self.active_screen);
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    fn observe_store(&mut self, error: Option<&CoreError>) {
        self.store_status = match error {
            Some(e) if e.is_unreachable() => StoreStatus::Unreachable,
            Some(_) => self.store_status,
            None => StoreStatus::Reachable,
        };
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }
        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        // Overlays: last drawn is topmost.
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, area, notification);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let narrow = self.terminal_size.0 < NARROW_WIDTH;
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let label = if narrow { id.label_short() } else { id.label() };
                Line::from(Span::styled(format!(" {} {label} ", id.number()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(query) = &self.search {
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::SIGN_BLUE)),
                Span::styled(query.as_str(), Style::default().fg(theme::SKY)),
                Span::styled("█", Style::default().fg(theme::SKY)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let store = self.controller.config().base_url.as_str();
        let indicator = match self.store_status {
            StoreStatus::Reachable => Span::styled(
                format!("● {store}"),
                Style::default().fg(theme::GO_GREEN),
            ),
            StoreStatus::Unreachable => Span::styled(
                format!("○ {store} unreachable"),
                Style::default().fg(theme::STOP_RED),
            ),
            StoreStatus::Unknown => {
                Span::styled(format!("◐ {store}"), Style::default().fg(theme::LANE_YELLOW))
            }
        };

        let screen_hints = self
            .screens
            .get(&self.active_screen)
            .map_or("", |s| s.hints());

        let line = Line::from(vec![
            Span::raw(" "),
            indicator,
            Span::styled(format!(" │ {screen_hints}"), theme::key_hint()),
            Span::styled(" │ ? help  / search  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

// ── Overlays ────────────────────────────────────────────────────────

fn overlay_block(title: &'static str, border: Style) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(theme::ASPHALT))
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = widgets::centered(area, 56, 5);
    frame.render_widget(Clear, dialog_area);

    let block = overlay_block(" Confirm ", Style::default().fg(theme::LANE_YELLOW));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::CHALK),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let message_width = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = message_width.saturating_add(6).clamp(20, 70);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2); // above status bar
    let toast_area = Rect::new(area.x + x, area.y + y, width.min(area.width), height);

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::GO_GREEN, "✓"),
        NotificationLevel::Error => (theme::STOP_RED, "✗"),
        NotificationLevel::Warning => (theme::LANE_YELLOW, "!"),
        NotificationLevel::Info => (theme::SKY, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::ASPHALT));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(&notification.message, Style::default().fg(theme::CHALK)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = widgets::centered(area, 62, 22);
    frame.render_widget(Clear, help_area);

    let block = overlay_block(" Keyboard Shortcuts ", theme::border_focused());
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme::SKY)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let help_text = vec![
        heading("  Global"),
        entry("1-3 Tab", "Switch screen"),
        entry("/", "Search sessions or history"),
        entry("Esc", "Back / close"),
        entry("q", "Quit"),
        Line::from(""),
        heading("  Register"),
        entry("j/k", "Move between fields"),
        entry("Enter", "Edit field / cycle choice"),
        entry("h/l", "Previous / next choice"),
        entry("n", "Entry time = now"),
        entry("s c r", "Submit, clear, reload slots"),
        Line::from(""),
        heading("  Sessions / History"),
        entry("f F", "Filter forward / back"),
        entry("Enter t", "Time out a parked vehicle"),
        entry("s o", "Sort column, sort order"),
        entry("d", "Delete transaction"),
        entry("e p", "Export report, print receipt"),
        Line::from(""),
        Line::from(Span::styled(
            "                         Esc or ? to close",
            theme::key_hint(),
        )),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}
