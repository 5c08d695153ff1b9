//! Component trait implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Lifecycle: `init` once, then any mix of `handle_key_event`, `update`
/// and `render`. `set_focused(true)` mounts the screen and
/// `set_focused(false)` unmounts it.
pub trait Component: Send {
    /// Receives the sender for dispatching actions to the app loop.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to a dispatched action. May return a follow-up.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    fn focused(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    /// While `true`, every key except Ctrl+C goes to this component
    /// (text entry, open dialogs).
    fn captures_input(&self) -> bool {
        false
    }

    /// Key hints for the status bar.
    fn hints(&self) -> &'static str {
        ""
    }
}
