//! Terminal lifecycle: raw mode and the alternate screen, undone on exit,
//! on drop, and from the panic hook.

use std::io::{self, Stdout};

use color_eyre::eyre::Result;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Set between `enter` and `exit`; restoring twice is harmless but noisy.
    active: bool,
}

impl Tui {
    /// Wrap stdout. Raw mode is not entered until [`enter`](Self::enter).
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
            active: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.active = true;
        self.terminal.clear()?;
        Ok(())
    }

    /// Give the terminal back to the shell.
    pub fn exit(&mut self) {
        if std::mem::take(&mut self.active) {
            restore();
        }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// (cols, rows)
    pub fn size(&self) -> Result<(u16, u16)> {
        let area = self.terminal.size()?;
        Ok((area.width, area.height))
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Best effort: each step runs even if an earlier one failed.
fn restore() {
    let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install color-eyre report and panic hooks. The panic hook restores the
/// terminal first so the report is readable. Call before [`Tui::enter`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        panic_hook(info);
    }));
    Ok(())
}
