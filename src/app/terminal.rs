//! Terminal session guard.
//!
//! Raw mode, the alternate screen and mouse capture are acquired together
//! and released in `Drop`, so every exit path (normal return, `?`, or an
//! unwinding panic) hands the terminal back intact.

use std::io::{self, stderr};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

pub struct TerminalSession {
    active: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen on stderr, with mouse
    /// capture enabled.  Stdout stays clean for the final result.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // From here on, Drop undoes whatever got enabled.
        let session = Self { active: true };
        execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(session)
    }

    /// Restore the terminal.  Idempotent; errors are logged, not returned,
    /// since this also runs from `Drop`.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = execute!(stderr(), DisableMouseCapture, LeaveAlternateScreen) {
            tracing::warn!("failed to leave alternate screen: {e}");
        }
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("failed to disable raw mode: {e}");
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.restore();
    }
}
