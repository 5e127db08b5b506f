use std::io::Write;

use crossterm::QueueableCommand;
use tracing::{debug, error, info, warn};

use crate::app::App;
use crate::error::{AppError, Result};
use crate::handler;
use crate::terminal::event::{DecodeError, Event};
use crate::terminal::{Device, Terminal, TtyDevice};
use crate::ui;

/// Consecutive zero-byte reads treated as end of input.
const MAX_EMPTY_READS: usize = 3;

/// Terminal session: raw mode, alternate screen and hidden cursor for as
/// long as it lives.
pub struct Tui<D: Device> {
    terminal: Terminal<D>,
}

impl Tui<TtyDevice> {
    /// Take over the controlling terminal.
    pub fn open() -> Result<Self> {
        Self::new(TtyDevice::open()?)
    }
}

impl<D: Device> Tui<D> {
    /// Enter raw mode and the alternate screen on `device`.
    ///
    /// On failure the partially set-up terminal is dropped, which restores it.
    pub fn new(device: D) -> Result<Self> {
        let mut terminal = Terminal::new(device);
        terminal.enable_raw_mode()?;
        terminal.enter_alt_screen()?;
        terminal.hide_cursor()?;
        terminal.flush()?;
        debug!("terminal session started");
        Ok(Self { terminal })
    }

    /// Draw, read a key, dispatch, repeat until the app quits or input ends.
    ///
    /// Undecodable input is skipped. Recoverable errors from key handling
    /// are shown in the status row; anything else ends the loop.
    pub fn run(&mut self, app: &mut App) -> Result<()> {
        let mut empty_reads = 0;
        ui::render(app, &mut self.terminal)?;

        while !app.should_quit {
            match self.terminal.read_event() {
                Ok(Event::Key(key)) => {
                    empty_reads = 0;
                    if let Err(e) = handler::handle_key_event(app, key) {
                        if !e.is_recoverable() {
                            return Err(e);
                        }
                        warn!("{e}");
                        app.view.set_status(e.to_string());
                    }
                }
                Err(AppError::Decode(DecodeError::EmptyInput)) => {
                    empty_reads += 1;
                    if empty_reads >= MAX_EMPTY_READS {
                        info!("input closed");
                        break;
                    }
                    continue;
                }
                Err(AppError::Decode(e)) => {
                    debug!("discarding input: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            }
            ui::render(app, &mut self.terminal)?;
        }
        Ok(())
    }

    /// Restore the terminal to its original state.
    pub fn restore(&mut self) -> Result<()> {
        self.terminal.restore()
    }

    /// `run`, then `restore` regardless of how the session ended.
    ///
    /// Both failures are logged; the session's error takes precedence.
    pub fn run_to_completion(&mut self, app: &mut App) -> Result<()> {
        let result = self.run(app);
        let restored = self.restore();
        if let Err(e) = &result {
            error!("session ended with error: {e}");
        }
        if let Err(e) = &restored {
            error!("failed to restore terminal: {e}");
        }
        result.and(restored)
    }

    #[cfg(test)]
    pub fn terminal(&self) -> &Terminal<D> {
        &self.terminal
    }
}

/// Install a panic hook that restores the terminal before printing panic info.
///
/// The session's `Terminal` is unreachable from the hook, so this resets the
/// tty directly.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        if let Ok(mut tty) = std::fs::OpenOptions::new().write(true).open("/dev/tty") {
            let _ = tty
                .queue(crossterm::cursor::Show)
                .and_then(|tty| tty.queue(crossterm::terminal::LeaveAlternateScreen))
                .and_then(|tty| tty.flush());
        }
        original_hook(panic_info);
    }));
}
