//! Terminal device ownership: raw mode, alternate screen, ANSI output and
//! key input.

pub mod event;
#[cfg(test)]
pub mod mock;

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    QueueableCommand,
};
use tracing::debug;

use crate::error::{AppError, Result};
use event::{parse_input, Event};

/// Upper bound on the bytes consumed by one `read_event` call.
const READ_BUFFER_SIZE: usize = 64;

const CURSOR_HOME: &[u8] = b"\x1b[H";
const RESET: &[u8] = b"\x1b[0m";

/// A byte-oriented terminal the UI can draw on and read keys from.
pub trait Device: Read + Write {
    /// Switch to character-at-a-time, no-echo input.
    fn enable_raw_mode(&mut self) -> io::Result<()>;
    /// Restore the attributes captured by `enable_raw_mode`.
    fn disable_raw_mode(&mut self) -> io::Result<()>;
    /// Current size as `(cols, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;
}

/// The controlling terminal, opened through `/dev/tty`.
pub struct TtyDevice {
    input: File,
    output: BufWriter<File>,
}

impl TtyDevice {
    pub fn open() -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(|e| AppError::Terminal(format!("cannot open /dev/tty: {e}")))?;
        let output = file.try_clone()?;
        Ok(Self::from_files(file, output))
    }

    /// Build a device over already opened input and output handles.
    pub fn from_files(input: File, output: File) -> Self {
        Self {
            input,
            output: BufWriter::new(output),
        }
    }
}

impl Read for TtyDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for TtyDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

impl Device for TtyDevice {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

/// The eight basic ANSI foreground colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// SGR foreground code, `30..=37`.
    pub fn code(self) -> u8 {
        30 + self as u8
    }

    /// Parse a lowercase color name such as `"cyan"`.
    pub fn from_name(name: &str) -> Option<Color> {
        let color = match name.trim().to_ascii_lowercase().as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            _ => return None,
        };
        Some(color)
    }
}

/// Owns a terminal device and tracks which modes have been switched on, so
/// that `restore` can undo exactly those.
pub struct Terminal<D: Device> {
    device: D,
    raw: bool,
    alt_screen: bool,
    cursor_hidden: bool,
}

impl<D: Device> Terminal<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            raw: false,
            alt_screen: false,
            cursor_hidden: false,
        }
    }

    #[cfg(test)]
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    #[cfg(test)]
    pub fn in_alt_screen(&self) -> bool {
        self.alt_screen
    }

    pub fn enable_raw_mode(&mut self) -> Result<()> {
        if self.raw {
            return Ok(());
        }
        self.device
            .enable_raw_mode()
            .map_err(|e| AppError::Terminal(format!("failed to enable raw mode: {e}")))?;
        self.raw = true;
        debug!("raw mode enabled");
        Ok(())
    }

    /// No-op when raw mode was never enabled.
    pub fn disable_raw_mode(&mut self) -> Result<()> {
        if !self.raw {
            return Ok(());
        }
        self.device.disable_raw_mode()?;
        self.raw = false;
        debug!("raw mode disabled");
        Ok(())
    }

    pub fn enter_alt_screen(&mut self) -> Result<()> {
        self.device.queue(EnterAlternateScreen)?;
        self.alt_screen = true;
        Ok(())
    }

    pub fn exit_alt_screen(&mut self) -> Result<()> {
        self.device.queue(LeaveAlternateScreen)?;
        self.alt_screen = false;
        Ok(())
    }

    pub fn hide_cursor(&mut self) -> Result<()> {
        self.device.queue(Hide)?;
        self.cursor_hidden = true;
        Ok(())
    }

    pub fn show_cursor(&mut self) -> Result<()> {
        self.device.queue(Show)?;
        self.cursor_hidden = false;
        Ok(())
    }

    pub fn clear_screen(&mut self) -> Result<()> {
        self.device.queue(Clear(ClearType::All))?;
        Ok(())
    }

    pub fn move_cursor_home(&mut self) -> Result<()> {
        self.device.write_all(CURSOR_HOME)?;
        Ok(())
    }

    /// Move to a 1-based `(row, col)` position.
    pub fn move_cursor_to(&mut self, row: u16, col: u16) -> Result<()> {
        self.device
            .queue(MoveTo(col.saturating_sub(1), row.saturating_sub(1)))?;
        Ok(())
    }

    /// Write text at the cursor position with no styling.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.device.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Write text in `color`, resetting attributes afterwards.
    pub fn write_colored(&mut self, text: &str, color: Color) -> Result<()> {
        write!(self.device, "\x1b[{}m", color.code())?;
        self.write_text(text)?;
        self.device.write_all(RESET)?;
        Ok(())
    }

    pub fn write_colored_at(&mut self, row: u16, col: u16, text: &str, color: Color) -> Result<()> {
        self.move_cursor_to(row, col)?;
        self.write_colored(text, color)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.device.flush()?;
        Ok(())
    }

    /// `(cols, rows)` of the device.
    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(self.device.size()?)
    }

    /// Block for one read and decode it into a single event.
    ///
    /// Decode failures surface as `AppError::Decode`.
    pub fn read_event(&mut self) -> Result<Event> {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let n = self.device.read(&mut buf)?;
        Ok(parse_input(&buf[..n])?)
    }

    /// Put the device back into cooked mode on the primary screen with a
    /// visible cursor. Safe to call any number of times.
    ///
    /// Every step is attempted even when an earlier one fails; the first
    /// error is returned. Raw mode goes first since it needs no writes.
    pub fn restore(&mut self) -> Result<()> {
        let mut first_error = None;
        let mut note = |result: Result<()>| {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        };

        note(self.disable_raw_mode());
        if self.cursor_hidden {
            note(self.show_cursor());
        }
        if self.alt_screen {
            note(self.exit_alt_screen());
        }
        note(self.flush());

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<D: Device> Drop for Terminal<D> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockDevice;
    use super::*;
    use crate::terminal::event::{DecodeError, Key};

    fn setup() -> (Terminal<MockDevice>, MockDevice) {
        let device = MockDevice::new(80, 24);
        (Terminal::new(device.clone()), device)
    }

    #[test]
    fn control_sequences_match_ansi() {
        let (mut term, device) = setup();
        term.clear_screen().unwrap();
        term.move_cursor_home().unwrap();
        term.hide_cursor().unwrap();
        term.show_cursor().unwrap();
        term.enter_alt_screen().unwrap();
        term.exit_alt_screen().unwrap();
        assert_eq!(
            device.output_string(),
            "\x1b[2J\x1b[H\x1b[?25l\x1b[?25h\x1b[?1049h\x1b[?1049l"
        );
    }

    #[test]
    fn move_cursor_is_one_based() {
        let (mut term, device) = setup();
        term.move_cursor_to(3, 7).unwrap();
        assert_eq!(device.output_string(), "\x1b[3;7H");
    }

    #[test]
    fn plain_text_is_unstyled() {
        let (mut term, device) = setup();
        term.write_text("plain").unwrap();
        assert_eq!(device.output_string(), "plain");
    }

    #[test]
    fn colored_text_is_reset() {
        let (mut term, device) = setup();
        term.write_colored_at(2, 1, "src", Color::Blue).unwrap();
        assert_eq!(device.output_string(), "\x1b[2;1H\x1b[34msrc\x1b[0m");
    }

    #[test]
    fn color_codes_and_names() {
        assert_eq!(Color::Black.code(), 30);
        assert_eq!(Color::White.code(), 37);
        assert_eq!(Color::from_name("Cyan"), Some(Color::Cyan));
        assert_eq!(Color::from_name("magenta"), Some(Color::Magenta));
        assert_eq!(Color::from_name("orange"), None);
    }

    #[test]
    fn raw_mode_round_trip() {
        let (mut term, device) = setup();
        term.enable_raw_mode().unwrap();
        assert!(term.is_raw());
        assert!(device.is_raw());
        term.disable_raw_mode().unwrap();
        assert!(!term.is_raw());
        assert!(!device.is_raw());
    }

    #[test]
    fn disable_without_enable_is_noop() {
        let (mut term, device) = setup();
        term.disable_raw_mode().unwrap();
        assert_eq!(device.raw_toggles(), 0);
    }

    #[test]
    fn failed_raw_mode_is_terminal_error() {
        let (mut term, device) = setup();
        device.reject_raw_mode();
        let err = term.enable_raw_mode().unwrap_err();
        assert!(matches!(err, AppError::Terminal(_)));
        assert!(!term.is_raw());
        term.restore().unwrap();
        term.restore().unwrap();
        assert!(!device.is_raw());
    }

    #[test]
    fn restore_is_idempotent() {
        let (mut term, device) = setup();
        term.enable_raw_mode().unwrap();
        term.enter_alt_screen().unwrap();
        term.hide_cursor().unwrap();
        device.clear_output();

        term.restore().unwrap();
        assert_eq!(device.output_string(), "\x1b[?25h\x1b[?1049l");
        assert!(!device.is_raw());
        assert!(!term.in_alt_screen());

        device.clear_output();
        term.restore().unwrap();
        assert_eq!(device.output_string(), "");
    }

    #[test]
    fn drop_restores_device() {
        let device = MockDevice::new(80, 24);
        {
            let mut term = Terminal::new(device.clone());
            term.enable_raw_mode().unwrap();
            term.enter_alt_screen().unwrap();
            term.hide_cursor().unwrap();
        }
        assert!(!device.is_raw());
        assert!(device.output_string().ends_with("\x1b[?25h\x1b[?1049l"));
    }

    #[test]
    fn restore_leaves_raw_mode_even_when_writes_fail() {
        let (mut term, device) = setup();
        term.enable_raw_mode().unwrap();
        term.enter_alt_screen().unwrap();
        term.hide_cursor().unwrap();
        device.break_output();

        assert!(matches!(term.restore(), Err(AppError::Io(_))));
        assert!(!device.is_raw());
        assert!(term.restore().is_err());
        drop(term);
        assert!(!device.is_raw());
        assert_eq!(device.raw_toggles(), 2);
    }

    #[test]
    fn tty_device_over_plain_files() {
        use std::io::{Seek, SeekFrom};

        let mut input = tempfile::tempfile().unwrap();
        input.write_all(b"q").unwrap();
        input.seek(SeekFrom::Start(0)).unwrap();
        let output = tempfile::tempfile().unwrap();
        let mut written = output.try_clone().unwrap();

        let mut term = Terminal::new(TtyDevice::from_files(input, output));
        term.enter_alt_screen().unwrap();
        term.hide_cursor().unwrap();
        term.write_colored_at(1, 1, "x", Color::Red).unwrap();
        term.flush().unwrap();
        assert_eq!(term.read_event().unwrap(), Event::Key(Key::Char('q')));

        let mut bytes = String::new();
        written.seek(SeekFrom::Start(0)).unwrap();
        written.read_to_string(&mut bytes).unwrap();
        assert_eq!(bytes, "\x1b[?1049h\x1b[?25l\x1b[1;1H\x1b[31mx\x1b[0m");
    }

    #[test]
    fn read_event_consumes_one_chunk() {
        let (mut term, device) = setup();
        device.push_input(b"\x1b[A");
        device.push_input(b"q");
        assert_eq!(term.read_event().unwrap(), Event::Key(Key::Up));
        assert_eq!(term.read_event().unwrap(), Event::Key(Key::Char('q')));
    }

    #[test]
    fn read_event_reports_decode_errors() {
        let (mut term, device) = setup();
        device.push_input(&[0xFF]);
        assert!(matches!(
            term.read_event(),
            Err(AppError::Decode(DecodeError::InvalidUtf8(0xFF)))
        ));
        // Exhausted input reads zero bytes.
        assert!(matches!(
            term.read_event(),
            Err(AppError::Decode(DecodeError::EmptyInput))
        ));
    }

    #[test]
    fn split_escape_sequence_is_not_reassembled() {
        let (mut term, device) = setup();
        device.push_input(&[0x1B]);
        device.push_input(b"[A");
        assert_eq!(term.read_event().unwrap(), Event::Key(Key::Esc));
        assert_eq!(term.read_event().unwrap(), Event::Key(Key::Char('[')));
    }

    #[test]
    fn size_comes_from_device() {
        let (term, _device) = setup();
        assert_eq!(term.size().unwrap(), (80, 24));
    }
}
