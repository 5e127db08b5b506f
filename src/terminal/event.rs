use thiserror::Error;

/// Named keys and text input decoded from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Esc,
    Tab,
    Backspace,
    CtrlC,
    CtrlD,
    Up,
    Down,
    Right,
    Left,
    /// A printable (or otherwise unnamed) character.
    Char(char),
    /// A CSI sequence this decoder does not interpret.
    Unknown,
}

/// Terminal input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(Key),
}

/// Why a buffer of input bytes could not be turned into an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The read returned no bytes.
    #[error("empty input")]
    EmptyInput,
    /// The buffer does not start with a valid UTF-8 sequence.
    #[error("invalid UTF-8 lead byte 0x{0:02X}")]
    InvalidUtf8(u8),
}

const ESC: u8 = 0x1B;
const CSI_BRACKET: u8 = b'[';

/// Decode the bytes of one read into exactly one event.
///
/// Rules, first match wins:
/// 1. no bytes is an error
/// 2. a single known control byte is a named key
/// 3. `ESC [` plus at least one more byte is an arrow key, or `Unknown`
/// 4. otherwise the first UTF-8 code point is a `Char`
///
/// Bytes past the first code point are dropped, and a CSI sequence split
/// across reads is not reassembled.
pub fn parse_input(data: &[u8]) -> Result<Event, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    if let [byte] = data {
        let key = match byte {
            b'\r' | b'\n' => Some(Key::Enter),
            0x1B => Some(Key::Esc),
            b'\t' => Some(Key::Tab),
            0x08 | 0x7F => Some(Key::Backspace),
            0x03 => Some(Key::CtrlC),
            0x04 => Some(Key::CtrlD),
            _ => None,
        };
        if let Some(key) = key {
            return Ok(Event::Key(key));
        }
    }

    if let [ESC, CSI_BRACKET, code, ..] = data {
        let key = match code {
            b'A' => Key::Up,
            b'B' => Key::Down,
            b'C' => Key::Right,
            b'D' => Key::Left,
            _ => Key::Unknown,
        };
        return Ok(Event::Key(key));
    }

    decode_char(data).map(|c| Event::Key(Key::Char(c)))
}

/// Decode the first code point of `data`.
fn decode_char(data: &[u8]) -> Result<char, DecodeError> {
    let lead = data[0];
    let width = match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Err(DecodeError::InvalidUtf8(lead)),
    };
    let bytes = data.get(..width).ok_or(DecodeError::InvalidUtf8(lead))?;
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.chars().next())
        .ok_or(DecodeError::InvalidUtf8(lead))
}
