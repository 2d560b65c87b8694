//! Input decoder: bytes from the terminal to [`Event`]s.
//!
//! Understands xterm and linux console key sequences (CSI and SS3 forms,
//! with xterm modifier parameters), X10 and SGR mouse reports, control
//! bytes and UTF-8 text.

use super::messages::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent};
use crate::color::InputMode;

const ESC: u8 = 0x1b;

/// Longest SGR mouse body we wait for before giving up on it.
const SGR_MOUSE_MAX: usize = 16;

/// Outcome of looking at the front of the input buffer.
#[derive(Debug)]
enum Parsed {
    /// An event and the number of bytes it used.
    Event(Event, usize),
    /// A complete sequence nobody asked for; drop this many bytes.
    Skip(usize),
    /// More bytes are needed.
    Incomplete,
    /// Not an escape sequence we know.
    NoMatch,
}

/// Remove one complete event from the front of `buffer`.
///
/// Returns `None` when the buffer is empty or holds only the beginning of
/// an event; in that case the buffer is left as it was. Unrecognized but
/// complete CSI sequences are discarded.
///
/// An escape byte that does not start a known sequence is the Esc key in
/// [`InputMode::ESC`], and an Alt prefix for the following key in
/// [`InputMode::ALT`]. A lone trailing escape is always the Esc key.
pub fn decode_event(buffer: &mut Vec<u8>, mode: InputMode) -> Option<Event> {
    let mode = mode.normalized();
    loop {
        match parse(buffer, mode) {
            Parsed::Event(event, used) => {
                buffer.drain(..used);
                return Some(event);
            }
            Parsed::Skip(used) => {
                buffer.drain(..used);
            }
            Parsed::Incomplete | Parsed::NoMatch => return None,
        }
    }
}

fn parse(bytes: &[u8], mode: InputMode) -> Parsed {
    let Some(&first) = bytes.first() else {
        return Parsed::Incomplete;
    };
    if first != ESC {
        return parse_plain(bytes);
    }

    match parse_escape(bytes) {
        Parsed::NoMatch => {}
        other => return other,
    }

    if mode.contains(InputMode::ESC) || bytes.len() == 1 {
        return key(KeyEvent::plain(KeyCode::Esc), 1);
    }

    match parse(&bytes[1..], mode) {
        Parsed::Event(Event::Key(mut event), used) => {
            event.modifiers.alt = true;
            Parsed::Event(Event::Key(event), used + 1)
        }
        Parsed::Event(event, used) => Parsed::Event(event, used + 1),
        Parsed::Skip(used) => Parsed::Skip(used + 1),
        other => other,
    }
}

const fn key(event: KeyEvent, used: usize) -> Parsed {
    Parsed::Event(Event::Key(event), used)
}

/// Sequences introduced by `ESC`.
fn parse_escape(bytes: &[u8]) -> Parsed {
    match bytes.get(1) {
        Some(b'O') => match bytes.get(2).and_then(|&b| ss3_key(b)) {
            Some(code) => key(KeyEvent::plain(code), 3),
            None => Parsed::NoMatch,
        },
        Some(b'[') => parse_csi(bytes),
        _ => Parsed::NoMatch,
    }
}

/// `ESC O <final>`: application-mode cursor keys and F1-F4.
const fn ss3_key(byte: u8) -> Option<KeyCode> {
    Some(match byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    })
}

/// `ESC [ ...`
fn parse_csi(bytes: &[u8]) -> Parsed {
    let rest = &bytes[2..];
    match rest.first() {
        // Linux console F1-F5: ESC [ [ A..E
        Some(b'[') => match rest.get(1) {
            Some(&b @ b'A'..=b'E') => key(KeyEvent::plain(KeyCode::F(b - b'A' + 1)), 4),
            _ => Parsed::NoMatch,
        },
        Some(b'M') => parse_x10_mouse(bytes),
        Some(b'<') => parse_sgr_mouse(bytes),
        _ => {
            let Some(end) = rest.iter().position(|b| !is_param_byte(*b)) else {
                return Parsed::NoMatch;
            };
            let final_byte = rest[end];
            if !(0x40..=0x7e).contains(&final_byte) {
                return Parsed::NoMatch;
            }
            let used = 2 + end + 1;
            let params = parse_params(&rest[..end]);
            match csi_key(&params, final_byte) {
                Some(event) => key(event, used),
                None => Parsed::Skip(used),
            }
        }
    }
}

const fn is_param_byte(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b';'
}

/// Split `n;n;n`; empty fields are zero.
fn parse_params(bytes: &[u8]) -> Vec<u16> {
    bytes
        .split(|&b| b == b';')
        .map(|field| {
            field.iter().fold(0u16, |acc, &digit| {
                acc.saturating_mul(10).saturating_add(u16::from(digit - b'0'))
            })
        })
        .collect()
}

fn csi_key(params: &[u16], final_byte: u8) -> Option<KeyEvent> {
    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => KeyCode::BackTab,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'~' => match params.first().copied()? {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F((n - 10) as u8),
            n @ 17..=21 => KeyCode::F((n - 11) as u8),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return None,
        },
        _ => return None,
    };
    Some(KeyEvent::new(code, modifiers(params.get(1).copied())))
}

/// xterm modifier parameter: `1 + (shift | alt << 1 | ctrl << 2 | meta << 3)`.
fn modifiers(param: Option<u16>) -> KeyModifiers {
    let bits = param.unwrap_or(1).saturating_sub(1);
    KeyModifiers {
        shift: bits & 1 != 0,
        alt: bits & (2 | 8) != 0,
        control: bits & 4 != 0,
    }
}

/// `ESC [ M b x y`, each of b, x, y offset by 32 and coordinates 1-based.
fn parse_x10_mouse(bytes: &[u8]) -> Parsed {
    if bytes.len() < 6 {
        return Parsed::Incomplete;
    }
    let b = bytes[3];
    let wheel = b & 64 != 0;
    let button = match b & 3 {
        0 if wheel => MouseButton::WheelUp,
        0 => MouseButton::Left,
        1 if wheel => MouseButton::WheelDown,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Release,
    };
    let event = MouseEvent {
        x: u16::from(bytes[4].saturating_sub(33)),
        y: u16::from(bytes[5].saturating_sub(33)),
        button,
    };
    Parsed::Event(Event::Mouse(event), 6)
}

/// `ESC [ < b ; x ; y M` for presses, `m` for releases.
fn parse_sgr_mouse(bytes: &[u8]) -> Parsed {
    let body = &bytes[3..];
    let Some(end) = body.iter().position(|&b| b == b'M' || b == b'm') else {
        let waiting = body.len() < SGR_MOUSE_MAX && body.iter().all(|&b| is_param_byte(b));
        return if waiting {
            Parsed::Incomplete
        } else {
            Parsed::NoMatch
        };
    };
    let used = 3 + end + 1;
    let fields = &body[..end];
    if !fields.iter().all(|&b| is_param_byte(b)) {
        return Parsed::Skip(used);
    }
    let params = parse_params(fields);
    let [b, x, y] = params[..] else {
        return Parsed::Skip(used);
    };

    let button = if b & 64 != 0 {
        if b & 1 == 0 {
            MouseButton::WheelUp
        } else {
            MouseButton::WheelDown
        }
    } else if body[end] == b'm' {
        MouseButton::Release
    } else {
        match b & 3 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Release,
        }
    };
    let event = MouseEvent {
        x: x.saturating_sub(1),
        y: y.saturating_sub(1),
        button,
    };
    Parsed::Event(Event::Mouse(event), used)
}

/// Control bytes and UTF-8 text.
fn parse_plain(bytes: &[u8]) -> Parsed {
    let first = bytes[0];
    if first < 0x20 || first == 0x7f {
        return key(control_key(first), 1);
    }
    if first < 0x80 {
        return key(KeyEvent::plain(KeyCode::Char(char::from(first))), 1);
    }

    let len = match first {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return key(KeyEvent::plain(KeyCode::Char(char::REPLACEMENT_CHARACTER)), 1),
    };
    let end = bytes.len().min(len);
    match std::str::from_utf8(&bytes[..end]) {
        Ok(text) => match text.chars().next() {
            Some(ch) => key(KeyEvent::plain(KeyCode::Char(ch)), ch.len_utf8()),
            None => Parsed::Incomplete,
        },
        Err(err) if err.error_len().is_none() => Parsed::Incomplete,
        Err(_) => key(KeyEvent::plain(KeyCode::Char(char::REPLACEMENT_CHARACTER)), 1),
    }
}

fn control_key(byte: u8) -> KeyEvent {
    match byte {
        0x00 => KeyEvent::plain(KeyCode::Null),
        0x08 | 0x7f => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0d => KeyEvent::plain(KeyCode::Enter),
        ESC => KeyEvent::plain(KeyCode::Esc),
        0x01..=0x1a => KeyEvent::new(KeyCode::Char(char::from(b'a' + byte - 1)), KeyModifiers::CONTROL),
        // 0x1c..=0x1f: Ctrl+\ ] ^ _
        _ => KeyEvent::new(KeyCode::Char(char::from(byte | 0x40)), KeyModifiers::CONTROL),
    }
}
