//! Named control sequences for session setup and teardown.

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::Command;

/// Control sequences the session emits by name.
///
/// The default table is xterm-compatible. Where crossterm has a command
/// for the capability its ANSI rendering is used; keypad transmit and
/// mouse reporting are written out directly. Mouse reporting asks for
/// button events in SGR encoding (`?1006`), which carries coordinates past
/// column 223; terminals without it fall back to X10 reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Switch to the alternate screen.
    pub enter_ca: String,
    /// Return from the alternate screen.
    pub exit_ca: String,
    /// Enable keypad transmit mode.
    pub enter_keypad: String,
    /// Disable keypad transmit mode.
    pub exit_keypad: String,
    /// Make the cursor visible.
    pub show_cursor: String,
    /// Make the cursor invisible.
    pub hide_cursor: String,
    /// Home the cursor and erase the screen.
    pub clear_screen: String,
    /// Reset all SGR attributes.
    pub sgr0: String,
    /// Enable mouse button reporting.
    pub enter_mouse: String,
    /// Disable mouse button reporting.
    pub exit_mouse: String,
}

/// Render a crossterm command to its ANSI string.
fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    let _ = command.write_ansi(&mut out);
    out
}

impl Capabilities {
    /// The xterm-compatible table.
    pub fn xterm() -> Self {
        Self {
            enter_ca: ansi(EnterAlternateScreen),
            exit_ca: ansi(LeaveAlternateScreen),
            enter_keypad: "\x1b[?1h\x1b=".to_string(),
            exit_keypad: "\x1b[?1l\x1b>".to_string(),
            show_cursor: ansi(Show),
            hide_cursor: ansi(Hide),
            clear_screen: ansi(MoveTo(0, 0)) + &ansi(Clear(ClearType::All)),
            sgr0: ansi(SetAttribute(Attribute::Reset)),
            enter_mouse: "\x1b[?1000h\x1b[?1006h".to_string(),
            exit_mouse: "\x1b[?1006l\x1b[?1000l".to_string(),
        }
    }

    /// Sequences written when a session opens, in order.
    pub fn enter_sequence(&self) -> String {
        [
            self.enter_ca.as_str(),
            self.enter_keypad.as_str(),
            self.hide_cursor.as_str(),
            self.clear_screen.as_str(),
        ]
        .concat()
    }

    /// Sequences written when a session closes, in order.
    pub fn exit_sequence(&self) -> String {
        [
            self.show_cursor.as_str(),
            self.sgr0.as_str(),
            self.clear_screen.as_str(),
            self.exit_ca.as_str(),
            self.exit_keypad.as_str(),
            self.exit_mouse.as_str(),
        ]
        .concat()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::xterm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xterm_table() {
        let caps = Capabilities::xterm();
        assert_eq!(caps.enter_ca, "\x1b[?1049h");
        assert_eq!(caps.exit_ca, "\x1b[?1049l");
        assert_eq!(caps.show_cursor, "\x1b[?25h");
        assert_eq!(caps.hide_cursor, "\x1b[?25l");
        assert_eq!(caps.clear_screen, "\x1b[1;1H\x1b[2J");
        assert_eq!(caps.sgr0, "\x1b[0m");
    }

    #[test]
    fn test_enter_sequence_order() {
        let caps = Capabilities::xterm();
        assert_eq!(
            caps.enter_sequence(),
            "\x1b[?1049h\x1b[?1h\x1b=\x1b[?25l\x1b[1;1H\x1b[2J"
        );
    }

    #[test]
    fn test_exit_sequence_order() {
        let caps = Capabilities::xterm();
        let exit = caps.exit_sequence();
        let show = exit.find(&caps.show_cursor).unwrap();
        let reset = exit.find(&caps.sgr0).unwrap();
        let leave = exit.find(&caps.exit_ca).unwrap();
        let mouse = exit.find(&caps.exit_mouse).unwrap();
        assert!(show < reset && reset < leave && leave < mouse);
        assert!(exit.starts_with("\x1b[?25h"));
        assert!(exit.ends_with("\x1b[?1006l\x1b[?1000l"));
    }

    #[test]
    fn test_mouse_uses_sgr_encoding() {
        let caps = Capabilities::xterm();
        assert_eq!(caps.enter_mouse, "\x1b[?1000h\x1b[?1006h");
        assert_eq!(caps.exit_mouse, "\x1b[?1006l\x1b[?1000l");
    }
}
